//! TUI module for toneboard
//!
//! Draws the key layout, the active tones line and an oscilloscope of the
//! output, and forwards key presses to the keyboard controller.

mod keys;
mod waveform;

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::warn;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use toneboard::Keyboard;

use crate::app::StatusLine;
use keys::{note_for_key, render_keys};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

/// UI application state
pub struct UiApp {
    keyboard: Keyboard<StatusLine>,
    /// Ring buffer receiver for audio samples
    audio_rx: Consumer<f32>,
    /// Audio sample buffer for visualization
    audio_buffer: Vec<f32>,
    sample_rate: f32,
    /// Last rejected key, shown until the next press
    last_error: Option<String>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(keyboard: Keyboard<StatusLine>, audio_rx: Consumer<f32>, sample_rate: f32) -> Self {
        Self {
            keyboard,
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            sample_rate,
            last_error: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();

            // Deferred voice cleanup rides on the UI tick
            self.keyboard.poll();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.keyboard.manager_mut().close();
        Ok(())
    }

    /// Poll for new audio samples from ring buffer
    fn poll_audio(&mut self) {
        let mut new_samples = Vec::new();
        while let Ok(sample) = self.audio_rx.pop() {
            new_samples.push(sample);
        }

        if !new_samples.is_empty() {
            // Append new samples and keep only the last VIS_BUFFER_SIZE
            self.audio_buffer.extend(new_samples);
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        self.last_error = None;
        match key {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.keyboard.on_reset_press(),
            KeyCode::Char(c) => {
                if let Some(note) = note_for_key(c) {
                    if let Err(err) = self.keyboard.on_key_press(note) {
                        warn!("{note}: {err}");
                        self.last_error = Some(err.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6), // Keys
                Constraint::Length(3), // Active tones
                Constraint::Min(8),    // Waveform
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        let status = self.keyboard.listener();
        render_keys(frame, chunks[0], |note| status.is_active(note));

        let mut lines = vec![Line::from(status.text().to_string())];
        if let Some(err) = &self.last_error {
            lines.push(Line::styled(err.clone(), Style::default().fg(Color::Red)));
        }
        let tones = Paragraph::new(lines)
            .style(Style::default().fg(Color::Green))
            .block(Block::default().title(" toneboard ").borders(Borders::ALL));
        frame.render_widget(tones, chunks[1]);

        render_waveform(frame, chunks[2], &self.audio_buffer, self.sample_rate);

        let help = Paragraph::new(" [keys] Toggle note  [Space] Reset  [Q/Esc] Quit")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
