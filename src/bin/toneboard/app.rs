//! Audio device setup and the glue between the stream, the tone manager and the UI.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::info;
use ratatui::DefaultTerminal;
use rtrb::{PushError, RingBuffer};

use toneboard::{
    format_active_tones, ActiveTonesListener, AudioContext, Keyboard, ToneConfig, ToneManager,
};

use crate::ui::UiApp;

// Capacity of the audio→UI sample ring
const SCOPE_RING_LEN: usize = 16 * 1024;

/// Holds the latest "Active Tones" line for the UI to draw.
pub struct StatusLine {
    text: String,
    active: Vec<String>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self {
            text: format_active_tones(&[]),
            active: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_active(&self, note: &str) -> bool {
        self.active.iter().any(|n| n == note)
    }
}

impl ActiveTonesListener for StatusLine {
    fn active_tones_changed(&mut self, active: &[&str]) {
        self.text = format_active_tones(active);
        self.active = active.iter().map(|n| n.to_string()).collect();
        info!("{}", self.text);
    }
}

pub fn run(mut terminal: DefaultTerminal) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;
    info!("output: {sample_rate} Hz, {channels} channel(s)");

    let context = AudioContext::new(sample_rate);
    let (scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_RING_LEN);

    let stream = device
        .build_output_stream(
            &config.into(),
            {
                let context = context.clone();
                let mut scope_tx = scope_tx;
                move |data: &mut [f32], _| {
                    context.render_interleaved(data, channels);

                    // First channel to the scope, drop on overflow
                    for frame in data.chunks(channels.max(1)) {
                        if let Err(PushError::Full(_)) = scope_tx.push(frame[0]) {
                            break;
                        }
                    }
                }
            },
            move |err| log::error!("stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;

    let manager = ToneManager::with_config(context, ToneConfig::default());
    let keyboard = Keyboard::new(manager, StatusLine::new());

    UiApp::new(keyboard, scope_rx, sample_rate).run(&mut terminal)
}
