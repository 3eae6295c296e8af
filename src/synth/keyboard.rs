use log::debug;

use crate::error::Result;
use crate::synth::manager::ToneManager;

/// Receives the active-note list after every change.
///
/// Closures taking `&[&str]` implement this directly.
pub trait ActiveTonesListener {
    fn active_tones_changed(&mut self, active: &[&str]);
}

impl<F> ActiveTonesListener for F
where
    F: FnMut(&[&str]),
{
    fn active_tones_changed(&mut self, active: &[&str]) {
        self(active)
    }
}

/// The display line for a set of active notes.
pub fn format_active_tones(active: &[&str]) -> String {
    if active.is_empty() {
        "Active Tones: None".to_string()
    } else {
        format!("Active Tones: {}", active.join(", "))
    }
}

/// Toggle-style front end for a [`ToneManager`].
///
/// Presentation code forwards key presses here and never decides between
/// start and stop itself. The listener hears about every press, reset and
/// cleanup that changes the active set.
pub struct Keyboard<L: ActiveTonesListener> {
    manager: ToneManager,
    listener: L,
}

impl<L: ActiveTonesListener> Keyboard<L> {
    pub fn new(manager: ToneManager, listener: L) -> Self {
        Self { manager, listener }
    }

    pub fn manager(&self) -> &ToneManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ToneManager {
        &mut self.manager
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Stop `note` if it has a voice (sounding or releasing), otherwise start it.
    pub fn on_key_press(&mut self, note: &str) -> Result<()> {
        if self.manager.is_active(note) {
            debug!("{note}: key press -> stop");
            self.manager.stop_note(note)?;
        } else {
            debug!("{note}: key press -> start");
            self.manager.start_note(note)?;
        }
        self.notify();
        Ok(())
    }

    pub fn on_reset_press(&mut self) {
        debug!("reset pressed with {} active", self.manager.len());
        self.manager.reset_all();
        self.notify();
    }

    /// Run due cleanups. Returns true when voices were removed (and the
    /// listener was told).
    pub fn poll(&mut self) -> bool {
        let removed = self.manager.poll();
        if removed.is_empty() {
            return false;
        }
        self.notify();
        true
    }

    pub fn active_notes(&self) -> Vec<&'static str> {
        self.manager.active_notes()
    }

    fn notify(&mut self) {
        let active = self.manager.active_notes();
        self.listener.active_tones_changed(&active);
    }
}
