// Purpose: Tone lifecycle, voices and the toggle keyboard front end
// This layer sits above the graph and owns every node a note allocates

pub mod keyboard;
pub mod manager;
pub mod voice;

pub use keyboard::{format_active_tones, ActiveTonesListener, Keyboard};
pub use manager::ToneManager;
pub use voice::{Voice, VoiceId, VoiceNodes, VoiceParts, VoiceState};
