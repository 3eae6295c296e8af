//! Control-side timing.
//!
//! Everything here runs on the control thread and reads time from the audio
//! clock, never from the wall clock.

pub mod scheduler;

pub use scheduler::{Scheduler, TaskId};
