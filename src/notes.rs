/*
Frequency Table
===============

The instrument plays a fixed set of 25 named pitches spanning roughly two
octaves, from Bb (58.27 Hz) up to Bb3 (233.08 Hz). Names are the labels the
on-screen keys carry, so they mix flat spellings (Bb, Eb) with sharp ones
(C#, F#, G#) the way the key layout does.

Octave suffixes are relative to this keyboard, not scientific pitch notation:

  (none)  the low octave:  Bb B C C# D Eb E F F# G G# A
  2       the next octave: Bb2 B2 C2 ... A2
  3       a single top key: Bb3

Example:
  let a = notes::lookup("A")?;     // 110.0 Hz
  let top = notes::lookup("Bb3")?; // 233.08 Hz
*/

use crate::error::{Result, ToneError};

#[cfg(feature = "serde")]
use serde::Serialize;

/// A named pitch from the table.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub name: &'static str,
    /// Fundamental frequency in Hz
    pub frequency: f32,
}

const fn note(name: &'static str, frequency: f32) -> Note {
    Note { name, frequency }
}

static TABLE: [Note; 25] = [
    note("Bb", 58.27),
    note("B", 61.74),
    note("C", 65.41),
    note("C#", 69.30),
    note("D", 73.42),
    note("Eb", 77.78),
    note("E", 82.41),
    note("F", 87.31),
    note("F#", 92.50),
    note("G", 98.00),
    note("G#", 103.83),
    note("A", 110.00),
    note("Bb2", 116.54),
    note("B2", 123.47),
    note("C2", 130.81),
    note("C#2", 138.59),
    note("D2", 146.83),
    note("Eb2", 155.56),
    note("E2", 164.81),
    note("F2", 174.61),
    note("F#2", 185.00),
    note("G2", 196.00),
    note("G#2", 207.65),
    note("A2", 220.00),
    note("Bb3", 233.08),
];

/// Every note in ascending pitch order.
pub fn all() -> &'static [Note] {
    &TABLE
}

/// Resolve a note name to its table entry.
pub fn lookup(name: &str) -> Result<Note> {
    TABLE
        .iter()
        .find(|n| n.name == name)
        .copied()
        .ok_or_else(|| ToneError::UnknownNote {
            note: name.to_string(),
        })
}

/// Fundamental frequency in Hz for a note name.
pub fn frequency(name: &str) -> Result<f32> {
    lookup(name).map(|n| n.frequency)
}
