// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! On-screen keyboard boundary.
//!
//! The keyboard widget emits note requests and displays the active set.
//! This module defines the event it sends and the per-key state it draws.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::music::pitch::{is_black_key, parse_pitch_name, Pitch, PIANO_HIGHEST, PIANO_LOWEST};

/// Event emitted by the keyboard widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardEvent {
    /// A key was pressed; preview the pitch
    NoteRequested(Pitch),
}

impl KeyboardEvent {
    /// Parse a note name such as "C4" or "F#3" into a request
    pub fn parse(name: &str) -> Option<Self> {
        parse_pitch_name(name).map(KeyboardEvent::NoteRequested)
    }
}

/// Display state of one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyState {
    pub pitch: Pitch,
    pub black: bool,
    pub active: bool,
}

/// Full 88-key range
pub const PIANO_RANGE: RangeInclusive<Pitch> = PIANO_LOWEST..=PIANO_HIGHEST;

/// Key states for `range`, marking pitches in `active`
pub fn key_states(range: RangeInclusive<Pitch>, active: &BTreeSet<Pitch>) -> Vec<KeyState> {
    range
        .map(|pitch| KeyState {
            pitch,
            black: is_black_key(pitch),
            active: active.contains(&pitch),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event() {
        assert_eq!(KeyboardEvent::parse("C4"), Some(KeyboardEvent::NoteRequested(60)));
        assert_eq!(KeyboardEvent::parse("nope"), None);
    }

    #[test]
    fn test_key_states() {
        let keys = key_states(PIANO_RANGE, &BTreeSet::from([60, 61]));
        assert_eq!(keys.len(), 88);
        assert_eq!(keys.iter().filter(|k| k.black).count(), 36);

        let c4 = keys.iter().find(|k| k.pitch == 60).unwrap();
        assert!(c4.active && !c4.black);
        let cs4 = keys.iter().find(|k| k.pitch == 61).unwrap();
        assert!(cs4.active && cs4.black);
        assert_eq!(keys.iter().filter(|k| k.active).count(), 2);
    }
}
