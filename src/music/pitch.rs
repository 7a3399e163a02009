// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch naming and keyboard classification.
//!
//! Pitches are MIDI note numbers. Every spelling produced here is
//! sharp-based: the score never carries flats, so the same pitch always
//! serialises to the same step/alter pair.

use std::fmt;

/// MIDI note number (0-127, 21-108 on an 88-key instrument)
pub type Pitch = u8;

/// Lowest key of an 88-key piano (A0)
pub const PIANO_LOWEST: Pitch = 21;

/// Highest key of an 88-key piano (C8)
pub const PIANO_HIGHEST: Pitch = 108;

/// Pitch classes, sharp-spelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Pitch class of a MIDI note
    pub fn from_pitch(pitch: Pitch) -> Self {
        PitchClass::ALL[(pitch % 12) as usize]
    }

    /// Semitone index (0-11)
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Black keys sit on pitch classes {1, 3, 6, 8, 10}
    pub fn is_black(self) -> bool {
        matches!(
            self,
            PitchClass::Cs | PitchClass::Ds | PitchClass::Fs | PitchClass::Gs | PitchClass::As
        )
    }

    /// Letter name used as the score step
    pub fn step(self) -> char {
        match self {
            PitchClass::C | PitchClass::Cs => 'C',
            PitchClass::D | PitchClass::Ds => 'D',
            PitchClass::E => 'E',
            PitchClass::F | PitchClass::Fs => 'F',
            PitchClass::G | PitchClass::Gs => 'G',
            PitchClass::A | PitchClass::As => 'A',
            PitchClass::B => 'B',
        }
    }

    /// Chromatic alteration: 0 for naturals, +1 for sharps
    pub fn alter(self) -> i8 {
        if self.is_black() {
            1
        } else {
            0
        }
    }

    /// Parse a sharp or natural name ("C", "F#", "fs")
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" => Some(PitchClass::C),
            "C#" | "CS" => Some(PitchClass::Cs),
            "D" => Some(PitchClass::D),
            "D#" | "DS" => Some(PitchClass::Ds),
            "E" => Some(PitchClass::E),
            "F" => Some(PitchClass::F),
            "F#" | "FS" => Some(PitchClass::Fs),
            "G" => Some(PitchClass::G),
            "G#" | "GS" => Some(PitchClass::Gs),
            "A" => Some(PitchClass::A),
            "A#" | "AS" => Some(PitchClass::As),
            "B" => Some(PitchClass::B),
            _ => None,
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        };
        f.write_str(name)
    }
}

/// Score spelling of a pitch: letter step, sharp alteration and octave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScorePitch {
    pub step: char,
    pub alter: i8,
    pub octave: i8,
}

/// Octave number with middle C (60) in octave 4
pub fn octave(pitch: Pitch) -> i8 {
    (pitch / 12) as i8 - 1
}

/// True when the pitch is played on a black key
pub fn is_black_key(pitch: Pitch) -> bool {
    PitchClass::from_pitch(pitch).is_black()
}

/// Sharp-spelled name with octave, e.g. 60 -> "C4", 61 -> "C#4"
pub fn pitch_name(pitch: Pitch) -> String {
    format!("{}{}", PitchClass::from_pitch(pitch), octave(pitch))
}

/// Step/alter/octave triple for score output. Never produces flats.
pub fn to_score_spelling(pitch: Pitch) -> ScorePitch {
    let class = PitchClass::from_pitch(pitch);
    ScorePitch {
        step: class.step(),
        alter: class.alter(),
        octave: octave(pitch),
    }
}

/// Parse a name such as "C4", "F#3" or "A-1" back to a pitch
pub fn parse_pitch_name(name: &str) -> Option<Pitch> {
    let name = name.trim();
    let split = name.find(|c: char| c == '-' || c.is_ascii_digit())?;
    let (class, octave) = name.split_at(split);
    let class = PitchClass::parse(class)?;
    let octave: i16 = octave.parse().ok()?;
    let midi = (octave + 1) * 12 + class.index() as i16;
    u8::try_from(midi).ok().filter(|p| *p <= 127)
}
