// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Symbolic score documents.
//!
//! A phrase is encoded into a typed tree (measures holding a treble voice
//! and a bass voice) which is checked against the fixed layout and then
//! serialised to MusicXML in one pass:
//! - 4 measures of 4/4, no key signature
//! - staff 1: one quarter note or rest per beat
//! - staff 2: a beamed eighth-note broken chord, or four eighth rests

pub mod encoder;
pub mod musicxml;
pub mod surface;

pub use encoder::encode;
pub use surface::{MemorySurface, ScoreSurface};

use thiserror::Error;

use crate::music::ScorePitch;
use crate::sequencer::Meter;

/// Measures in every score
pub const MEASURES: usize = 4;

/// Treble slots per measure
pub const BEATS_PER_MEASURE: usize = 4;

/// Divisions per quarter note
pub const DIVISIONS: u32 = 4;

/// Errors raised while validating or delivering a score
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("Expected {expected} measures, found {found}")]
    MeasureCount { expected: usize, found: usize },

    #[error("Measure {measure}: expected {expected} treble slots, found {found}")]
    TrebleSlots {
        measure: usize,
        expected: usize,
        found: usize,
    },

    #[error("Measure {measure}: invalid bass group of {found} entries")]
    BassGroup { measure: usize, found: usize },

    #[error("Measure {measure}: broken beam on bass entry {index}")]
    Beam { measure: usize, index: usize },

    #[error("Score surface rejected document: {0}")]
    Surface(String),
}

/// Written note length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValue {
    Quarter,
    Eighth,
}

impl NoteValue {
    /// MusicXML `<type>` name
    pub fn type_name(self) -> &'static str {
        match self {
            NoteValue::Quarter => "quarter",
            NoteValue::Eighth => "eighth",
        }
    }

    /// Length in divisions
    pub fn divisions(self) -> u32 {
        match self {
            NoteValue::Quarter => DIVISIONS,
            NoteValue::Eighth => DIVISIONS / 2,
        }
    }
}

/// Beam marker on a beamed group member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beam {
    Begin,
    Continue,
    End,
}

impl Beam {
    pub fn as_str(self) -> &'static str {
        match self {
            Beam::Begin => "begin",
            Beam::Continue => "continue",
            Beam::End => "end",
        }
    }

    /// Marker for position `index` in a group of `len` (len >= 2)
    pub fn for_position(index: usize, len: usize) -> Self {
        if index == 0 {
            Beam::Begin
        } else if index + 1 == len {
            Beam::End
        } else {
            Beam::Continue
        }
    }
}

/// A note or rest in one voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreEntry {
    /// Pitch, `None` for a rest
    pub pitch: Option<ScorePitch>,
    pub value: NoteValue,
    pub beam: Option<Beam>,
}

impl ScoreEntry {
    pub fn note(pitch: ScorePitch, value: NoteValue) -> Self {
        Self {
            pitch: Some(pitch),
            value,
            beam: None,
        }
    }

    pub fn rest(value: NoteValue) -> Self {
        Self {
            pitch: None,
            value,
            beam: None,
        }
    }

    pub fn with_beam(mut self, beam: Beam) -> Self {
        self.beam = Some(beam);
        self
    }

    pub fn is_rest(&self) -> bool {
        self.pitch.is_none()
    }
}

/// One measure: the treble voice followed by the bass voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measure {
    /// 1-based measure number
    pub number: usize,
    pub treble: Vec<ScoreEntry>,
    pub bass: Vec<ScoreEntry>,
}

impl Measure {
    /// Total treble length in divisions
    pub fn treble_divisions(&self) -> u32 {
        self.treble.iter().map(|e| e.value.divisions()).sum()
    }

    /// Total bass length in divisions
    pub fn bass_divisions(&self) -> u32 {
        self.bass.iter().map(|e| e.value.divisions()).sum()
    }

    fn validate(&self) -> Result<(), ScoreError> {
        let treble_ok = self.treble.len() == BEATS_PER_MEASURE
            && self.treble.iter().all(|e| e.value == NoteValue::Quarter);
        if !treble_ok {
            return Err(ScoreError::TrebleSlots {
                measure: self.number,
                expected: BEATS_PER_MEASURE,
                found: self.treble.len(),
            });
        }

        let all_eighths = self.bass.iter().all(|e| e.value == NoteValue::Eighth);
        let all_rests = self.bass.iter().all(ScoreEntry::is_rest);
        let any_rest = self.bass.iter().any(ScoreEntry::is_rest);

        if all_rests {
            if self.bass.len() != BEATS_PER_MEASURE || !all_eighths {
                return Err(ScoreError::BassGroup {
                    measure: self.number,
                    found: self.bass.len(),
                });
            }
            return Ok(());
        }

        if any_rest || !all_eighths || !(2..=4).contains(&self.bass.len()) {
            return Err(ScoreError::BassGroup {
                measure: self.number,
                found: self.bass.len(),
            });
        }

        for (index, entry) in self.bass.iter().enumerate() {
            if entry.beam != Some(Beam::for_position(index, self.bass.len())) {
                return Err(ScoreError::Beam {
                    measure: self.number,
                    index,
                });
            }
        }

        Ok(())
    }
}

/// A complete two-staff score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreDocument {
    /// Metronome marking in BPM
    pub tempo: u32,
    pub meter: Meter,
    pub measures: Vec<Measure>,
}

impl ScoreDocument {
    /// Check the fixed layout: measure count, slot counts and beams
    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.measures.len() != MEASURES {
            return Err(ScoreError::MeasureCount {
                expected: MEASURES,
                found: self.measures.len(),
            });
        }
        self.measures.iter().try_for_each(Measure::validate)
    }

    /// Validate and serialise to MusicXML
    pub fn to_musicxml(&self) -> Result<String, ScoreError> {
        self.validate()?;
        Ok(musicxml::to_musicxml(self))
    }
}
