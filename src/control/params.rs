// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Parameter change events from the practice controls.
//!
//! Every change except the highlight toggle invalidates the current
//! phrase: the controller stops playback and regenerates.

use thiserror::Error;

use crate::generators::Difficulty;
use crate::music::Mode;
use crate::sequencer::Meter;

/// Parameter errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Difficulty must be 1-3, got {0}")]
    InvalidDifficulty(u8),

    #[error("Tempo {0} BPM is not one of the offered tempos")]
    InvalidTempo(u32),

    #[error("Unknown mode: {0}")]
    InvalidMode(String),

    #[error("Unsupported meter {0}; only 4/4 is laid out")]
    UnsupportedMeter(Meter),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// A discrete change emitted by a parameter control
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamChange {
    Mode(Mode),
    Meter(Meter),
    Tempo(u32),
    Difficulty(Difficulty),
    /// Show or hide the live-note highlight (computation continues)
    AutoHighlight(bool),
}

impl ParamChange {
    /// Check if this change invalidates the current phrase
    pub fn regenerates(&self) -> bool {
        !matches!(self, ParamChange::AutoHighlight(_))
    }

    /// Parse "name=value", e.g. "tempo=120", "mode=g_major", "difficulty=3"
    pub fn parse(s: &str) -> Result<Self, ParamError> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| ParamError::UnknownParameter(s.trim().to_string()))?;
        let name = name.trim().to_lowercase();
        let value = value.trim();

        let invalid = || ParamError::InvalidValue {
            name: name.clone(),
            value: value.to_string(),
        };

        match name.as_str() {
            "mode" => Mode::parse(value)
                .map(ParamChange::Mode)
                .ok_or_else(|| ParamError::InvalidMode(value.to_string())),
            "meter" => Meter::parse(value).map(ParamChange::Meter).ok_or_else(invalid),
            "tempo" | "bpm" => value.parse().map(ParamChange::Tempo).map_err(|_| invalid()),
            "difficulty" => {
                let level: u8 = value.parse().map_err(|_| invalid())?;
                Ok(ParamChange::Difficulty(Difficulty::try_from(level)?))
            }
            "highlight" | "auto_highlight" => match value.to_lowercase().as_str() {
                "on" | "true" | "1" => Ok(ParamChange::AutoHighlight(true)),
                "off" | "false" | "0" => Ok(ParamChange::AutoHighlight(false)),
                _ => Err(invalid()),
            },
            _ => Err(ParamError::UnknownParameter(name.clone())),
        }
    }
}
