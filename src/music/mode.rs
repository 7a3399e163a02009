// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Practice modes offered to the learner.
//!
//! The mode is part of the phrase parameters and is carried through
//! generation, but it does not yet constrain pitch selection or the
//! accompaniment roots.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pitch::PitchClass;

/// Key/mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    CMajor,
    GMajor,
    AMinor,
}

impl Mode {
    /// All selectable modes
    pub const ALL: [Mode; 3] = [Mode::CMajor, Mode::GMajor, Mode::AMinor];

    /// Tonic pitch class
    pub fn tonic(self) -> PitchClass {
        match self {
            Mode::CMajor => PitchClass::C,
            Mode::GMajor => PitchClass::G,
            Mode::AMinor => PitchClass::A,
        }
    }

    /// Whether the mode is minor
    pub fn is_minor(self) -> bool {
        matches!(self, Mode::AMinor)
    }

    /// Parse from "c_major", "C major", "g-major", "am" etc.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "cmajor" | "c" => Some(Mode::CMajor),
            "gmajor" | "g" => Some(Mode::GMajor),
            "aminor" | "am" => Some(Mode::AMinor),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quality = if self.is_minor() { "minor" } else { "major" };
        write!(f, "{} {}", self.tonic(), quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::CMajor.to_string(), "C major");
        assert_eq!(Mode::GMajor.to_string(), "G major");
        assert_eq!(Mode::AMinor.to_string(), "A minor");
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(Mode::parse("c_major"), Some(Mode::CMajor));
        assert_eq!(Mode::parse("G major"), Some(Mode::GMajor));
        assert_eq!(Mode::parse("Am"), Some(Mode::AMinor));
        assert_eq!(Mode::parse("d dorian"), None);

        for mode in Mode::ALL {
            assert_eq!(Mode::parse(&mode.to_string()), Some(mode));
        }
    }

    #[test]
    fn test_mode_serde_names() {
        let yaml = serde_yaml::to_string(&Mode::AMinor).unwrap();
        assert_eq!(yaml.trim(), "a_minor");
        let mode: Mode = serde_yaml::from_str("g_major").unwrap();
        assert_eq!(mode, Mode::GMajor);
    }
}
