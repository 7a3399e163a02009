// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Music theory utilities.
//!
//! This module provides pitch naming, keyboard classification and the
//! practice modes used by the phrase generator.

pub mod mode;
pub mod pitch;

pub use mode::Mode;
pub use pitch::{
    is_black_key, pitch_name, to_score_spelling, Pitch, PitchClass, ScorePitch,
};
