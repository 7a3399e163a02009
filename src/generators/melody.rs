// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Treble melody line.
//!
//! One note per beat, drawn uniformly from the treble range and gated
//! slightly short of the beat so consecutive notes re-articulate.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::music::Pitch;

/// Treble pitch range (C4 to C6)
pub const TREBLE_RANGE: RangeInclusive<Pitch> = 60..=84;

/// Fraction of a beat each melody note sounds
pub const MELODY_GATE: f64 = 0.9;

/// Draw one melody pitch
pub fn draw_treble<R: Rng + ?Sized>(rng: &mut R) -> Pitch {
    rng.gen_range(TREBLE_RANGE)
}

/// Sounding length of a melody note for the given beat length
pub fn melody_duration(seconds_per_beat: f64) -> f64 {
    MELODY_GATE * seconds_per_beat
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_treble_draws_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen_low = false;
        let mut seen_high = false;

        for _ in 0..5000 {
            let pitch = draw_treble(&mut rng);
            assert!(TREBLE_RANGE.contains(&pitch), "pitch {} out of range", pitch);
            seen_low |= pitch == 60;
            seen_high |= pitch == 84;
        }

        // Both ends are inclusive
        assert!(seen_low && seen_high);
    }

    #[test]
    fn test_melody_duration() {
        assert!((melody_duration(0.6) - 0.54).abs() < 1e-12);
        assert!((melody_duration(1.0) - 0.9).abs() < 1e-12);
    }
}
