// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Bass accompaniment chords.
//!
//! Each bar gets one chord. A random seed from the bass range is snapped
//! to the nearest of three fixed roots, then voiced as a major triad with
//! extra tones added as difficulty rises.

use std::ops::RangeInclusive;

use rand::Rng;

use super::Difficulty;
use crate::music::Pitch;

/// Bass seed range (C2 to C4)
pub const BASS_RANGE: RangeInclusive<Pitch> = 36..=60;

/// Chord roots the seed snaps to (C3, F3, G3)
pub const TRIAD_ROOTS: [Pitch; 3] = [48, 53, 55];

/// Major third above the root
const MAJOR_THIRD: Pitch = 4;
/// Perfect fifth above the root
const FIFTH: Pitch = 7;
/// Major seventh above the root
const MAJOR_SEVENTH: Pitch = 11;
/// Octave below the root
const OCTAVE: Pitch = 12;

/// Snap a seed to the nearest triad root.
///
/// Ties go to the earlier root in [`TRIAD_ROOTS`]: the scan only replaces
/// the best candidate on a strictly smaller distance.
pub fn snap_to_triad_root(seed: Pitch) -> Pitch {
    let mut best = TRIAD_ROOTS[0];
    let mut best_distance = seed.abs_diff(best);

    for &root in &TRIAD_ROOTS[1..] {
        let distance = seed.abs_diff(root);
        if distance < best_distance {
            best = root;
            best_distance = distance;
        }
    }

    best
}

/// Voice a chord on `root` for the given difficulty.
///
/// Difficulty 1 is the bare triad, 2 adds the root an octave down, 3 adds
/// the major seventh as well.
pub fn build_chord(root: Pitch, difficulty: Difficulty) -> Vec<Pitch> {
    let mut chord = vec![root, root + MAJOR_THIRD, root + FIFTH];
    if difficulty.level() >= 2 {
        chord.push(root - OCTAVE);
    }
    if difficulty.level() >= 3 {
        chord.push(root + MAJOR_SEVENTH);
    }
    chord
}

/// Draw a seed and snap it to a root
pub fn draw_root<R: Rng + ?Sized>(rng: &mut R) -> Pitch {
    snap_to_triad_root(rng.gen_range(BASS_RANGE))
}

/// Number of tones [`build_chord`] produces at a difficulty
pub fn chord_size(difficulty: Difficulty) -> usize {
    3 + (difficulty.level() >= 2) as usize + (difficulty.level() >= 3) as usize
}
