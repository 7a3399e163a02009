// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequencer core for phrase playback.
//!
//! This module provides the playback infrastructure:
//! - Phrase timing shared by generation, encoding and playback
//! - Playback scheduler that loops phrases against the wall clock
//! - Active-note tracker and progress indicator polled per frame

pub mod scheduler;
pub mod tracker;

pub use scheduler::{PhraseSource, PlaybackScheduler, TransportSnapshot, LOOP_GUARD};
pub use tracker::{active_pitches, progress, ActiveNoteTracker, ProgressIndicator};

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lock a mutex, recovering the data if a holder panicked
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Number of bars in every generated phrase
pub const PHRASE_BARS: u8 = 4;

/// Time signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Meter {
    /// Beats per bar (numerator)
    pub beats_per_bar: u8,
    /// Beat unit (denominator, 4 = quarter note)
    pub beat_unit: u8,
}

impl Meter {
    /// Common time, the only meter the score template lays out
    pub const COMMON: Meter = Meter {
        beats_per_bar: 4,
        beat_unit: 4,
    };

    /// Parse "4/4" style strings
    pub fn parse(s: &str) -> Option<Self> {
        let (beats, unit) = s.trim().split_once('/')?;
        Some(Self {
            beats_per_bar: beats.trim().parse().ok()?,
            beat_unit: unit.trim().parse().ok()?,
        })
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::COMMON
    }
}

impl fmt::Display for Meter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats_per_bar, self.beat_unit)
    }
}

/// Timing information for one phrase
///
/// Beat offsets are plain seconds (`f64`) so note events can carry them
/// directly. Deadlines for playback use [`Duration`] built from whole
/// nanoseconds per beat so the phrase end lands on an exact instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhraseTiming {
    /// Tempo in BPM
    pub tempo: u32,
    /// Beats per bar (time signature numerator)
    pub beats_per_bar: u8,
    /// Bars per phrase
    pub bars: u8,
}

impl Default for PhraseTiming {
    fn default() -> Self {
        Self {
            tempo: 100,
            beats_per_bar: Meter::COMMON.beats_per_bar,
            bars: PHRASE_BARS,
        }
    }
}

impl PhraseTiming {
    /// Create timing for a tempo and meter
    pub fn new(tempo: u32, meter: Meter) -> Self {
        Self {
            tempo: tempo.max(1),
            beats_per_bar: meter.beats_per_bar.max(1),
            bars: PHRASE_BARS,
        }
    }

    /// Seconds per beat (60 / tempo)
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.tempo as f64
    }

    /// Length of one beat
    pub fn beat_duration(&self) -> Duration {
        Duration::from_nanos(60_000_000_000 / self.tempo as u64)
    }

    /// Offset in seconds of a phrase-relative beat index
    ///
    /// Generation and encoding both go through here, so bar-start
    /// comparisons between them are exact.
    pub fn beat_time(&self, beat: u32) -> f64 {
        beat as f64 * self.seconds_per_beat()
    }

    /// Beats in the whole phrase
    pub fn total_beats(&self) -> u32 {
        self.beats_per_bar as u32 * self.bars as u32
    }

    /// Length of one bar in seconds
    pub fn bar_seconds(&self) -> f64 {
        self.seconds_per_beat() * self.beats_per_bar as f64
    }

    /// Length of the whole phrase
    pub fn phrase_duration(&self) -> Duration {
        self.beat_duration() * self.total_beats()
    }

    /// Length of the whole phrase in seconds
    pub fn phrase_seconds(&self) -> f64 {
        self.phrase_duration().as_secs_f64()
    }

    /// True if the beat index starts a bar
    pub fn is_downbeat(&self, beat: u32) -> bool {
        beat % self.beats_per_bar as u32 == 0
    }
}
