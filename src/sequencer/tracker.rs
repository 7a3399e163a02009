// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Per-frame highlight state.
//!
//! Nothing here owns a timer. Both readers are pull-based queries over the
//! transport snapshot and a clock reading, so the host decides how often
//! to refresh.

use std::collections::BTreeSet;
use std::time::Duration;

use tokio::time::Instant;

use super::scheduler::TransportSnapshot;
use crate::generators::Phrase;
use crate::music::Pitch;

/// Pitches whose sounding interval `[time, time + duration]` contains
/// `elapsed` seconds
pub fn active_pitches(phrase: &Phrase, elapsed: f64) -> BTreeSet<Pitch> {
    phrase
        .events()
        .iter()
        .filter(|e| e.is_sounding_at(elapsed))
        .map(|e| e.pitch)
        .collect()
}

/// Fraction of the phrase played, clamped to [0, 1]
pub fn progress(elapsed: Duration, phrase_duration: Duration) -> f64 {
    if phrase_duration.is_zero() {
        return 0.0;
    }
    (elapsed.as_secs_f64() / phrase_duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Tracks which pitches are sounding. Polled every frame, idle or not,
/// so a stop is reflected on the very next frame.
#[derive(Debug, Default)]
pub struct ActiveNoteTracker {
    active: BTreeSet<Pitch>,
}

impl ActiveNoteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the active set for `now`
    pub fn tick(&mut self, snapshot: &TransportSnapshot, now: Instant) -> &BTreeSet<Pitch> {
        match snapshot.elapsed(now) {
            Some(elapsed) => {
                self.active = active_pitches(&snapshot.phrase, elapsed.as_secs_f64());
            }
            None => self.active.clear(),
        }
        &self.active
    }

    /// Active set from the last tick
    pub fn active(&self) -> &BTreeSet<Pitch> {
        &self.active
    }

    pub fn is_active(&self, pitch: Pitch) -> bool {
        self.active.contains(&pitch)
    }
}

/// Phrase progress bar. Polls only while playing.
#[derive(Debug, Default)]
pub struct ProgressIndicator {
    value: f64,
    polling: bool,
}

impl ProgressIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin per-frame polling; false if already polling
    pub fn begin_polling(&mut self) -> bool {
        if self.polling {
            return false;
        }
        self.polling = true;
        true
    }

    /// Stop polling and reset to zero
    pub fn end_polling(&mut self) {
        self.polling = false;
        self.value = 0.0;
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    /// Update for `now`; an idle transport ends polling
    pub fn tick(&mut self, snapshot: &TransportSnapshot, now: Instant) -> f64 {
        match snapshot.elapsed(now) {
            Some(elapsed) if self.polling => {
                self.value = progress(elapsed, snapshot.phrase.duration());
            }
            Some(_) => {}
            None => self.end_polling(),
        }
        self.value
    }

    /// Value from the last tick
    pub fn value(&self) -> f64 {
        self.value
    }
}
