// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Console audio backend.
//!
//! Logs every note-on through `tracing` instead of producing sound. It
//! still goes through a simulated sample-loading phase so hosts exercise
//! the same readiness gate a real sampler would impose.

use std::time::Duration;

use super::{readiness_channel, AudioBackend, AudioReadiness};
use crate::music::{pitch_name, Pitch};

/// Backend that writes note-ons to the log
#[derive(Debug)]
pub struct ConsoleBackend {
    readiness: AudioReadiness,
    notes_played: u64,
}

impl ConsoleBackend {
    /// Create a backend that is ready immediately
    pub fn ready() -> Self {
        let (signal, readiness) = readiness_channel();
        signal.mark_ready();
        Self {
            readiness,
            notes_played: 0,
        }
    }

    /// Create a backend that becomes ready after `load_time`.
    ///
    /// Must be called inside a tokio runtime; the load runs as a
    /// background task. The returned handle lets the host wait for it.
    pub fn loading(load_time: Duration) -> (Self, AudioReadiness) {
        let (signal, readiness) = readiness_channel();

        tokio::spawn(async move {
            tracing::debug!(load_ms = load_time.as_millis() as u64, "Loading samples");
            tokio::time::sleep(load_time).await;
            signal.mark_ready();
            tracing::info!("Samples loaded");
        });

        let backend = Self {
            readiness: readiness.clone(),
            notes_played: 0,
        };
        (backend, readiness)
    }

    /// Number of notes triggered so far
    pub fn notes_played(&self) -> u64 {
        self.notes_played
    }
}

impl AudioBackend for ConsoleBackend {
    fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    fn trigger_note(&mut self, pitch: Pitch, duration: Duration) {
        self.notes_played += 1;
        tracing::info!(
            note = %pitch_name(pitch),
            pitch,
            duration_ms = duration.as_millis() as u64,
            "Note on"
        );
    }
}
