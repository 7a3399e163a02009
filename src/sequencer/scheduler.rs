// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Phrase playback scheduler.
//!
//! Each playback session is one background task running an explicit loop:
//! sleep until the next note's offset from the phrase start, trigger it,
//! and after the phrase end (plus a short guard) pull the next phrase and
//! start over. Stopping aborts the task and retires its session id, so a
//! trigger that somehow wakes late sees a stale session and does nothing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::lock;
use crate::audio::{self, AudioError, SharedBackend};
use crate::generators::Phrase;

/// Delay after the phrase end before looping, so the last note is not cut
pub const LOOP_GUARD: Duration = Duration::from_millis(50);

/// Supplies the next phrase when a loop completes
pub trait PhraseSource: Send {
    fn next_phrase(&mut self) -> Arc<Phrase>;
}

/// Source shared between the controller and the playback task
pub type SharedSource = Arc<Mutex<dyn PhraseSource>>;

/// Point-in-time view of the transport
#[derive(Debug, Clone)]
pub struct TransportSnapshot {
    /// Phrase being played (or last played)
    pub phrase: Arc<Phrase>,
    /// Instant the current phrase started, `None` when idle
    pub phrase_start: Option<Instant>,
    pub playing: bool,
}

impl TransportSnapshot {
    /// Time since the phrase started, `None` when idle
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        match (self.playing, self.phrase_start) {
            (true, Some(start)) => Some(now.saturating_duration_since(start)),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Transport {
    phrase: Arc<Phrase>,
    phrase_start: Option<Instant>,
    playing: bool,
    /// Incremented on every start and stop
    session: u64,
    /// Completed phrase loops since the scheduler was created
    loops: u64,
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_default()
}

/// Loops phrases against the wall clock and drives the audio backend
pub struct PlaybackScheduler {
    transport: Arc<Mutex<Transport>>,
    backend: SharedBackend,
    source: SharedSource,
    guard: Duration,
    task: Option<JoinHandle<()>>,
}

impl PlaybackScheduler {
    /// Create an idle scheduler holding `phrase`
    pub fn new(phrase: Arc<Phrase>, backend: SharedBackend, source: SharedSource) -> Self {
        Self {
            transport: Arc::new(Mutex::new(Transport {
                phrase,
                phrase_start: None,
                playing: false,
                session: 0,
                loops: 0,
            })),
            backend,
            source,
            guard: LOOP_GUARD,
            task: None,
        }
    }

    /// Override the loop guard interval
    pub fn with_guard(mut self, guard: Duration) -> Self {
        self.guard = guard;
        self
    }

    /// Start playing `phrase` from now.
    ///
    /// Returns false without changing state if the backend is not ready
    /// or there is no tokio runtime. Any previous session is cancelled
    /// first.
    pub fn start(&mut self, phrase: Arc<Phrase>) -> bool {
        if !audio::is_ready(&self.backend) {
            tracing::debug!("Audio backend not ready; ignoring start");
            return false;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime; cannot schedule playback");
            return false;
        };

        self.cancel();

        let started_at = Instant::now();
        let session = {
            let mut transport = lock(&self.transport);
            transport.session += 1;
            transport.playing = true;
            transport.phrase_start = Some(started_at);
            transport.phrase = Arc::clone(&phrase);
            transport.session
        };

        tracing::info!(
            session,
            events = phrase.len(),
            duration_ms = phrase.duration().as_millis() as u64,
            "Playback started"
        );

        let task = SessionTask {
            session,
            phrase,
            started_at,
            guard: self.guard,
            transport: Arc::clone(&self.transport),
            backend: Arc::clone(&self.backend),
            source: Arc::clone(&self.source),
        };
        self.task = Some(runtime.spawn(task.run()));
        true
    }

    /// Stop playback and cancel every pending trigger. Idempotent.
    pub fn stop(&mut self) {
        let was_playing = lock(&self.transport).playing;
        self.cancel();
        if was_playing {
            tracing::info!("Playback stopped");
        }
    }

    /// Replace the idle phrase shown to readers of the transport
    pub fn set_phrase(&mut self, phrase: Arc<Phrase>) {
        lock(&self.transport).phrase = phrase;
    }

    /// Check if playing
    pub fn is_playing(&self) -> bool {
        lock(&self.transport).playing
    }

    /// Start instant of the phrase currently playing
    pub fn phrase_start(&self) -> Option<Instant> {
        lock(&self.transport).phrase_start
    }

    /// Number of natural loop restarts so far
    pub fn loop_count(&self) -> u64 {
        lock(&self.transport).loops
    }

    /// Copy of the transport state for per-frame readers
    pub fn snapshot(&self) -> TransportSnapshot {
        let transport = lock(&self.transport);
        TransportSnapshot {
            phrase: Arc::clone(&transport.phrase),
            phrase_start: transport.phrase_start,
            playing: transport.playing,
        }
    }

    fn cancel(&mut self) {
        {
            let mut transport = lock(&self.transport);
            transport.playing = false;
            transport.phrase_start = None;
            transport.session += 1;
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// State owned by one session's background task
struct SessionTask {
    session: u64,
    phrase: Arc<Phrase>,
    started_at: Instant,
    guard: Duration,
    transport: Arc<Mutex<Transport>>,
    backend: SharedBackend,
    source: SharedSource,
}

impl SessionTask {
    fn is_current(&self, transport: &Transport) -> bool {
        transport.playing && transport.session == self.session
    }

    async fn run(mut self) {
        loop {
            for event in self.phrase.events_by_time() {
                sleep_until(self.started_at + seconds(event.time)).await;

                // Held through the note-on so stop() waits for it
                let transport = lock(&self.transport);
                if !self.is_current(&transport) {
                    tracing::trace!(session = self.session, "Stale trigger ignored");
                    return;
                }
                match audio::trigger(&self.backend, event.pitch, seconds(event.duration)) {
                    Ok(()) => tracing::trace!(pitch = event.pitch, time = event.time, "Trigger"),
                    Err(AudioError::NotReady) => tracing::debug!("Backend not ready; note dropped"),
                    Err(e) => tracing::warn!(error = %e, "Trigger failed"),
                }
            }

            sleep_until(self.started_at + self.phrase.duration() + self.guard).await;

            let (next, now, loops) = {
                let mut transport = lock(&self.transport);
                if !self.is_current(&transport) {
                    return;
                }
                let next = lock(&self.source).next_phrase();
                let now = Instant::now();
                transport.phrase = Arc::clone(&next);
                transport.phrase_start = Some(now);
                transport.loops += 1;
                (next, now, transport.loops)
            };

            tracing::info!(session = self.session, loops, "Phrase looped");
            self.phrase = next;
            self.started_at = now;
        }
    }
}
