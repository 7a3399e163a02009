// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Session control.
//!
//! This module provides:
//! - The session controller that owns parameters, phrase and playback
//! - Parameter change events from the practice controls
//! - Keyboard widget events and key display state

pub mod keyboard;
pub mod params;

pub use keyboard::{key_states, KeyState, KeyboardEvent, PIANO_RANGE};
pub use params::{ParamChange, ParamError};

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::audio::{self, SharedBackend};
use crate::config::PracticeConfig;
use crate::generators::{Phrase, PhraseGenerator, PhraseParameters};
use crate::music::Pitch;
use crate::score::{self, ScoreSurface};
use crate::sequencer::{
    lock, ActiveNoteTracker, Meter, PhraseSource, PlaybackScheduler, ProgressIndicator,
};

/// Generates phrases for the current parameters and publishes their scores.
///
/// Shared with the playback task, which asks it for the next phrase at
/// every loop.
pub struct Composer {
    params: PhraseParameters,
    generator: PhraseGenerator,
    current: Arc<Phrase>,
    document: String,
    surface: Box<dyn ScoreSurface>,
    generated: u64,
}

impl Composer {
    fn new(params: PhraseParameters, mut generator: PhraseGenerator, surface: Box<dyn ScoreSurface>) -> Self {
        let current = Arc::new(generator.generate(&params));
        let mut composer = Self {
            params,
            generator,
            current: Arc::clone(&current),
            document: String::new(),
            surface,
            generated: 1,
        };
        composer.publish(&current);
        composer
    }

    /// Generate a new phrase, replacing the current one wholesale
    pub fn regenerate(&mut self) -> Arc<Phrase> {
        let phrase = Arc::new(self.generator.generate(&self.params));
        self.publish(&phrase);
        self.current = Arc::clone(&phrase);
        self.generated += 1;
        phrase
    }

    /// Encode the phrase and hand it to the surface: load, then render
    fn publish(&mut self, phrase: &Phrase) {
        let document = match score::encode(phrase, self.params.tempo).to_musicxml() {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(error = %e, "Score encoding failed; keeping previous score");
                return;
            }
        };

        match self.surface.load(&document) {
            Ok(()) => self.surface.render(),
            Err(e) => tracing::warn!(error = %e, "Score surface rejected document"),
        }
        self.document = document;
    }

    pub fn params(&self) -> PhraseParameters {
        self.params
    }

    pub fn current(&self) -> Arc<Phrase> {
        Arc::clone(&self.current)
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    /// Phrases generated so far, including the first
    pub fn generated(&self) -> u64 {
        self.generated
    }
}

impl PhraseSource for Composer {
    fn next_phrase(&mut self) -> Arc<Phrase> {
        self.regenerate()
    }
}

/// What the display shows for one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameState {
    /// Pitches sounding now
    pub active: BTreeSet<Pitch>,
    /// Pitches to light up (empty when highlighting is off)
    pub highlighted: BTreeSet<Pitch>,
    /// Phrase progress in [0, 1]
    pub progress: f64,
    pub playing: bool,
}

/// Receives one frame state per display refresh
pub trait FrameSink {
    fn present(&mut self, frame: &FrameState);
}

/// Owns the parameters, the current phrase and the playback session
pub struct SessionController {
    config: PracticeConfig,
    composer: Arc<Mutex<Composer>>,
    scheduler: PlaybackScheduler,
    tracker: ActiveNoteTracker,
    progress: ProgressIndicator,
    backend: SharedBackend,
    auto_highlight: bool,
}

impl SessionController {
    /// Create a controller with an entropy-seeded generator
    pub fn new<S: ScoreSurface + 'static>(
        config: PracticeConfig,
        backend: SharedBackend,
        surface: S,
    ) -> Result<Self, ParamError> {
        Self::with_generator(config, backend, surface, PhraseGenerator::new())
    }

    /// Create a controller drawing from the given generator
    pub fn with_generator<S: ScoreSurface + 'static>(
        config: PracticeConfig,
        backend: SharedBackend,
        surface: S,
        generator: PhraseGenerator,
    ) -> Result<Self, ParamError> {
        let params = config.initial_params()?;
        let composer = Arc::new(Mutex::new(Composer::new(params, generator, Box::new(surface))));
        let phrase = lock(&composer).current();

        let source: Arc<Mutex<dyn PhraseSource>> = composer.clone();
        let scheduler = PlaybackScheduler::new(phrase, Arc::clone(&backend), source)
            .with_guard(config.loop_guard());

        tracing::debug!(mode = %params.mode, tempo = params.tempo, "Session created");

        Ok(Self {
            auto_highlight: config.auto_highlight,
            config,
            composer,
            scheduler,
            tracker: ActiveNoteTracker::new(),
            progress: ProgressIndicator::new(),
            backend,
        })
    }

    /// Start looping playback of the current phrase.
    ///
    /// Does nothing (and returns false) while the audio backend is still
    /// loading.
    pub fn start(&mut self) -> bool {
        let phrase = self.current_phrase();
        let started = self.scheduler.start(phrase);
        if started {
            self.progress.begin_polling();
        }
        started
    }

    /// Stop playback; safe when already idle
    pub fn stop(&mut self) {
        self.scheduler.stop();
        self.progress.end_polling();
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    /// Passive readiness indicator for the host's status line
    pub fn is_audio_ready(&self) -> bool {
        audio::is_ready(&self.backend)
    }

    /// Apply a parameter change.
    ///
    /// Anything but the highlight toggle stops playback and regenerates.
    /// Playback is not resumed; the host calls [`start`](Self::start).
    pub fn apply(&mut self, change: ParamChange) -> Result<(), ParamError> {
        if !change.regenerates() {
            if let ParamChange::AutoHighlight(on) = change {
                self.auto_highlight = on;
            }
            return Ok(());
        }

        let mut params = self.params();
        match change {
            ParamChange::AutoHighlight(_) => {}
            ParamChange::Mode(mode) => params.mode = mode,
            ParamChange::Meter(meter) => {
                if meter != Meter::COMMON {
                    return Err(ParamError::UnsupportedMeter(meter));
                }
                params.meter = meter;
            }
            ParamChange::Tempo(tempo) => {
                if !self.config.is_tempo_offered(tempo) {
                    return Err(ParamError::InvalidTempo(tempo));
                }
                params.tempo = tempo;
            }
            ParamChange::Difficulty(difficulty) => params.difficulty = difficulty,
        }

        self.stop();
        let phrase = {
            let mut composer = lock(&self.composer);
            composer.params = params;
            composer.regenerate()
        };
        self.scheduler.set_phrase(phrase);

        tracing::info!(?change, "Parameters changed; phrase regenerated");
        Ok(())
    }

    /// Preview a key press, independent of playback
    pub fn note_requested(&mut self, pitch: Pitch) {
        if let Err(e) = audio::trigger(&self.backend, pitch, self.config.preview_duration()) {
            tracing::debug!(pitch, error = %e, "Preview dropped");
        }
    }

    /// Handle an event from the keyboard widget
    pub fn handle_key(&mut self, event: KeyboardEvent) {
        match event {
            KeyboardEvent::NoteRequested(pitch) => self.note_requested(pitch),
        }
    }

    /// Compute the display state for `now`
    pub fn frame(&mut self, now: Instant) -> FrameState {
        let snapshot = self.scheduler.snapshot();

        let active = self.tracker.tick(&snapshot, now).clone();

        if snapshot.playing {
            self.progress.begin_polling();
        }
        let progress = if self.progress.is_polling() {
            self.progress.tick(&snapshot, now)
        } else {
            0.0
        };

        FrameState {
            highlighted: if self.auto_highlight {
                active.clone()
            } else {
                BTreeSet::new()
            },
            active,
            progress,
            playing: snapshot.playing,
        }
    }

    /// Drive `sink` at the configured frame rate for `frames` frames
    pub async fn run_display<F: FrameSink + ?Sized>(&mut self, sink: &mut F, frames: u64) {
        let mut ticker = interval(self.config.frame_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        for _ in 0..frames {
            let now = ticker.tick().await;
            let frame = self.frame(now);
            sink.present(&frame);
        }
    }

    pub fn params(&self) -> PhraseParameters {
        lock(&self.composer).params()
    }

    pub fn current_phrase(&self) -> Arc<Phrase> {
        lock(&self.composer).current()
    }

    /// MusicXML for the current phrase
    pub fn score_document(&self) -> String {
        lock(&self.composer).document().to_string()
    }

    /// Phrases generated so far
    pub fn phrases_generated(&self) -> u64 {
        lock(&self.composer).generated()
    }

    /// Natural loop restarts so far
    pub fn loop_count(&self) -> u64 {
        self.scheduler.loop_count()
    }

    pub fn phrase_start(&self) -> Option<Instant> {
        self.scheduler.phrase_start()
    }

    pub fn auto_highlight(&self) -> bool {
        self.auto_highlight
    }

    pub fn config(&self) -> &PracticeConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioBackend;
    use crate::generators::Difficulty;
    use crate::music::Mode;
    use crate::score::MemorySurface;
    use std::time::Duration;
    use tokio::time::sleep;

    #[derive(Default)]
    struct MockBackend {
        ready: bool,
        notes: Vec<(Pitch, Duration)>,
    }

    impl AudioBackend for MockBackend {
        fn is_ready(&self) -> bool {
            self.ready
        }

        fn trigger_note(&mut self, pitch: Pitch, duration: Duration) {
            self.notes.push((pitch, duration));
        }
    }

    fn controller(ready: bool) -> (SessionController, Arc<Mutex<MockBackend>>) {
        let backend = Arc::new(Mutex::new(MockBackend {
            ready,
            ..Default::default()
        }));
        let shared: SharedBackend = backend.clone();
        let controller = SessionController::with_generator(
            PracticeConfig::default(),
            shared,
            MemorySurface::new(),
            PhraseGenerator::with_seed(17),
        )
        .unwrap();
        (controller, backend)
    }

    #[test]
    fn test_initial_phrase_and_score() {
        let (controller, _) = controller(true);
        assert!(!controller.is_playing());
        assert_eq!(controller.phrases_generated(), 1);
        assert_eq!(controller.current_phrase().treble().count(), 16);

        let xml = controller.score_document();
        assert_eq!(xml.matches("<measure number=").count(), 4);
        assert!(xml.contains("<per-minute>100</per-minute>"));
    }

    #[test]
    fn test_invalid_initial_tempo() {
        let config = PracticeConfig {
            tempo: 95,
            ..Default::default()
        };
        let backend = audio::shared(MockBackend::default());
        let result = SessionController::new(config, backend, MemorySurface::new());
        assert_eq!(result.err(), Some(ParamError::InvalidTempo(95)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_noop_when_not_ready() {
        let (mut controller, backend) = controller(false);
        assert!(!controller.is_audio_ready());
        assert!(!controller.start());
        assert!(!controller.is_playing());

        sleep(Duration::from_secs(5)).await;
        assert!(backend.lock().unwrap().notes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parameter_change_stops_and_regenerates() {
        let (mut controller, backend) = controller(true);
        let before = controller.current_phrase();

        assert!(controller.start());
        sleep(Duration::from_millis(100)).await;
        assert!(controller.is_playing());

        controller.apply(ParamChange::Difficulty(Difficulty::HARD)).unwrap();
        assert!(!controller.is_playing());
        assert!(!Arc::ptr_eq(&before, &controller.current_phrase()));
        assert_eq!(controller.params().difficulty, Difficulty::HARD);
        assert_eq!(controller.phrases_generated(), 2);
        for (_, pitches) in controller.current_phrase().chords() {
            assert_eq!(pitches.len(), 5);
        }

        // No auto-resume: nothing further sounds
        let played = backend.lock().unwrap().notes.len();
        sleep(Duration::from_secs(30)).await;
        assert_eq!(backend.lock().unwrap().notes.len(), played);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tempo_change_updates_score() {
        let (mut controller, _) = controller(true);
        controller.apply(ParamChange::Tempo(120)).unwrap();
        assert!(controller.score_document().contains("<per-minute>120</per-minute>"));

        assert_eq!(
            controller.apply(ParamChange::Tempo(97)),
            Err(ParamError::InvalidTempo(97))
        );
        assert_eq!(controller.params().tempo, 120);
    }

    #[test]
    fn test_unsupported_meter_rejected() {
        let (mut controller, _) = controller(true);
        let waltz = Meter {
            beats_per_bar: 3,
            beat_unit: 4,
        };
        assert_eq!(
            controller.apply(ParamChange::Meter(waltz)),
            Err(ParamError::UnsupportedMeter(waltz))
        );
        assert_eq!(controller.phrases_generated(), 1);
    }

    #[test]
    fn test_mode_change_regenerates() {
        let (mut controller, _) = controller(true);
        controller.apply(ParamChange::Mode(Mode::GMajor)).unwrap();
        assert_eq!(controller.params().mode, Mode::GMajor);
        assert_eq!(controller.phrases_generated(), 2);
    }

    #[test]
    fn test_note_preview_independent_of_playback() {
        let (mut controller, backend) = controller(true);
        controller.handle_key(KeyboardEvent::NoteRequested(64));
        assert_eq!(
            backend.lock().unwrap().notes,
            vec![(64, Duration::from_millis(500))]
        );
    }

    #[test]
    fn test_note_preview_ignored_when_not_ready() {
        let (mut controller, backend) = controller(false);
        controller.note_requested(64);
        assert!(backend.lock().unwrap().notes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_frame_state() {
        let (mut controller, _) = controller(true);

        let idle = controller.frame(Instant::now());
        assert!(idle.active.is_empty());
        assert_eq!(idle.progress, 0.0);
        assert!(!idle.playing);

        controller.start();
        let start = controller.phrase_start().unwrap();
        let frame = controller.frame(start + Duration::from_millis(300));
        let phrase = controller.current_phrase();

        // First melody note plus the first bar's chord
        let expected: BTreeSet<Pitch> = phrase.events()[0..4].iter().map(|e| e.pitch).collect();
        assert_eq!(frame.active, expected);
        assert_eq!(frame.highlighted, expected);
        assert!(frame.progress > 0.0 && frame.progress < 0.05);

        controller.apply(ParamChange::AutoHighlight(false)).unwrap();
        assert!(controller.is_playing());
        let frame = controller.frame(start + Duration::from_millis(300));
        assert_eq!(frame.active, expected);
        assert!(frame.highlighted.is_empty());

        controller.stop();
        let frame = controller.frame(start + Duration::from_millis(300));
        assert!(frame.active.is_empty());
        assert_eq!(frame.progress, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_display_frames() {
        struct Collect(Vec<FrameState>);
        impl FrameSink for Collect {
            fn present(&mut self, frame: &FrameState) {
                self.0.push(frame.clone());
            }
        }

        let (mut controller, _) = controller(true);
        controller.start();

        let mut sink = Collect(Vec::new());
        controller.run_display(&mut sink, 30).await;

        assert_eq!(sink.0.len(), 30);
        assert!(sink.0.iter().all(|f| f.playing));
        assert!(sink.0.windows(2).all(|w| w[0].progress <= w[1].progress));
        assert!(sink.0.last().unwrap().progress > 0.0);
    }
}
