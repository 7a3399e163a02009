// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Practice phrase generation.
//!
//! A phrase is four bars of one melody note per beat over one sustained
//! chord per bar. Pitches are drawn from a uniform random source; the
//! source can be seeded when reproducible output is needed.

pub mod chord;
pub mod melody;

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::control::params::ParamError;
use crate::music::{Mode, Pitch};
use crate::sequencer::{Meter, PhraseTiming};

/// Which stave (and hand) a note belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Staff {
    /// Melody, right hand, staff 1
    Treble,
    /// Accompaniment, left hand, staff 2
    Bass,
}

impl Staff {
    /// Staff number in the score (1-based)
    pub fn number(self) -> u8 {
        match self {
            Staff::Treble => 1,
            Staff::Bass => 2,
        }
    }
}

/// One timed sounding of a pitch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// Offset in seconds from phrase start
    pub time: f64,
    /// Sounding length in seconds
    pub duration: f64,
    /// MIDI note number
    pub pitch: Pitch,
    /// Stave the note is written on
    pub staff: Staff,
    /// Part of a simultaneous bass chord
    pub is_chord: bool,
}

impl NoteEvent {
    /// Melody note on the treble staff
    pub fn melody(time: f64, duration: f64, pitch: Pitch) -> Self {
        Self {
            time,
            duration,
            pitch,
            staff: Staff::Treble,
            is_chord: false,
        }
    }

    /// Chord tone on the bass staff
    pub fn chord_tone(time: f64, duration: f64, pitch: Pitch) -> Self {
        Self {
            time,
            duration,
            pitch,
            staff: Staff::Bass,
            is_chord: true,
        }
    }

    /// Offset at which the note stops sounding
    pub fn end(&self) -> f64 {
        self.time + self.duration
    }

    /// True if `elapsed` lies within the closed sounding interval
    pub fn is_sounding_at(&self, elapsed: f64) -> bool {
        elapsed >= self.time && elapsed <= self.end()
    }
}

/// Practice difficulty (1-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Difficulty(u8);

impl Difficulty {
    pub const EASY: Difficulty = Difficulty(1);
    pub const MEDIUM: Difficulty = Difficulty(2);
    pub const HARD: Difficulty = Difficulty(3);

    /// All difficulty levels
    pub const ALL: [Difficulty; 3] = [Difficulty::EASY, Difficulty::MEDIUM, Difficulty::HARD];

    /// Create a difficulty, `None` outside 1-3
    pub fn new(level: u8) -> Option<Self> {
        (1..=3).contains(&level).then_some(Self(level))
    }

    /// Numeric level
    pub fn level(self) -> u8 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::EASY
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = ParamError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Difficulty::new(level).ok_or(ParamError::InvalidDifficulty(level))
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inputs that fully determine a phrase's shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhraseParameters {
    /// Practice mode (carried, not yet used for pitch selection)
    pub mode: Mode,
    /// Time signature
    pub meter: Meter,
    /// Tempo in BPM
    pub tempo: u32,
    /// Chord density
    pub difficulty: Difficulty,
}

impl Default for PhraseParameters {
    fn default() -> Self {
        Self {
            mode: Mode::CMajor,
            meter: Meter::COMMON,
            tempo: 100,
            difficulty: Difficulty::EASY,
        }
    }
}

impl PhraseParameters {
    /// Timing derived from tempo and meter
    pub fn timing(&self) -> PhraseTiming {
        PhraseTiming::new(self.tempo, self.meter)
    }
}

/// One generated four-bar passage
///
/// Events are kept in generation order: each beat's melody note comes
/// before that beat's chord tones. Consumers that need chronological
/// order use [`Phrase::events_by_time`].
#[derive(Debug, Clone, PartialEq)]
pub struct Phrase {
    events: Vec<NoteEvent>,
    timing: PhraseTiming,
}

impl Phrase {
    /// Build a phrase from events and the timing they were laid out with
    pub fn new(events: Vec<NoteEvent>, timing: PhraseTiming) -> Self {
        Self { events, timing }
    }

    /// Events in generation order
    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    /// Timing the phrase was generated with
    pub fn timing(&self) -> &PhraseTiming {
        &self.timing
    }

    /// Total phrase length
    pub fn duration(&self) -> std::time::Duration {
        self.timing.phrase_duration()
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if the phrase has no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Melody events
    pub fn treble(&self) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter().filter(|e| e.staff == Staff::Treble)
    }

    /// Accompaniment events
    pub fn bass(&self) -> impl Iterator<Item = &NoteEvent> {
        self.events.iter().filter(|e| e.staff == Staff::Bass)
    }

    /// Bass chords as (onset, pitches) in onset order
    pub fn chords(&self) -> Vec<(f64, Vec<Pitch>)> {
        let mut chords: Vec<(f64, Vec<Pitch>)> = Vec::new();
        for event in self.bass() {
            match chords.iter_mut().find(|(time, _)| *time == event.time) {
                Some((_, pitches)) => pitches.push(event.pitch),
                None => chords.push((event.time, vec![event.pitch])),
            }
        }
        chords.sort_by(|a, b| a.0.total_cmp(&b.0));
        chords
    }

    /// Events sorted by onset; ties keep generation order
    pub fn events_by_time(&self) -> Vec<NoteEvent> {
        let mut events = self.events.clone();
        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        events
    }
}

/// Generates practice phrases from a uniform random source
pub struct PhraseGenerator<R = StdRng> {
    rng: R,
}

impl PhraseGenerator<StdRng> {
    /// Create a generator seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a reproducible generator
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for PhraseGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> PhraseGenerator<R> {
    /// Create a generator drawing from the given source
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a phrase for the given parameters
    pub fn generate(&mut self, params: &PhraseParameters) -> Phrase {
        let timing = params.timing();
        let spb = timing.seconds_per_beat();
        let bar_length = timing.bar_seconds();
        let mut events = Vec::with_capacity(
            timing.total_beats() as usize
                + timing.bars as usize * chord::chord_size(params.difficulty),
        );

        for beat in 0..timing.total_beats() {
            let t = timing.beat_time(beat);

            let pitch = melody::draw_treble(&mut self.rng);
            events.push(NoteEvent::melody(t, melody::melody_duration(spb), pitch));

            if timing.is_downbeat(beat) {
                let root = chord::draw_root(&mut self.rng);
                for tone in chord::build_chord(root, params.difficulty) {
                    events.push(NoteEvent::chord_tone(t, bar_length, tone));
                }
            }
        }

        tracing::debug!(
            mode = %params.mode,
            tempo = params.tempo,
            difficulty = %params.difficulty,
            events = events.len(),
            "Generated phrase"
        );

        Phrase::new(events, timing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(difficulty: Difficulty) -> PhraseParameters {
        PhraseParameters {
            difficulty,
            ..Default::default()
        }
    }

    #[test]
    fn test_note_event_constructors() {
        let melody = NoteEvent::melody(0.6, 0.54, 64);
        assert_eq!(melody.staff, Staff::Treble);
        assert!(!melody.is_chord);

        let tone = NoteEvent::chord_tone(0.0, 2.4, 48);
        assert_eq!(tone.staff, Staff::Bass);
        assert!(tone.is_chord);
        assert_eq!(tone.end(), 2.4);
    }

    #[test]
    fn test_sounding_interval_is_closed() {
        let event = NoteEvent::melody(0.0, 1.0, 60);
        assert!(event.is_sounding_at(0.0));
        assert!(event.is_sounding_at(1.0));
        assert!(!event.is_sounding_at(1.0001));
    }

    #[test]
    fn test_difficulty_bounds() {
        assert_eq!(Difficulty::new(0), None);
        assert_eq!(Difficulty::new(2), Some(Difficulty::MEDIUM));
        assert_eq!(Difficulty::new(4), None);
        assert!(Difficulty::try_from(9).is_err());
    }

    #[test]
    fn test_event_counts_per_difficulty() {
        let mut generator = PhraseGenerator::new();

        for difficulty in Difficulty::ALL {
            let phrase = generator.generate(&params(difficulty));
            assert_eq!(phrase.treble().count(), 16);

            let chords = phrase.chords();
            assert_eq!(chords.len(), 4);
            for (_, pitches) in &chords {
                assert_eq!(pitches.len(), chord::chord_size(difficulty));
            }
        }
    }

    #[test]
    fn test_treble_events_one_per_beat() {
        let mut generator = PhraseGenerator::with_seed(3);
        let phrase = generator.generate(&PhraseParameters::default());
        let timing = *phrase.timing();

        for (beat, event) in phrase.treble().enumerate() {
            assert_eq!(event.time, timing.beat_time(beat as u32));
            assert!((event.duration - 0.9 * timing.seconds_per_beat()).abs() < 1e-12);
            assert!(melody::TREBLE_RANGE.contains(&event.pitch));
        }
    }

    #[test]
    fn test_bass_chords_on_bar_starts() {
        let mut generator = PhraseGenerator::with_seed(11);
        let phrase = generator.generate(&params(Difficulty::HARD));
        let timing = *phrase.timing();

        for (bar, (time, pitches)) in phrase.chords().iter().enumerate() {
            assert_eq!(*time, timing.beat_time(bar as u32 * 4));
            let root = pitches[0];
            assert!(chord::TRIAD_ROOTS.contains(&root));
            assert_eq!(pitches, &chord::build_chord(root, Difficulty::HARD));
        }

        for event in phrase.bass() {
            assert!(event.is_chord);
            assert!((event.duration - timing.bar_seconds()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_generation_order() {
        let mut generator = PhraseGenerator::with_seed(5);
        let phrase = generator.generate(&PhraseParameters::default());
        let events = phrase.events();

        // Beat 0: melody note, then the bar's chord tones
        assert_eq!(events[0].staff, Staff::Treble);
        assert!(events[1..4].iter().all(|e| e.staff == Staff::Bass));
        assert_eq!(events[4].staff, Staff::Treble);
    }

    #[test]
    fn test_seeded_generators_agree() {
        let params = PhraseParameters::default();
        let a = PhraseGenerator::with_seed(99).generate(&params);
        let b = PhraseGenerator::with_seed(99).generate(&params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_mode_does_not_change_output() {
        let mut params = PhraseParameters::default();
        let c_major = PhraseGenerator::with_seed(1).generate(&params);
        params.mode = Mode::AMinor;
        let a_minor = PhraseGenerator::with_seed(1).generate(&params);
        assert_eq!(c_major.events(), a_minor.events());
    }

    #[test]
    fn test_events_by_time_is_stable() {
        let mut generator = PhraseGenerator::with_seed(8);
        let phrase = generator.generate(&params(Difficulty::MEDIUM));
        let sorted = phrase.events_by_time();

        assert_eq!(sorted.len(), phrase.len());
        assert!(sorted.windows(2).all(|w| w[0].time <= w[1].time));
        // Bar 1 opens with the melody note then its four chord tones
        assert_eq!(&sorted[0..5], &phrase.events()[0..5]);
    }
}
