// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Phrase to score encoding.
//!
//! Melody notes are quantised to the beat they start in. Each bar's chord
//! is written as a short broken-chord roll in eighths rather than a
//! sustained block, so what the learner reads matches what they hear.

use super::{Beam, Measure, NoteValue, ScoreDocument, ScoreEntry, BEATS_PER_MEASURE, MEASURES};
use crate::generators::{Phrase, Staff};
use crate::music::{to_score_spelling, Pitch};
use crate::sequencer::{Meter, PhraseTiming};

/// Encode a phrase into the fixed four-measure template.
///
/// Missing material is written as rests, never as gaps. Encoding is pure:
/// the same phrase always yields the same document.
pub fn encode(phrase: &Phrase, tempo: u32) -> ScoreDocument {
    let timing = PhraseTiming {
        tempo: tempo.max(1),
        ..*phrase.timing()
    };

    let measures = (0..MEASURES)
        .map(|bar| Measure {
            number: bar + 1,
            treble: (0..BEATS_PER_MEASURE)
                .map(|beat| treble_slot(phrase, &timing, bar, beat))
                .collect(),
            bass: bass_group(phrase, &timing, bar),
        })
        .collect();

    ScoreDocument {
        tempo,
        meter: Meter::COMMON,
        measures,
    }
}

fn beat_index(bar: usize, beat: usize) -> u32 {
    (bar * BEATS_PER_MEASURE + beat) as u32
}

/// Quarter note for the melody event starting in this beat, or a rest
fn treble_slot(phrase: &Phrase, timing: &PhraseTiming, bar: usize, beat: usize) -> ScoreEntry {
    let start = timing.beat_time(beat_index(bar, beat));
    let end = start + timing.seconds_per_beat();

    let mut candidates = phrase
        .events()
        .iter()
        .filter(|e| e.staff == Staff::Treble && e.time >= start && e.time < end);

    let Some(first) = candidates.next() else {
        return ScoreEntry::rest(NoteValue::Quarter);
    };

    let extra = candidates.count();
    if extra > 0 {
        tracing::warn!(
            bar = bar + 1,
            beat = beat + 1,
            extra,
            "Multiple melody notes in one beat; writing the first"
        );
    }

    ScoreEntry::note(to_score_spelling(first.pitch), NoteValue::Quarter)
}

/// Broken-chord eighths for the chord starting exactly on the bar line
fn bass_group(phrase: &Phrase, timing: &PhraseTiming, bar: usize) -> Vec<ScoreEntry> {
    let bar_start = timing.beat_time(beat_index(bar, 0));

    let mut pitches: Vec<Pitch> = phrase
        .events()
        .iter()
        .filter(|e| e.staff == Staff::Bass && e.time == bar_start)
        .map(|e| e.pitch)
        .collect();

    if pitches.is_empty() {
        return vec![ScoreEntry::rest(NoteValue::Eighth); BEATS_PER_MEASURE];
    }

    pitches.sort_unstable();
    let pattern = arpeggio_pattern(&pitches);
    let len = pattern.len();

    pattern
        .into_iter()
        .enumerate()
        .map(|(i, pitch)| {
            ScoreEntry::note(to_score_spelling(pitch), NoteValue::Eighth)
                .with_beam(Beam::for_position(i, len))
        })
        .collect()
}

/// Lowest, second, third (when present), then the lowest again
pub fn arpeggio_pattern(sorted: &[Pitch]) -> Vec<Pitch> {
    let Some(&lowest) = sorted.first() else {
        return Vec::new();
    };
    let mut pattern: Vec<Pitch> = sorted.iter().take(3).copied().collect();
    pattern.push(lowest);
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{Difficulty, NoteEvent, PhraseGenerator, PhraseParameters};
    use crate::music::ScorePitch;

    fn timing() -> PhraseTiming {
        PhraseTiming::new(100, Meter::COMMON)
    }

    #[test]
    fn test_arpeggio_pattern_lengths() {
        assert_eq!(arpeggio_pattern(&[48]), vec![48, 48]);
        assert_eq!(arpeggio_pattern(&[48, 55]), vec![48, 55, 48]);
        assert_eq!(arpeggio_pattern(&[48, 52, 55]), vec![48, 52, 55, 48]);
        assert_eq!(arpeggio_pattern(&[36, 48, 52, 55, 59]), vec![36, 48, 52, 36]);
        assert!(arpeggio_pattern(&[]).is_empty());
    }

    #[test]
    fn test_empty_phrase_is_all_rests() {
        let phrase = Phrase::new(Vec::new(), timing());
        let doc = encode(&phrase, 100);

        assert_eq!(doc.measures.len(), 4);
        for measure in &doc.measures {
            assert_eq!(measure.treble.len(), 4);
            assert!(measure.treble.iter().all(ScoreEntry::is_rest));
            assert_eq!(measure.bass.len(), 4);
            assert!(measure.bass.iter().all(|e| e.is_rest() && e.value == NoteValue::Eighth));
        }
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn test_generated_phrase_encodes_validly() {
        let mut generator = PhraseGenerator::with_seed(21);
        for difficulty in Difficulty::ALL {
            let params = PhraseParameters {
                difficulty,
                ..Default::default()
            };
            let phrase = generator.generate(&params);
            let doc = encode(&phrase, params.tempo);

            assert_eq!(doc.validate(), Ok(()));
            for measure in &doc.measures {
                assert!(measure.treble.iter().all(|e| !e.is_rest()));
                assert_eq!(measure.bass.len(), 4);
            }
        }
    }

    #[test]
    fn test_bass_pattern_is_sorted_lowest_first() {
        let t = timing();
        let bar = t.bar_seconds();
        // Hard chord on G3 in generation order: 55, 59, 62, 43, 66
        let events = [55, 59, 62, 43, 66]
            .into_iter()
            .map(|p| NoteEvent::chord_tone(0.0, bar, p))
            .collect();
        let doc = encode(&Phrase::new(events, t), 100);

        let bass: Vec<ScorePitch> = doc.measures[0].bass.iter().filter_map(|e| e.pitch).collect();
        let expected: Vec<ScorePitch> = [43, 55, 59, 43].into_iter().map(to_score_spelling).collect();
        assert_eq!(bass, expected);

        let beams: Vec<Beam> = doc.measures[0].bass.iter().filter_map(|e| e.beam).collect();
        assert_eq!(beams, vec![Beam::Begin, Beam::Continue, Beam::Continue, Beam::End]);

        // Other bars had no chord
        assert!(doc.measures[1].bass.iter().all(ScoreEntry::is_rest));
    }

    #[test]
    fn test_two_tone_chord_gets_three_entries() {
        let t = timing();
        let events = vec![
            NoteEvent::chord_tone(t.beat_time(4), 2.4, 55),
            NoteEvent::chord_tone(t.beat_time(4), 2.4, 48),
        ];
        let doc = encode(&Phrase::new(events, t), 100);
        let bass = &doc.measures[1].bass;

        assert_eq!(bass.len(), 3);
        assert_eq!(bass[0].beam, Some(Beam::Begin));
        assert_eq!(bass[1].beam, Some(Beam::Continue));
        assert_eq!(bass[2].beam, Some(Beam::End));
    }

    #[test]
    fn test_off_bar_bass_is_ignored() {
        let t = timing();
        let events = vec![NoteEvent::chord_tone(t.beat_time(1), 2.4, 48)];
        let doc = encode(&Phrase::new(events, t), 100);
        assert!(doc.measures[0].bass.iter().all(ScoreEntry::is_rest));
    }

    #[test]
    fn test_melody_slot_window() {
        let t = timing();
        let spb = t.seconds_per_beat();
        let events = vec![
            // Late in beat 2 still belongs to beat 2
            NoteEvent::melody(spb * 1.5, 0.1, 61),
            // Two candidates in beat 4: the first one wins
            NoteEvent::melody(spb * 3.0, 0.1, 64),
            NoteEvent::melody(spb * 3.2, 0.1, 67),
        ];
        let doc = encode(&Phrase::new(events, t), 100);
        let treble = &doc.measures[0].treble;

        assert!(treble[0].is_rest());
        assert_eq!(treble[1].pitch, Some(to_score_spelling(61)));
        assert!(treble[2].is_rest());
        assert_eq!(treble[3].pitch, Some(to_score_spelling(64)));
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let mut generator = PhraseGenerator::new();
        let phrase = generator.generate(&PhraseParameters::default());

        let first = encode(&phrase, 100).to_musicxml().unwrap();
        let second = encode(&phrase, 100).to_musicxml().unwrap();
        assert_eq!(first, second);
    }
}
