// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MusicXML serialisation of a score document.

use super::{Measure, NoteValue, ScoreDocument, ScoreEntry, BEATS_PER_MEASURE, DIVISIONS};
use crate::generators::Staff;

/// Voice numbers per staff
const TREBLE_VOICE: u8 = 1;
const BASS_VOICE: u8 = 2;

/// Convert a score document to MusicXML (partwise, one two-staff part)
pub fn to_musicxml(doc: &ScoreDocument) -> String {
    let mut xml = String::new();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">"#);
    xml.push('\n');
    xml.push_str(r#"<score-partwise version="4.0">"#);
    xml.push('\n');

    xml.push_str("  <part-list>\n");
    xml.push_str("    <score-part id=\"P1\">\n");
    xml.push_str("      <part-name>Piano</part-name>\n");
    xml.push_str("    </score-part>\n");
    xml.push_str("  </part-list>\n");

    xml.push_str("  <part id=\"P1\">\n");
    for measure in &doc.measures {
        xml.push_str(&measure_to_xml(doc, measure));
    }
    xml.push_str("  </part>\n");
    xml.push_str("</score-partwise>\n");

    xml
}

fn measure_to_xml(doc: &ScoreDocument, measure: &Measure) -> String {
    let mut xml = String::new();

    xml.push_str(&format!("    <measure number=\"{}\">\n", measure.number));

    if measure.number == 1 {
        xml.push_str(&attributes_to_xml(doc));
        xml.push_str(&tempo_to_xml(doc.tempo));
    }

    for entry in &measure.treble {
        xml.push_str(&entry_to_xml(entry, TREBLE_VOICE, Staff::Treble));
    }

    // Rewind to the bar line for the bass voice
    xml.push_str("      <backup>\n");
    xml.push_str(&format!(
        "        <duration>{}</duration>\n",
        measure.treble_divisions()
    ));
    xml.push_str("      </backup>\n");

    for entry in &measure.bass {
        xml.push_str(&entry_to_xml(entry, BASS_VOICE, Staff::Bass));
    }

    // The broken chord is shorter than the bar; carry the bass voice to the bar line
    let bar = DIVISIONS * BEATS_PER_MEASURE as u32;
    let remaining = bar.saturating_sub(measure.bass_divisions());
    if remaining > 0 {
        xml.push_str("      <forward>\n");
        xml.push_str(&format!("        <duration>{}</duration>\n", remaining));
        xml.push_str(&format!("        <voice>{}</voice>\n", BASS_VOICE));
        xml.push_str(&format!("        <staff>{}</staff>\n", Staff::Bass.number()));
        xml.push_str("      </forward>\n");
    }

    xml.push_str("    </measure>\n");
    xml
}

fn attributes_to_xml(doc: &ScoreDocument) -> String {
    let mut xml = String::new();

    xml.push_str("      <attributes>\n");
    xml.push_str(&format!("        <divisions>{}</divisions>\n", DIVISIONS));
    xml.push_str("        <key>\n");
    xml.push_str("          <fifths>0</fifths>\n");
    xml.push_str("        </key>\n");
    xml.push_str("        <time>\n");
    xml.push_str(&format!("          <beats>{}</beats>\n", doc.meter.beats_per_bar));
    xml.push_str(&format!(
        "          <beat-type>{}</beat-type>\n",
        doc.meter.beat_unit
    ));
    xml.push_str("        </time>\n");
    xml.push_str("        <staves>2</staves>\n");
    xml.push_str("        <clef number=\"1\">\n");
    xml.push_str("          <sign>G</sign>\n");
    xml.push_str("          <line>2</line>\n");
    xml.push_str("        </clef>\n");
    xml.push_str("        <clef number=\"2\">\n");
    xml.push_str("          <sign>F</sign>\n");
    xml.push_str("          <line>4</line>\n");
    xml.push_str("        </clef>\n");
    xml.push_str("      </attributes>\n");

    xml
}

fn tempo_to_xml(tempo: u32) -> String {
    let mut xml = String::new();

    xml.push_str("      <direction placement=\"above\">\n");
    xml.push_str("        <direction-type>\n");
    xml.push_str("          <metronome>\n");
    xml.push_str("            <beat-unit>quarter</beat-unit>\n");
    xml.push_str(&format!("            <per-minute>{}</per-minute>\n", tempo));
    xml.push_str("          </metronome>\n");
    xml.push_str("        </direction-type>\n");
    xml.push_str(&format!("        <sound tempo=\"{}\"/>\n", tempo));
    xml.push_str("      </direction>\n");

    xml
}

fn entry_to_xml(entry: &ScoreEntry, voice: u8, staff: Staff) -> String {
    let mut xml = String::new();

    xml.push_str("      <note>\n");

    match entry.pitch {
        Some(pitch) => {
            xml.push_str("        <pitch>\n");
            xml.push_str(&format!("          <step>{}</step>\n", pitch.step));
            if pitch.alter != 0 {
                xml.push_str(&format!("          <alter>{}</alter>\n", pitch.alter));
            }
            xml.push_str(&format!("          <octave>{}</octave>\n", pitch.octave));
            xml.push_str("        </pitch>\n");
        }
        None => xml.push_str("        <rest/>\n"),
    }

    xml.push_str(&format!(
        "        <duration>{}</duration>\n",
        entry.value.divisions()
    ));
    xml.push_str(&format!("        <voice>{}</voice>\n", voice));
    xml.push_str(&format!("        <type>{}</type>\n", entry.value.type_name()));

    if entry.pitch.is_some_and(|p| p.alter > 0) {
        xml.push_str("        <accidental>sharp</accidental>\n");
    }

    xml.push_str(&format!("        <staff>{}</staff>\n", staff.number()));

    if let Some(beam) = entry.beam {
        if entry.value == NoteValue::Eighth {
            xml.push_str(&format!("        <beam number=\"1\">{}</beam>\n", beam.as_str()));
        }
    }

    xml.push_str("      </note>\n");
    xml
}
