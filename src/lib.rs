// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Etude: a piano sight-reading practice engine.
//!
//! Generates short random two-hand phrases, writes them out as MusicXML,
//! loops them through an audio backend and reports which keys are
//! sounding so a host can light them up.

pub mod audio;
pub mod config;
pub mod control;
pub mod generators;
pub mod music;
pub mod score;
pub mod sequencer;

pub use config::PracticeConfig;
pub use control::{FrameSink, FrameState, ParamChange, SessionController};
pub use generators::{Phrase, PhraseGenerator, PhraseParameters};
