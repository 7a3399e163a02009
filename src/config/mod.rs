// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for practice sessions.
//!
//! This module provides the settings a host starts a session with:
//! initial phrase parameters, the offered tempos, loop and frame timing,
//! and preview behaviour. Settings are plain YAML; every field has a
//! default so an empty document is valid.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::control::params::ParamError;
use crate::generators::{Difficulty, PhraseParameters};
use crate::music::Mode;
use crate::sequencer::Meter;

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PracticeConfig {
    /// Initial mode
    #[serde(default)]
    pub mode: Mode,
    /// Initial tempo in BPM
    #[serde(default = "default_tempo")]
    pub tempo: u32,
    /// Initial difficulty (1-3)
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Tempos offered by the tempo control
    #[serde(default = "default_tempos")]
    pub tempos: Vec<u32>,
    /// Pause after a phrase before looping, in milliseconds
    #[serde(default = "default_loop_guard_ms")]
    pub loop_guard_ms: u64,
    /// Display refresh rate for the highlight loop
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Length of a keyboard preview note, in milliseconds
    #[serde(default = "default_preview_ms")]
    pub preview_ms: u64,
    /// Show live-note highlighting
    #[serde(default = "default_auto_highlight")]
    pub auto_highlight: bool,
    /// Simulated sample-loading time for the console backend
    #[serde(default = "default_sample_load_ms")]
    pub sample_load_ms: u64,
    /// Log level for the host ("error" .. "trace")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_tempo() -> u32 {
    100
}
fn default_tempos() -> Vec<u32> {
    vec![60, 80, 100, 120]
}
fn default_loop_guard_ms() -> u64 {
    50
}
fn default_frame_rate() -> u32 {
    60
}
fn default_preview_ms() -> u64 {
    500
}
fn default_auto_highlight() -> bool {
    true
}
fn default_sample_load_ms() -> u64 {
    250
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            tempo: default_tempo(),
            difficulty: Difficulty::default(),
            tempos: default_tempos(),
            loop_guard_ms: default_loop_guard_ms(),
            frame_rate: default_frame_rate(),
            preview_ms: default_preview_ms(),
            auto_highlight: default_auto_highlight(),
            sample_load_ms: default_sample_load_ms(),
            log_level: default_log_level(),
        }
    }
}

impl PracticeConfig {
    /// Load settings from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate settings from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")?
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.tempos.is_empty() {
            bail!("At least one tempo must be offered");
        }
        if self.tempos.iter().any(|t| !(20..=300).contains(t)) {
            bail!("Tempos must be between 20 and 300 BPM: {:?}", self.tempos);
        }
        if !self.is_tempo_offered(self.tempo) {
            bail!("Initial tempo {} is not in {:?}", self.tempo, self.tempos);
        }
        if self.frame_rate == 0 || self.frame_rate > 240 {
            bail!("Frame rate must be 1-240, got {}", self.frame_rate);
        }
        if self.preview_ms == 0 {
            bail!("Preview length must be positive");
        }
        if !["error", "warn", "info", "debug", "trace"].contains(&self.log_level.as_str()) {
            bail!("Unknown log level: {}", self.log_level);
        }
        Ok(())
    }

    /// Check if the tempo control offers `tempo`
    pub fn is_tempo_offered(&self, tempo: u32) -> bool {
        self.tempos.contains(&tempo)
    }

    /// Phrase parameters a new session starts with
    pub fn initial_params(&self) -> Result<PhraseParameters, ParamError> {
        if !self.is_tempo_offered(self.tempo) {
            return Err(ParamError::InvalidTempo(self.tempo));
        }
        Ok(PhraseParameters {
            mode: self.mode,
            meter: Meter::COMMON,
            tempo: self.tempo,
            difficulty: self.difficulty,
        })
    }

    pub fn loop_guard(&self) -> Duration {
        Duration::from_millis(self.loop_guard_ms)
    }

    /// Interval between display frames
    pub fn frame_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.frame_rate.max(1) as u64)
    }

    pub fn preview_duration(&self) -> Duration {
        Duration::from_millis(self.preview_ms)
    }

    pub fn sample_load_time(&self) -> Duration {
        Duration::from_millis(self.sample_load_ms)
    }
}
