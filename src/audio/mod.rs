// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio backend boundary.
//!
//! This module provides:
//! - The trait the scheduler and controller drive note-ons through
//! - A readiness signal for backends that load samples asynchronously
//! - A console backend that logs notes instead of sounding them

pub mod console;

pub use console::ConsoleBackend;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

use crate::music::Pitch;

/// Sample-playback engine consuming note-on requests
pub trait AudioBackend: Send {
    /// True once the sample set has finished loading
    fn is_ready(&self) -> bool;

    /// Sound `pitch` now for `duration`
    fn trigger_note(&mut self, pitch: Pitch, duration: Duration);
}

/// Backend shared between the controller and the playback task
pub type SharedBackend = Arc<Mutex<dyn AudioBackend>>;

/// Wrap a backend for sharing
pub fn shared<B: AudioBackend + 'static>(backend: B) -> SharedBackend {
    Arc::new(Mutex::new(backend))
}

/// Readiness of a shared backend; a poisoned lock counts as not ready
pub fn is_ready(backend: &SharedBackend) -> bool {
    backend.lock().map(|b| b.is_ready()).unwrap_or(false)
}

/// Trigger a note on a shared backend if it is ready
pub fn trigger(backend: &SharedBackend, pitch: Pitch, duration: Duration) -> Result<(), AudioError> {
    let mut backend = backend.lock().map_err(|_| AudioError::LockFailed)?;
    if !backend.is_ready() {
        return Err(AudioError::NotReady);
    }
    backend.trigger_note(pitch, duration);
    Ok(())
}

/// Audio error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Audio backend is not ready")]
    NotReady,

    #[error("Sample loading failed: {0}")]
    LoadFailed(String),

    #[error("Failed to acquire audio lock")]
    LockFailed,
}

/// Sending half of a readiness signal, held by the loader
#[derive(Debug)]
pub struct ReadySignal {
    tx: watch::Sender<bool>,
}

impl ReadySignal {
    /// Mark the sample set as loaded
    pub fn mark_ready(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving half of a readiness signal
#[derive(Debug, Clone)]
pub struct AudioReadiness {
    rx: watch::Receiver<bool>,
}

impl AudioReadiness {
    /// Current readiness
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the backend reports ready
    pub async fn wait(&mut self) -> Result<(), AudioError> {
        self.rx
            .wait_for(|ready| *ready)
            .await
            .map(|_| ())
            .map_err(|_| AudioError::LoadFailed("loader dropped before ready".to_string()))
    }
}

/// Create a linked readiness signal, initially not ready
pub fn readiness_channel() -> (ReadySignal, AudioReadiness) {
    let (tx, rx) = watch::channel(false);
    (ReadySignal { tx }, AudioReadiness { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingBackend {
        ready: bool,
        notes: Vec<Pitch>,
    }

    impl AudioBackend for CountingBackend {
        fn is_ready(&self) -> bool {
            self.ready
        }

        fn trigger_note(&mut self, pitch: Pitch, _duration: Duration) {
            self.notes.push(pitch);
        }
    }

    #[test]
    fn test_trigger_requires_ready() {
        let backend = shared(CountingBackend {
            ready: false,
            notes: Vec::new(),
        });
        assert!(!is_ready(&backend));
        assert_eq!(
            trigger(&backend, 60, Duration::from_millis(100)),
            Err(AudioError::NotReady)
        );
    }

    #[test]
    fn test_trigger_when_ready() {
        let backend = Arc::new(Mutex::new(CountingBackend {
            ready: true,
            notes: Vec::new(),
        }));
        let dyn_backend: SharedBackend = backend.clone();

        trigger(&dyn_backend, 64, Duration::from_millis(100)).unwrap();
        assert_eq!(backend.lock().unwrap().notes, vec![64]);
    }

    #[tokio::test]
    async fn test_readiness_wait() {
        let (signal, mut readiness) = readiness_channel();
        assert!(!readiness.is_ready());

        signal.mark_ready();
        readiness.wait().await.unwrap();
        assert!(readiness.is_ready());
    }

    #[tokio::test]
    async fn test_readiness_wait_fails_when_loader_dropped() {
        let (signal, mut readiness) = readiness_channel();
        drop(signal);
        assert!(matches!(readiness.wait().await, Err(AudioError::LoadFailed(_))));
    }
}
