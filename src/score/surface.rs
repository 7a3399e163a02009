// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Score rendering surface boundary.

use super::ScoreError;

/// Something that lays out and draws a score document.
///
/// `load` must finish before `render` is called; both run once per
/// regenerated phrase.
pub trait ScoreSurface: Send {
    /// Accept a serialised score document
    fn load(&mut self, document: &str) -> Result<(), ScoreError>;

    /// Draw the most recently loaded document
    fn render(&mut self);
}

/// Surface that keeps the last document in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    document: Option<String>,
    loads: usize,
    renders: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last loaded document
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Number of successful loads
    pub fn loads(&self) -> usize {
        self.loads
    }

    /// Number of renders
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl ScoreSurface for MemorySurface {
    fn load(&mut self, document: &str) -> Result<(), ScoreError> {
        if document.trim().is_empty() {
            return Err(ScoreError::Surface("empty document".to_string()));
        }
        self.document = Some(document.to_string());
        self.loads += 1;
        Ok(())
    }

    fn render(&mut self) {
        self.renders += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_surface() {
        let mut surface = MemorySurface::new();
        assert!(surface.document().is_none());

        surface.load("<score-partwise/>").unwrap();
        surface.render();
        assert_eq!(surface.document(), Some("<score-partwise/>"));
        assert_eq!(surface.loads(), 1);
        assert_eq!(surface.renders(), 1);

        assert!(surface.load("  ").is_err());
        assert_eq!(surface.loads(), 1);
    }
}
