//! Sources of track outline text.

use std::collections::HashMap;

use crate::cache::TrackId;
use crate::error::{Result, TrackError};

/// Supplies the SVG outline for a track id. Loading assets is left to the
/// host application.
pub trait OutlineProvider: Send + Sync {
    /// # Errors
    ///
    /// [`TrackError::OutlineUnavailable`] when no outline exists for `track`.
    fn outline(&self, track: TrackId) -> Result<String>;
}

/// Outlines held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticOutlines {
    outlines: HashMap<TrackId, String>,
}

impl StaticOutlines {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, track: TrackId, svg: impl Into<String>) -> Self {
        self.insert(track, svg);
        self
    }

    pub fn insert(&mut self, track: TrackId, svg: impl Into<String>) {
        self.outlines.insert(track, svg.into());
    }
}

impl OutlineProvider for StaticOutlines {
    fn outline(&self, track: TrackId) -> Result<String> {
        self.outlines
            .get(&track)
            .cloned()
            .ok_or_else(|| TrackError::OutlineUnavailable(format!("no outline for track {track}")))
    }
}
