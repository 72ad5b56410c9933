//! Shared per-track geometry cache.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::geometry::TrackGeometry;

/// Track identifier as reported by the game. Negative ids are unknown tracks.
pub type TrackId = i32;

/// Built geometry keyed by track id.
///
/// Entries are immutable once inserted and live until [`GeometryCache::clear`].
/// Builds run under the lock, so a track is never built twice concurrently.
#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: Mutex<HashMap<TrackId, Arc<TrackGeometry>>>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, track: TrackId) -> Option<Arc<TrackGeometry>> {
        self.entries.lock().get(&track).cloned()
    }

    /// Cached geometry for `track`, building it with `build` on a miss.
    ///
    /// # Errors
    ///
    /// Returns the builder's error; nothing is cached in that case.
    pub fn get_or_build<F>(&self, track: TrackId, build: F) -> Result<Arc<TrackGeometry>>
    where
        F: FnOnce() -> Result<TrackGeometry>,
    {
        let mut entries = self.entries.lock();
        if let Some(geometry) = entries.get(&track) {
            return Ok(Arc::clone(geometry));
        }
        let geometry = Arc::new(build()?);
        debug!(
            track,
            points = geometry.len(),
            length = geometry.total_length(),
            "track geometry cached"
        );
        entries.insert(track, Arc::clone(&geometry));
        Ok(geometry)
    }

    /// Insert or replace an entry, returning the previous one.
    pub fn insert(&self, track: TrackId, geometry: TrackGeometry) -> Option<Arc<TrackGeometry>> {
        self.entries.lock().insert(track, Arc::new(geometry))
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
