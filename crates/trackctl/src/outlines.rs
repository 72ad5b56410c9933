//! Track outlines loaded from a directory of SVG files.

use std::path::PathBuf;

use openracing_telemetry_f1::track_name_from_id;
use openracing_track::{OutlineProvider, TrackError, TrackId};
use tracing::debug;

/// Looks up `<dir>/<track_id>.svg`, then `<dir>/<track-name>.svg` where the
/// name is the lowercased F1 track name with non-alphanumerics collapsed to
/// `-` (for example `sakhir-bahrain.svg`).
#[derive(Debug, Clone)]
pub struct DirectoryOutlines {
    root: PathBuf,
}

impl DirectoryOutlines {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Candidate file paths for `track`, in lookup order.
    pub fn candidates(&self, track: TrackId) -> Vec<PathBuf> {
        let mut paths = vec![self.root.join(format!("{track}.svg"))];
        let name = i8::try_from(track).map_or("Unknown", track_name_from_id);
        if name != "Unknown" {
            paths.push(self.root.join(format!("{}.svg", slug(name))));
        }
        paths
    }
}

impl OutlineProvider for DirectoryOutlines {
    fn outline(&self, track: TrackId) -> Result<String, TrackError> {
        for path in self.candidates(track) {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    debug!(track, path = %path.display(), "loaded track outline");
                    return Ok(text);
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(TrackError::OutlineUnavailable(format!(
                        "{}: {err}",
                        path.display()
                    )));
                }
            }
        }
        Err(TrackError::OutlineUnavailable(format!(
            "no outline for track {track} in {}",
            self.root.display()
        )))
    }
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
