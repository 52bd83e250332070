//! Reading timeline documents for headless playback.

use crate::error::Result;
use cutline_core::types::Project;
use cutline_core::CoreError;
use std::path::Path;

/// Load a JSON project document from disk.
pub fn load_project(path: impl AsRef<Path>) -> Result<Project> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path)?;
    let project = parse_project(&data)?;
    tracing::info!(
        path = %path.display(),
        name = %project.name,
        tracks = project.timeline.tracks.len(),
        duration = project.timeline.duration(),
        "project loaded"
    );
    Ok(project)
}

/// Parse a JSON project document. Items are sorted per track; a document
/// whose items overlap on a track or have no positive length is rejected.
pub fn parse_project(data: &str) -> Result<Project> {
    let mut project: Project = serde_json::from_str(data)?;

    for track in &mut project.timeline.tracks {
        if let Some(bad) = track
            .items
            .iter()
            .find(|i| !(i.start.is_finite() && i.duration.is_finite() && i.duration > 0.0))
        {
            return Err(CoreError::InvalidOperation(format!(
                "item {} has start {} and duration {}",
                bad.id, bad.start, bad.duration
            ))
            .into());
        }
        track.sort_items();
        if !track.is_consistent() {
            return Err(CoreError::OverlapDetected.into());
        }
    }

    Ok(project)
}
