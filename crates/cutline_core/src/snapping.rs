use crate::types::*;

/// Find the nearest snap point within the threshold.
/// Returns the snapped position if within threshold, otherwise the original position.
pub fn find_snap_point(position: f64, snap_points: &[f64], threshold: f64) -> f64 {
    nearest_snap_point(position, snap_points, threshold).unwrap_or(position)
}

/// The nearest snap point within the threshold, if any. An exact hit counts.
pub fn nearest_snap_point(position: f64, snap_points: &[f64], threshold: f64) -> Option<f64> {
    snap_points
        .iter()
        .copied()
        .filter(|p| p.is_finite())
        .min_by(|a, b| (position - a).abs().total_cmp(&(position - b).abs()))
        .filter(|point| (position - point).abs() <= threshold)
}

/// Collect all snap points from a timeline: zero and every clip edge.
pub fn collect_snap_points(timeline: &Timeline, exclude_item_id: Option<uuid::Uuid>) -> Vec<f64> {
    // Zero is always a snap point
    let mut points = vec![0.0];

    for track in &timeline.tracks {
        for item in &track.items {
            if Some(item.id) == exclude_item_id {
                continue;
            }
            points.push(item.start);
            points.push(item.end());
        }
    }

    points.retain(|p| p.is_finite());
    points.sort_by(f64::total_cmp);
    points.dedup();
    points
}
