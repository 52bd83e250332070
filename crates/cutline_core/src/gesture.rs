//! Pointer gesture state for drag, edge resize and rotation.
//!
//! The input layer owns one [`Gesture`] value and threads it through its
//! event handlers. Pointer deltas arrive already converted to timeline
//! seconds; rotation works in screen coordinates from explicitly passed
//! on-screen bounds.

use crate::error::{CoreError, Result};
use crate::snapping::{collect_snap_points, find_snap_point, nearest_snap_point};
use crate::types::{Timeline, TimelineItem};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// On-screen rectangle of an item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        item_id: Uuid,
        origin_start: f64,
    },
    Resizing {
        item_id: Uuid,
        edge: ResizeEdge,
        origin_start: f64,
        origin_duration: f64,
    },
    Rotating {
        item_id: Uuid,
        center: Point,
        origin_angle: f64,
        origin_rotation: f64,
    },
}

impl Gesture {
    pub fn begin_drag(timeline: &Timeline, item_id: Uuid) -> Result<Self> {
        let item = lookup(timeline, item_id)?;
        Ok(Gesture::Dragging {
            item_id,
            origin_start: item.start,
        })
    }

    pub fn begin_resize(timeline: &Timeline, item_id: Uuid, edge: ResizeEdge) -> Result<Self> {
        let item = lookup(timeline, item_id)?;
        Ok(Gesture::Resizing {
            item_id,
            edge,
            origin_start: item.start,
            origin_duration: item.duration,
        })
    }

    /// Start rotating around the centre of `bounds`, with the pointer at
    /// `pointer`.
    pub fn begin_rotate(
        timeline: &Timeline,
        item_id: Uuid,
        bounds: Bounds,
        pointer: Point,
    ) -> Result<Self> {
        let item = lookup(timeline, item_id)?;
        let center = bounds.center();
        Ok(Gesture::Rotating {
            item_id,
            center,
            origin_angle: angle_degrees(center, pointer),
            origin_rotation: item.rotation,
        })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// Apply a pointer delta (seconds since the gesture began) to a drag or
    /// resize. `snap` is the snap threshold, if snapping is on. Returns the
    /// edited item, or `None` for gestures that do not use time deltas.
    pub fn pointer_moved(
        &self,
        timeline: &mut Timeline,
        delta_seconds: f64,
        snap: Option<f64>,
    ) -> Result<Option<TimelineItem>> {
        match *self {
            Gesture::Idle | Gesture::Rotating { .. } => Ok(None),
            Gesture::Dragging {
                item_id,
                origin_start,
            } => {
                let duration = lookup(timeline, item_id)?.duration;
                let mut proposed = origin_start + delta_seconds;
                if let Some(threshold) = snap {
                    let points = collect_snap_points(timeline, Some(item_id));
                    let start_snap = nearest_snap_point(proposed, &points, threshold);
                    let end_snap = nearest_snap_point(proposed + duration, &points, threshold)
                        .map(|end| end - duration);
                    // The closer edge wins; the start edge wins ties.
                    proposed = match (start_snap, end_snap) {
                        (Some(start), Some(from_end))
                            if (from_end - proposed).abs() < (start - proposed).abs() =>
                        {
                            from_end
                        }
                        (Some(start), _) => start,
                        (None, Some(from_end)) => from_end,
                        (None, None) => proposed,
                    };
                }
                timeline.move_item(item_id, proposed).map(Some)
            }
            Gesture::Resizing {
                item_id,
                edge: ResizeEdge::Start,
                origin_start,
                ..
            } => {
                let proposed = snapped(timeline, item_id, origin_start + delta_seconds, snap);
                timeline.trim_start(item_id, proposed).map(Some)
            }
            Gesture::Resizing {
                item_id,
                edge: ResizeEdge::End,
                origin_start,
                origin_duration,
            } => {
                let start = lookup(timeline, item_id)?.start;
                let end = origin_start + origin_duration + delta_seconds;
                let end = snapped(timeline, item_id, end, snap);
                timeline.trim_end(item_id, end - start).map(Some)
            }
        }
    }

    /// Rotate to follow the pointer. Returns the edited item while rotating.
    pub fn rotate_to(&self, timeline: &mut Timeline, pointer: Point) -> Result<Option<TimelineItem>> {
        let Gesture::Rotating {
            item_id,
            center,
            origin_angle,
            origin_rotation,
        } = *self
        else {
            return Ok(None);
        };

        let angle = angle_degrees(center, pointer);
        if !angle.is_finite() {
            return Ok(None);
        }
        let (track_idx, item_idx) = timeline
            .find_item_location(item_id)
            .ok_or(CoreError::ItemNotFound(item_id))?;
        let item = &mut timeline.tracks[track_idx].items[item_idx];
        item.rotation = (origin_rotation + angle - origin_angle).rem_euclid(360.0);
        tracing::trace!(item = %item_id, rotation = item.rotation, "rotate item");
        Ok(Some(item.clone()))
    }

    /// End the gesture.
    pub fn finish(self) -> Gesture {
        if !self.is_idle() {
            tracing::debug!(gesture = ?self, "gesture finished");
        }
        Gesture::Idle
    }
}

fn lookup(timeline: &Timeline, item_id: Uuid) -> Result<&TimelineItem> {
    timeline
        .find_item(item_id)
        .ok_or(CoreError::ItemNotFound(item_id))
}

fn snapped(timeline: &Timeline, item_id: Uuid, position: f64, snap: Option<f64>) -> f64 {
    match snap {
        Some(threshold) => {
            let points = collect_snap_points(timeline, Some(item_id));
            find_snap_point(position, &points, threshold)
        }
        None => position,
    }
}

/// Screen-space angle of `pointer` around `center`, clockwise from +x.
fn angle_degrees(center: Point, pointer: Point) -> f64 {
    (pointer.y - center.y).atan2(pointer.x - center.x).to_degrees()
}
