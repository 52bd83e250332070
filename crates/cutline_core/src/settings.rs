use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Editor-wide knobs stored with the project document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorSettings {
    /// Playback clock period in milliseconds.
    pub tick_interval_ms: u64,
    pub snapping: bool,
    /// Seconds within which a dragged edge snaps to a neighbour edge.
    pub snap_threshold: f64,
    /// Restart playback after the clock wraps at the timeline end.
    pub loop_playback: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            snapping: true,
            snap_threshold: 0.1,
            loop_playback: false,
        }
    }
}

impl EditorSettings {
    /// Finer clock, no snapping. Useful when stepping frame by frame.
    pub fn precise() -> Self {
        Self {
            tick_interval_ms: 40,
            snapping: false,
            ..Self::default()
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Snap threshold when snapping is enabled.
    pub fn snap(&self) -> Option<f64> {
        (self.snapping && self.snap_threshold > 0.0).then_some(self.snap_threshold)
    }
}
