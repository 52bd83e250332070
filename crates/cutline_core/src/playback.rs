//! Playhead clock and media synchronisation directives.

use crate::resolver::ResolvedEntry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Playhead position and transport state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackClock {
    /// Current playhead position in seconds.
    pub time: f64,
    pub playing: bool,
}

/// What a media collaborator should be doing with one item's source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaDirective {
    pub item_id: Uuid,
    /// Position within the source media, in seconds.
    pub source_time: f64,
    pub playing: bool,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play(&mut self) {
        self.playing = true;
        tracing::debug!(time = self.time, "playback started");
    }

    pub fn pause(&mut self) {
        self.playing = false;
        tracing::debug!(time = self.time, "playback paused");
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Move the playhead, clamped to `[0, duration]`. Non-finite times are
    /// ignored.
    pub fn seek(&mut self, t: f64, duration: f64) {
        if !t.is_finite() {
            tracing::trace!(t, "ignoring non-finite seek");
            return;
        }
        self.time = t.min(duration.max(0.0)).max(0.0);
        tracing::debug!(time = self.time, "seeked");
    }

    /// Advance by `elapsed` seconds while playing. Reaching `duration` stops
    /// playback and wraps the playhead to 0. Returns true when it wrapped.
    pub fn tick(&mut self, elapsed: f64, duration: f64) -> bool {
        if !self.playing {
            return false;
        }
        if elapsed.is_finite() && elapsed > 0.0 {
            self.time += elapsed;
        }
        if self.time >= duration {
            self.playing = false;
            self.time = 0.0;
            tracing::debug!(duration, "playback reached end");
            return true;
        }
        false
    }
}

/// Directives for every resolved entry whose item carries media.
pub fn media_directives(entries: &[ResolvedEntry<'_>], t: f64, playing: bool) -> Vec<MediaDirective> {
    entries
        .iter()
        .filter(|entry| entry.item.has_media())
        .map(|entry| MediaDirective {
            item_id: entry.item.id,
            source_time: entry.item.source_time(t).max(0.0),
            playing,
        })
        .collect()
}
