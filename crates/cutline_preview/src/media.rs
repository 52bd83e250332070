//! Keeps an external media player in step with the playhead.

use crate::error::Result;
use cutline_core::playback::MediaDirective;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Seconds a player may drift from the playhead before it is re-seeked.
pub const DEFAULT_DRIFT_TOLERANCE: f64 = 0.25;

/// Media playback collaborator, addressed by timeline item.
pub trait MediaPlayer {
    fn seek(&mut self, item_id: Uuid, seconds: f64) -> Result<()>;
    fn play(&mut self, item_id: Uuid) -> Result<()>;
    fn pause(&mut self, item_id: Uuid) -> Result<()>;

    /// Current source position of `item_id`, if the player can report one.
    fn position(&self, _item_id: Uuid) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct Tracked {
    source_time: f64,
    playing: bool,
}

/// Applies [`MediaDirective`]s to a [`MediaPlayer`], issuing only the
/// commands needed to change its state.
#[derive(Debug)]
pub struct MediaSync {
    tolerance: f64,
    active: HashMap<Uuid, Tracked>,
}

impl Default for MediaSync {
    fn default() -> Self {
        Self::new(DEFAULT_DRIFT_TOLERANCE)
    }
}

impl MediaSync {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
            active: HashMap::new(),
        }
    }

    pub fn is_playing(&self, item_id: Uuid) -> bool {
        self.active.get(&item_id).is_some_and(|t| t.playing)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Bring `player` in line with `directives`. `elapsed` is the playhead
    /// advance since the previous call, used to predict where a playing
    /// source should be when the player cannot report its position.
    ///
    /// Tracked state is updated after every command that succeeds, so a
    /// failed call leaves it matching what the player was actually told.
    pub fn apply<P: MediaPlayer + ?Sized>(
        &mut self,
        player: &mut P,
        directives: &[MediaDirective],
        elapsed: f64,
    ) -> Result<()> {
        let mut seen = HashSet::with_capacity(directives.len());

        for directive in directives {
            let id = directive.item_id;
            seen.insert(id);

            let prev = match self.active.get(&id).copied() {
                Some(prev) => prev,
                None => {
                    tracing::debug!(item = %id, source_time = directive.source_time, "media activated");
                    player.seek(id, directive.source_time)?;
                    let tracked = Tracked {
                        source_time: directive.source_time,
                        playing: false,
                    };
                    self.active.insert(id, tracked);
                    if directive.playing {
                        player.play(id)?;
                        self.track(id).playing = true;
                    }
                    continue;
                }
            };

            let advance = if prev.playing { elapsed.max(0.0) } else { 0.0 };
            let expected = player
                .position(id)
                .unwrap_or(prev.source_time + advance);
            let drift = (expected - directive.source_time).abs();
            if drift > self.tolerance {
                tracing::trace!(item = %id, drift, "media drift, seeking");
                player.seek(id, directive.source_time)?;
            }
            self.track(id).source_time = directive.source_time;

            if directive.playing != prev.playing {
                if directive.playing {
                    player.play(id)?;
                } else {
                    player.pause(id)?;
                }
                self.track(id).playing = directive.playing;
            }
        }

        let leaving: Vec<Uuid> = self
            .active
            .keys()
            .filter(|id| !seen.contains(*id))
            .copied()
            .collect();
        for id in leaving {
            if self.is_playing(id) {
                tracing::debug!(item = %id, "media left active set");
                player.pause(id)?;
            }
            self.active.remove(&id);
        }

        Ok(())
    }

    fn track(&mut self, item_id: Uuid) -> &mut Tracked {
        self.active.entry(item_id).or_insert(Tracked {
            source_time: 0.0,
            playing: false,
        })
    }

    /// Pause everything still playing and forget all tracked items.
    pub fn pause_all<P: MediaPlayer + ?Sized>(&mut self, player: &mut P) -> Result<()> {
        for (id, tracked) in self.active.drain() {
            if tracked.playing {
                player.pause(id)?;
            }
        }
        Ok(())
    }
}

/// A player that only logs the commands it receives.
#[derive(Debug, Default)]
pub struct TracingPlayer;

impl MediaPlayer for TracingPlayer {
    fn seek(&mut self, item_id: Uuid, seconds: f64) -> Result<()> {
        tracing::info!(item = %item_id, seconds, "media seek");
        Ok(())
    }

    fn play(&mut self, item_id: Uuid) -> Result<()> {
        tracing::info!(item = %item_id, "media play");
        Ok(())
    }

    fn pause(&mut self, item_id: Uuid) -> Result<()> {
        tracing::info!(item = %item_id, "media pause");
        Ok(())
    }
}
