//! Async playback loop: tick the clock, composite, present, sync media.

use crate::error::Result;
use crate::media::{MediaPlayer, MediaSync};
use crate::surface::RenderSurface;
use cutline_core::compositing::{layers_from_entries, CompositeOptions};
use cutline_core::playback::{media_directives, PlaybackClock};
use cutline_core::resolver::{resolve, TransitionPreview};
use cutline_core::types::{ItemContent, Project, TimelineItem};
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// What one [`PlaybackDriver::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Playhead time the frame was composited at.
    pub time: f64,
    pub layers: usize,
    /// The clock reached the timeline end during this step.
    pub wrapped: bool,
}

/// Owns a project and its playhead. Edits go through [`Self::project_mut`]
/// between steps, so resolution never races an edit.
#[derive(Debug)]
pub struct PlaybackDriver {
    project: Project,
    clock: PlaybackClock,
    sync: MediaSync,
    options: CompositeOptions,
}

impl PlaybackDriver {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            clock: PlaybackClock::new(),
            sync: MediaSync::default(),
            options: CompositeOptions::default(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn play(&mut self) {
        self.clock.play();
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn seek(&mut self, t: f64) {
        let duration = self.project.timeline.duration();
        self.clock.seek(t, duration);
    }

    /// Place a new item at the playhead on `track_id`.
    pub fn add_at_playhead(
        &mut self,
        track_id: Uuid,
        duration: f64,
        content: ItemContent,
    ) -> Result<Uuid> {
        let item = TimelineItem::new(self.clock.time, duration, content);
        let item_id = item.id;
        self.project.timeline.add_item(track_id, item)?;
        Ok(item_id)
    }

    pub fn set_selected(&mut self, item_id: Option<Uuid>) {
        self.options.selected = item_id;
    }

    pub fn set_preview(&mut self, preview: Option<TransitionPreview>) {
        self.options.resolve.preview = preview;
    }

    /// Advance the clock by `elapsed` seconds and push one frame.
    pub fn step<S, P>(&mut self, elapsed: f64, surface: &mut S, player: &mut P) -> Result<StepOutcome>
    where
        S: RenderSurface + ?Sized,
        P: MediaPlayer + ?Sized,
    {
        let timeline = &self.project.timeline;
        let wrapped = self.clock.tick(elapsed, timeline.duration());
        if wrapped && self.project.settings.loop_playback && timeline.duration() > 0.0 {
            tracing::debug!("looping playback");
            self.clock.play();
        }

        let t = self.clock.time;
        let entries = resolve(&timeline.tracks, t, &self.options.resolve);
        let layers = layers_from_entries(&entries, self.options.selected);
        surface.present(t, &layers)?;

        let directives = media_directives(&entries, t, self.clock.playing);
        self.sync.apply(player, &directives, elapsed)?;

        Ok(StepOutcome {
            time: t,
            layers: layers.len(),
            wrapped,
        })
    }

    /// Play from the current playhead at the configured tick period until
    /// the clock stops or `max_ticks` steps have run. Returns the number of
    /// steps taken.
    pub async fn run<S, P>(
        &mut self,
        surface: &mut S,
        player: &mut P,
        max_ticks: Option<u64>,
    ) -> Result<u64>
    where
        S: RenderSurface + ?Sized,
        P: MediaPlayer + ?Sized,
    {
        let period = self.project.settings.tick_interval();
        let elapsed = period.as_secs_f64();
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        tracing::info!(
            project = %self.project.name,
            period_ms = period.as_millis() as u64,
            from = self.clock.time,
            "playback driver started"
        );
        self.clock.play();

        let mut ticks = 0;
        while max_ticks.map_or(true, |max| ticks < max) {
            interval.tick().await;
            self.step(elapsed, surface, player)?;
            ticks += 1;
            if !self.clock.playing {
                break;
            }
        }

        if self.clock.playing {
            self.clock.pause();
        }
        self.sync.pause_all(player)?;
        tracing::info!(ticks, time = self.clock.time, "playback driver stopped");
        Ok(ticks)
    }
}
