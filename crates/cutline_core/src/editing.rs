use crate::error::{CoreError, Result};
use crate::types::*;
use uuid::Uuid;

/// Shortest duration a trim may leave behind, in seconds.
pub const MIN_CLIP_DURATION: f64 = 0.5;

/// Per-track edits. Each keeps the items sorted and disjoint by clamping the
/// proposed value; none of them fail. Unknown ids return `None`.
impl Track {
    /// Move an item, clamped between its neighbours.
    pub fn move_item(&mut self, item_id: Uuid, proposed_start: f64) -> Option<&TimelineItem> {
        let index = self.locate_sorted(item_id)?;
        if !proposed_start.is_finite() {
            tracing::trace!(item = %item_id, "ignoring non-finite move");
            return self.items.get(index);
        }

        let (min_start, next_start) = self.neighbour_bounds(index);
        let item = &mut self.items[index];
        let max_start = next_start.map_or(f64::INFINITY, |next| next - item.duration);
        let new_start = clamp_to(proposed_start, min_start, max_start);

        tracing::debug!(
            item = %item_id,
            from = item.start,
            proposed = proposed_start,
            to = new_start,
            "move item"
        );
        item.start = new_start;
        self.items.get(index)
    }

    /// Move the in-point, keeping the end fixed. The result is never shorter
    /// than [`MIN_CLIP_DURATION`], never reaches into the previous item, and
    /// never reaches before the start of its source media.
    pub fn trim_start(&mut self, item_id: Uuid, proposed_start: f64) -> Option<&TimelineItem> {
        let index = self.locate_sorted(item_id)?;
        if !proposed_start.is_finite() {
            tracing::trace!(item = %item_id, "ignoring non-finite trim");
            return self.items.get(index);
        }

        let (neighbour_end, _) = self.neighbour_bounds(index);
        let item = &mut self.items[index];
        // Media cannot be extended before the start of its source.
        let min_start = if item.has_media() {
            neighbour_end.max(item.start - item.offset)
        } else {
            neighbour_end
        };
        // Bounds cross for clips already below the minimum; the neighbour wins.
        let max_start = (item.start + item.duration - MIN_CLIP_DURATION).max(min_start);
        let new_start = clamp_to(proposed_start, min_start, max_start);
        let shift = new_start - item.start;

        tracing::debug!(
            item = %item_id,
            from = item.start,
            proposed = proposed_start,
            to = new_start,
            "trim start"
        );
        item.duration -= shift;
        item.start = new_start;
        // Keep the media anchored to the same timeline position.
        item.offset = (item.offset + shift).max(0.0);
        self.items.get(index)
    }

    /// Change the duration, bounded by [`MIN_CLIP_DURATION`] and the next item.
    pub fn trim_end(&mut self, item_id: Uuid, proposed_duration: f64) -> Option<&TimelineItem> {
        let index = self.locate_sorted(item_id)?;
        if !proposed_duration.is_finite() {
            tracing::trace!(item = %item_id, "ignoring non-finite trim");
            return self.items.get(index);
        }

        let (_, next_start) = self.neighbour_bounds(index);
        let item = &mut self.items[index];
        let max_duration = next_start.map_or(f64::INFINITY, |next| next - item.start);
        let new_duration = clamp_to(proposed_duration, MIN_CLIP_DURATION, max_duration);

        tracing::debug!(
            item = %item_id,
            from = item.duration,
            proposed = proposed_duration,
            to = new_duration,
            "trim end"
        );
        item.duration = new_duration;
        self.items.get(index)
    }

    /// Split an item at `t`, which must lie strictly inside it. The original
    /// id keeps the left half and its transition; the right half gets a fresh
    /// id and copies every other field. Returns the new id.
    pub fn split_at(&mut self, item_id: Uuid, t: f64) -> Option<Uuid> {
        let index = self.locate_sorted(item_id)?;
        let item = &self.items[index];
        if !(t.is_finite() && item.start < t && t < item.end()) {
            tracing::trace!(item = %item_id, at = t, "split outside item, ignored");
            return None;
        }

        let elapsed = t - item.start;
        let mut right = item.clone();
        right.id = Uuid::new_v4();
        right.start = t;
        right.duration = item.duration - elapsed;
        right.offset = item.offset + elapsed;
        // The inbound transition belongs to the left half only.
        right.transition = None;
        let right_id = right.id;

        self.items[index].duration = elapsed;
        self.items.insert(index + 1, right);

        tracing::debug!(item = %item_id, right = %right_id, at = t, "split item");
        Some(right_id)
    }

    /// Copy an item to just after itself. When the copy does not fit there,
    /// it goes into the first later gap that holds it. Returns the new id.
    pub fn duplicate_item(&mut self, item_id: Uuid) -> Option<Uuid> {
        let index = self.locate_sorted(item_id)?;
        let mut copy = self.items[index].clone();
        copy.id = Uuid::new_v4();

        let mut start = copy.end();
        for later in &self.items[index + 1..] {
            if start + copy.duration <= later.start {
                break;
            }
            start = start.max(later.end());
        }
        copy.start = start;
        let copy_id = copy.id;

        tracing::debug!(item = %item_id, copy = %copy_id, start, "duplicate item");
        self.items.push(copy);
        self.sort_items();
        Some(copy_id)
    }

    pub fn remove_item(&mut self, item_id: Uuid) -> Option<TimelineItem> {
        let pos = self.position_of(item_id)?;
        Some(self.items.remove(pos))
    }

    /// Sort the items and return the index of `item_id`.
    fn locate_sorted(&mut self, item_id: Uuid) -> Option<usize> {
        self.sort_items();
        self.position_of(item_id)
    }

    /// End of the previous item (0 when first) and start of the next one.
    fn neighbour_bounds(&self, index: usize) -> (f64, Option<f64>) {
        let min_start = index
            .checked_sub(1)
            .map_or(0.0, |prev| self.items[prev].end());
        let next_start = self.items.get(index + 1).map(|next| next.start);
        (min_start, next_start)
    }
}

/// Timeline-level edits: locate the item across tracks, then delegate to the
/// track. Only lookups fail.
impl Timeline {
    /// Add an item to a track. Returns error if it would overlap existing items.
    pub fn add_item(&mut self, track_id: Uuid, item: TimelineItem) -> Result<()> {
        if !(item.start.is_finite() && item.duration.is_finite() && item.duration > 0.0) {
            return Err(CoreError::InvalidOperation(format!(
                "item {} has an empty or non-finite interval",
                item.id
            )));
        }

        let track = self
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or(CoreError::TrackNotFound(track_id))?;

        if track.items.iter().any(|existing| items_overlap(existing, &item)) {
            return Err(CoreError::OverlapDetected);
        }

        tracing::debug!(item = %item.id, track = %track_id, start = item.start, "add item");
        track.items.push(item);
        track.sort_items();
        Ok(())
    }

    /// Remove an item by its id. Returns the removed item.
    pub fn remove_item(&mut self, item_id: Uuid) -> Result<TimelineItem> {
        self.tracks
            .iter_mut()
            .find_map(|track| track.remove_item(item_id))
            .ok_or(CoreError::ItemNotFound(item_id))
    }

    pub fn move_item(&mut self, item_id: Uuid, proposed_start: f64) -> Result<TimelineItem> {
        self.track_of_mut(item_id)?
            .move_item(item_id, proposed_start)
            .cloned()
            .ok_or(CoreError::ItemNotFound(item_id))
    }

    pub fn trim_start(&mut self, item_id: Uuid, proposed_start: f64) -> Result<TimelineItem> {
        self.track_of_mut(item_id)?
            .trim_start(item_id, proposed_start)
            .cloned()
            .ok_or(CoreError::ItemNotFound(item_id))
    }

    pub fn trim_end(&mut self, item_id: Uuid, proposed_duration: f64) -> Result<TimelineItem> {
        self.track_of_mut(item_id)?
            .trim_end(item_id, proposed_duration)
            .cloned()
            .ok_or(CoreError::ItemNotFound(item_id))
    }

    /// Returns the id of the right half, or `None` when `t` is outside the item.
    pub fn split_at(&mut self, item_id: Uuid, t: f64) -> Result<Option<Uuid>> {
        Ok(self.track_of_mut(item_id)?.split_at(item_id, t))
    }

    pub fn duplicate_item(&mut self, item_id: Uuid) -> Result<Uuid> {
        self.track_of_mut(item_id)?
            .duplicate_item(item_id)
            .ok_or(CoreError::ItemNotFound(item_id))
    }

    fn track_of_mut(&mut self, item_id: Uuid) -> Result<&mut Track> {
        let (track_idx, _) = self
            .find_item_location(item_id)
            .ok_or(CoreError::ItemNotFound(item_id))?;
        Ok(&mut self.tracks[track_idx])
    }
}

/// `v` limited to `[lo, hi]`; when the bounds cross, `hi` wins.
fn clamp_to(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

/// Two items overlap if their ranges [start, end) intersect.
fn items_overlap(a: &TimelineItem, b: &TimelineItem) -> bool {
    a.start < b.end() && b.start < a.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_clip(start: f64, duration: f64) -> TimelineItem {
        TimelineItem::new(
            start,
            duration,
            ItemContent::Video {
                source: "take.mp4".to_string(),
            },
        )
    }

    fn make_track(spans: &[(f64, f64)]) -> (Track, Vec<Uuid>) {
        let mut track = Track::new(TrackKind::Video);
        track.items = spans.iter().map(|&(s, d)| make_clip(s, d)).collect();
        let ids = track.items.iter().map(|i| i.id).collect();
        (track, ids)
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    // -----------------------------------------------------------------------
    // move
    // -----------------------------------------------------------------------

    #[test]
    fn move_into_free_space() {
        let (mut track, ids) = make_track(&[(0.0, 2.0), (10.0, 2.0)]);
        let moved = track.move_item(ids[0], 4.0).unwrap();
        assert_close(moved.start, 4.0);
    }

    #[test]
    fn move_clamps_against_next() {
        let (mut track, ids) = make_track(&[(0.0, 2.0), (5.0, 2.0)]);
        let moved = track.move_item(ids[0], 4.5).unwrap();
        assert_close(moved.start, 3.0);
        assert!(track.is_consistent());
    }

    #[test]
    fn move_clamps_against_previous() {
        let (mut track, ids) = make_track(&[(0.0, 2.0), (5.0, 2.0)]);
        let moved = track.move_item(ids[1], 1.0).unwrap();
        assert_close(moved.start, 2.0);
    }

    #[test]
    fn move_clamps_at_zero_and_is_unbounded_after_last() {
        let (mut track, ids) = make_track(&[(3.0, 2.0)]);
        assert_close(track.move_item(ids[0], -4.0).unwrap().start, 0.0);
        assert_close(track.move_item(ids[0], 120.0).unwrap().start, 120.0);
    }

    #[test]
    fn move_with_nan_is_noop() {
        let (mut track, ids) = make_track(&[(3.0, 2.0)]);
        assert_close(track.move_item(ids[0], f64::NAN).unwrap().start, 3.0);
        assert_close(track.move_item(ids[0], f64::INFINITY).unwrap().start, 3.0);
    }

    #[test]
    fn move_unknown_id_returns_none() {
        let (mut track, _) = make_track(&[(0.0, 1.0)]);
        assert!(track.move_item(Uuid::new_v4(), 2.0).is_none());
    }

    // -----------------------------------------------------------------------
    // trim
    // -----------------------------------------------------------------------

    #[test]
    fn trim_start_keeps_end_fixed() {
        let (mut track, ids) = make_track(&[(2.0, 4.0)]);
        let item = track.trim_start(ids[0], 3.0).unwrap();
        assert_close(item.start, 3.0);
        assert_close(item.duration, 3.0);
        assert_close(item.end(), 6.0);
        assert_close(item.offset, 1.0);
    }

    #[test]
    fn trim_start_respects_minimum_duration() {
        let (mut track, ids) = make_track(&[(2.0, 4.0)]);
        let item = track.trim_start(ids[0], 10.0).unwrap();
        assert_close(item.start, 5.5);
        assert_close(item.duration, MIN_CLIP_DURATION);
    }

    #[test]
    fn trim_start_stops_at_previous_item() {
        let (mut track, ids) = make_track(&[(0.0, 3.0), (4.0, 2.0)]);
        track.items[1].offset = 2.0;
        let item = track.trim_start(ids[1], 1.0).unwrap();
        assert_close(item.start, 3.0);
        assert_close(item.duration, 3.0);
        assert_close(item.offset, 1.0);
        assert!(track.is_consistent());
    }

    #[test]
    fn trim_start_on_short_clip_against_neighbour_is_noop() {
        let (mut track, ids) = make_track(&[(0.0, 5.0), (5.0, 0.2)]);
        let item = track.trim_start(ids[1], 5.1).unwrap();
        assert_close(item.start, 5.0);
        assert_close(item.duration, 0.2);
        assert!(track.is_consistent());
    }

    #[test]
    fn trim_start_extension_stops_at_source_start() {
        let (mut track, ids) = make_track(&[(4.0, 2.0)]);
        track.items[0].offset = 1.5;
        let before = track.items[0].source_time(5.0);

        let item = track.trim_start(ids[0], 1.0).unwrap();
        assert_close(item.start, 2.5);
        assert_close(item.duration, 3.5);
        assert_close(item.offset, 0.0);
        // Content at an unchanged timeline time stays put.
        assert_close(item.source_time(5.0), before);
    }

    #[test]
    fn trim_start_extension_without_offset_keeps_media_anchored() {
        let (mut track, ids) = make_track(&[(4.0, 2.0)]);
        let item = track.trim_start(ids[0], 1.0).unwrap();
        assert_close(item.start, 4.0);
        assert_close(item.source_time(4.0), 0.0);
    }

    #[test]
    fn trim_start_extension_is_free_for_content_without_media() {
        let mut track = Track::new(TrackKind::Overlay);
        let title = TimelineItem::new(
            4.0,
            2.0,
            ItemContent::Text {
                text: "Intro".to_string(),
                font_size: 36,
                color: "#ffffff".to_string(),
            },
        );
        let id = title.id;
        track.items.push(title);

        let item = track.trim_start(id, 1.0).unwrap();
        assert_close(item.start, 1.0);
        assert_close(item.duration, 5.0);
    }

    #[test]
    fn trim_end_clamps_to_gap_before_next() {
        let (mut track, ids) = make_track(&[(0.0, 4.0), (5.0, 3.0)]);
        let item = track.trim_end(ids[0], 10.0).unwrap();
        assert_close(item.duration, 5.0);
        assert!(track.is_consistent());
    }

    #[test]
    fn trim_end_respects_minimum_duration() {
        let (mut track, ids) = make_track(&[(0.0, 4.0)]);
        assert_close(track.trim_end(ids[0], 0.1).unwrap().duration, MIN_CLIP_DURATION);
        assert_close(track.trim_end(ids[0], -3.0).unwrap().duration, MIN_CLIP_DURATION);
    }

    #[test]
    fn trim_end_unbounded_for_last_item() {
        let (mut track, ids) = make_track(&[(0.0, 4.0)]);
        assert_close(track.trim_end(ids[0], 42.0).unwrap().duration, 42.0);
    }

    // -----------------------------------------------------------------------
    // split
    // -----------------------------------------------------------------------

    #[test]
    fn split_produces_two_halves() {
        let (mut track, ids) = make_track(&[(2.0, 6.0)]);
        let right = track.split_at(ids[0], 5.0).unwrap();

        assert_eq!(track.items.len(), 2);
        let left = &track.items[0];
        assert_eq!(left.id, ids[0]);
        assert_close(left.start, 2.0);
        assert_close(left.duration, 3.0);
        assert_close(left.offset, 0.0);

        let second = &track.items[1];
        assert_eq!(second.id, right);
        assert_close(second.start, 5.0);
        assert_close(second.duration, 3.0);
        assert_close(second.offset, 3.0);
        assert!(track.is_consistent());
    }

    #[test]
    fn split_keeps_transition_on_left_half() {
        let mut track = Track::new(TrackKind::Video);
        let push = Transition::new(TransitionKind::Push, 1.0, TransitionTiming::Overlap);
        let item = make_clip(0.0, 4.0).with_transition(push.clone());
        let id = item.id;
        track.items.push(item);

        track.split_at(id, 1.0).unwrap();
        assert_eq!(track.items[0].id, id);
        assert_eq!(track.items[0].transition, Some(push));
        assert_eq!(track.items[1].transition, None);
        assert_eq!(track.items[0].content, track.items[1].content);
    }

    #[test]
    fn split_does_not_change_what_plays_after_the_cut() {
        use crate::resolver::{resolve, ResolveOptions};

        let mut track = Track::new(TrackKind::Video);
        track.items.push(make_clip(0.0, 5.0));
        let clip = make_clip(5.0, 6.0).with_transition(Transition::new(
            TransitionKind::Dissolve,
            1.0,
            TransitionTiming::Postfix,
        ));
        let id = clip.id;
        track.items.push(clip);

        let summary = |tracks: &[Track], t: f64| {
            resolve(tracks, t, &ResolveOptions::default())
                .iter()
                .map(|e| (e.item.start, e.role, e.progress))
                .collect::<Vec<_>>()
        };

        let mut tracks = vec![track];
        let before = summary(&tracks, 8.25);
        let opening = summary(&tracks, 5.5);
        tracks[0].split_at(id, 8.0).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(summary(&tracks, 8.25).len(), 1);
        assert_eq!(summary(&tracks, 8.25)[0].2, None);
        // The original blend into the clip is untouched.
        assert_eq!(summary(&tracks, 5.5), opening);
    }

    #[test]
    fn split_at_edges_is_noop() {
        let (mut track, ids) = make_track(&[(2.0, 6.0)]);
        assert!(track.split_at(ids[0], 2.0).is_none());
        assert!(track.split_at(ids[0], 8.0).is_none());
        assert!(track.split_at(ids[0], f64::NAN).is_none());
        assert_eq!(track.items.len(), 1);
        assert_close(track.items[0].duration, 6.0);
    }

    // -----------------------------------------------------------------------
    // duplicate
    // -----------------------------------------------------------------------

    #[test]
    fn duplicate_lands_right_after_original() {
        let (mut track, ids) = make_track(&[(0.0, 2.0)]);
        let copy = track.duplicate_item(ids[0]).unwrap();
        assert_ne!(copy, ids[0]);
        assert_close(track.items[1].start, 2.0);
        assert_close(track.items[1].duration, 2.0);
    }

    #[test]
    fn duplicate_skips_gaps_that_are_too_small() {
        let (mut track, ids) = make_track(&[(0.0, 2.0), (3.0, 1.0), (6.0, 1.0)]);
        let copy = track.duplicate_item(ids[0]).unwrap();
        let placed = track.items.iter().find(|i| i.id == copy).unwrap();
        assert_close(placed.start, 4.0);
        assert!(track.is_consistent());
    }

    #[test]
    fn duplicate_falls_back_to_track_end() {
        let (mut track, ids) = make_track(&[(0.0, 2.0), (2.5, 1.0), (4.0, 1.0)]);
        let copy = track.duplicate_item(ids[0]).unwrap();
        assert_eq!(track.items.last().unwrap().id, copy);
        assert_close(track.items.last().unwrap().start, 5.0);
        assert!(track.is_consistent());
    }

    // -----------------------------------------------------------------------
    // invariant
    // -----------------------------------------------------------------------

    #[test]
    fn random_edit_sequence_keeps_track_consistent() {
        let (mut track, _) = make_track(&[(0.0, 3.0), (4.0, 2.0), (9.0, 5.0), (15.0, 1.0)]);
        // Small LCG so the sequence is reproducible.
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            (seed >> 33) as f64 / (1u64 << 31) as f64
        };

        for _ in 0..500 {
            let pick = (next() * track.items.len() as f64) as usize % track.items.len();
            let id = track.items[pick].id;
            let value = next() * 25.0 - 2.0;
            match (next() * 5.0) as usize {
                0 => {
                    track.move_item(id, value);
                }
                1 => {
                    track.trim_start(id, value);
                }
                2 => {
                    track.trim_end(id, value / 2.0);
                }
                3 => {
                    track.split_at(id, value);
                }
                _ => {
                    if track.items.len() < 40 {
                        track.duplicate_item(id);
                    }
                }
            }
            assert!(track.is_consistent(), "invariant broken: {:?}", track.items);
        }
    }

    // -----------------------------------------------------------------------
    // timeline wrappers
    // -----------------------------------------------------------------------

    fn make_timeline() -> (Timeline, Uuid, Uuid) {
        let (track, ids) = make_track(&[(0.0, 5.0)]);
        let track_id = track.id;
        (
            Timeline {
                tracks: vec![Track::new(TrackKind::Audio), track],
            },
            track_id,
            ids[0],
        )
    }

    #[test]
    fn add_item_adjacent_succeeds() {
        let (mut tl, track_id, _) = make_timeline();
        assert!(tl.add_item(track_id, make_clip(5.0, 5.0)).is_ok());
        assert_eq!(tl.tracks[1].items.len(), 2);
    }

    #[test]
    fn add_item_keeps_sorted_order() {
        let (mut tl, track_id, first) = make_timeline();
        tl.move_item(first, 4.0).unwrap();
        tl.add_item(track_id, make_clip(0.0, 2.0)).unwrap();
        assert_eq!(tl.tracks[1].items[1].id, first);
    }

    #[test]
    fn add_item_with_overlap_fails() {
        let (mut tl, track_id, _) = make_timeline();
        let result = tl.add_item(track_id, make_clip(2.0, 5.0));
        assert!(matches!(result.unwrap_err(), CoreError::OverlapDetected));
    }

    #[test]
    fn add_item_to_nonexistent_track_fails() {
        let (mut tl, _, _) = make_timeline();
        let result = tl.add_item(Uuid::new_v4(), make_clip(20.0, 1.0));
        assert!(matches!(result.unwrap_err(), CoreError::TrackNotFound(_)));
    }

    #[test]
    fn add_empty_item_fails() {
        let (mut tl, track_id, _) = make_timeline();
        let result = tl.add_item(track_id, make_clip(20.0, 0.0));
        assert!(matches!(result.unwrap_err(), CoreError::InvalidOperation(_)));
    }

    #[test]
    fn remove_item_works() {
        let (mut tl, _, id) = make_timeline();
        assert_eq!(tl.remove_item(id).unwrap().id, id);
        assert!(tl.tracks[1].items.is_empty());
        assert!(matches!(
            tl.remove_item(id).unwrap_err(),
            CoreError::ItemNotFound(_)
        ));
    }

    #[test]
    fn timeline_trim_end_clamps_to_neighbour() {
        let (mut tl, track_id, id) = make_timeline();
        tl.trim_end(id, 4.0).unwrap();
        tl.add_item(track_id, make_clip(5.0, 2.0)).unwrap();
        let trimmed = tl.trim_end(id, 10.0).unwrap();
        assert_close(trimmed.duration, 5.0);
    }

    #[test]
    fn timeline_split_and_duplicate() {
        let (mut tl, _, id) = make_timeline();
        let right = tl.split_at(id, 2.0).unwrap().unwrap();
        assert_close(tl.find_item(right).unwrap().offset, 2.0);
        assert!(tl.split_at(id, 9.0).unwrap().is_none());
        let copy = tl.duplicate_item(right).unwrap();
        assert_close(tl.find_item(copy).unwrap().start, 5.0);
    }

    #[test]
    fn timeline_ops_on_unknown_item_fail() {
        let (mut tl, _, _) = make_timeline();
        let bad = Uuid::new_v4();
        assert!(matches!(tl.move_item(bad, 1.0).unwrap_err(), CoreError::ItemNotFound(_)));
        assert!(matches!(tl.trim_start(bad, 1.0).unwrap_err(), CoreError::ItemNotFound(_)));
        assert!(matches!(tl.split_at(bad, 1.0).unwrap_err(), CoreError::ItemNotFound(_)));
        assert!(matches!(tl.duplicate_item(bad).unwrap_err(), CoreError::ItemNotFound(_)));
    }
}
