//! Active-set resolution: which items are on screen at a playhead time, and
//! which pair of video items is mid-transition.
//!
//! Video tracks are mutually exclusive: each contributes at most an
//! outgoing/main pair. Audio and overlay tracks emit every item covering the
//! playhead with no transition logic.

use crate::types::{TimelineItem, Track, TrackKind, Transition, TransitionTiming};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest progress value handed out; progress lives in `[0, 1)`.
pub const MAX_PROGRESS: f64 = 1.0 - f64::EPSILON;

/// Which side of a cut a resolved entry renders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The departing clip.
    Outgoing,
    /// The incoming clip, or the only clip when nothing blends.
    Main,
}

/// Hover preview from a transition picker. Replaces the stored transition of
/// `target_id` for one resolution; never written back.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPreview {
    pub transition: Transition,
    pub target_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub preview: Option<TransitionPreview>,
}

impl ResolveOptions {
    pub fn with_preview(transition: Transition, target_id: Uuid) -> Self {
        Self {
            preview: Some(TransitionPreview {
                transition,
                target_id,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntry<'a> {
    pub item: &'a TimelineItem,
    pub role: Role,
    pub transition: Option<Transition>,
    pub progress: Option<f64>,
    pub track_index: usize,
}

impl<'a> ResolvedEntry<'a> {
    fn plain(item: &'a TimelineItem, track_index: usize) -> Self {
        Self {
            item,
            role: Role::Main,
            transition: None,
            progress: None,
            track_index,
        }
    }
}

/// A blend found on a video track.
#[derive(Debug)]
struct ActiveBlend<'a> {
    outgoing: Option<&'a TimelineItem>,
    incoming: &'a TimelineItem,
    transition: Transition,
    progress: f64,
}

/// Resolve the active set of `tracks` at time `t`.
///
/// Entries come out in track order; within a video track the outgoing entry
/// precedes the main one. A non-finite `t` yields an empty list.
pub fn resolve<'a>(tracks: &'a [Track], t: f64, options: &ResolveOptions) -> Vec<ResolvedEntry<'a>> {
    let mut entries = Vec::new();
    if !t.is_finite() {
        return entries;
    }

    for (track_index, track) in tracks.iter().enumerate() {
        match track.kind {
            TrackKind::Video => resolve_video_track(track, track_index, t, options, &mut entries),
            TrackKind::Audio | TrackKind::Overlay => entries.extend(
                track
                    .items
                    .iter()
                    .filter(|item| item.contains(t))
                    .map(|item| ResolvedEntry::plain(item, track_index)),
            ),
        }
    }

    entries
}

fn resolve_video_track<'a>(
    track: &'a Track,
    track_index: usize,
    t: f64,
    options: &ResolveOptions,
    entries: &mut Vec<ResolvedEntry<'a>>,
) {
    let mut sorted: Vec<&'a TimelineItem> = track.items.iter().collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let current = sorted.iter().position(|item| item.contains(t));
    let next = match current {
        Some(m) => Some(m + 1).filter(|&n| n < sorted.len()),
        None => sorted.iter().position(|item| item.start > t),
    };

    // The incoming-window test on the current item takes precedence.
    let blend = current
        .and_then(|m| incoming_window(&sorted, m, t, options))
        .or_else(|| next.and_then(|n| outgoing_window(&sorted, n, t, options)));

    match blend {
        Some(blend) => {
            if let Some(outgoing) = blend.outgoing {
                entries.push(ResolvedEntry {
                    item: outgoing,
                    role: Role::Outgoing,
                    transition: Some(blend.transition.clone()),
                    progress: Some(blend.progress),
                    track_index,
                });
            }
            entries.push(ResolvedEntry {
                item: blend.incoming,
                role: Role::Main,
                transition: Some(blend.transition),
                progress: Some(blend.progress),
                track_index,
            });
        }
        None => {
            if let Some(m) = current {
                entries.push(ResolvedEntry::plain(sorted[m], track_index));
            }
        }
    }
}

/// Blend window of the item under the playhead, for the part of the window
/// at or after its start.
fn incoming_window<'a>(
    sorted: &[&'a TimelineItem],
    index: usize,
    t: f64,
    options: &ResolveOptions,
) -> Option<ActiveBlend<'a>> {
    let incoming = sorted[index];
    let transition = effective_transition(incoming, options)?;

    let tau = t - incoming.start;
    let window_start = transition.window_offset();
    if tau < window_start || tau >= window_start + transition.duration {
        return None;
    }

    let progress = clamp_progress((tau - window_start) / transition.duration);
    Some(ActiveBlend {
        outgoing: preceding(sorted, index),
        incoming,
        transition,
        progress,
    })
}

/// Lead-in of the next item's blend window, for prefix and overlap timings.
fn outgoing_window<'a>(
    sorted: &[&'a TimelineItem],
    index: usize,
    t: f64,
    options: &ResolveOptions,
) -> Option<ActiveBlend<'a>> {
    let incoming = sorted[index];
    let transition = effective_transition(incoming, options)?;
    if transition.timing == TransitionTiming::Postfix {
        return None;
    }

    let lead_in = transition.lead_in();
    let delta = incoming.start - t;
    if !(0.0..=lead_in).contains(&delta) {
        return None;
    }

    let progress = clamp_progress((lead_in - delta) / transition.duration);
    Some(ActiveBlend {
        outgoing: preceding(sorted, index),
        incoming,
        transition,
        progress,
    })
}

fn effective_transition(item: &TimelineItem, options: &ResolveOptions) -> Option<Transition> {
    let transition = match &options.preview {
        Some(preview) if preview.target_id == item.id => Some(preview.transition.clone()),
        _ => item.transition.clone(),
    };
    transition.filter(Transition::is_effective)
}

fn preceding<'a>(sorted: &[&'a TimelineItem], index: usize) -> Option<&'a TimelineItem> {
    index.checked_sub(1).map(|p| sorted[p])
}

fn clamp_progress(progress: f64) -> f64 {
    if progress.is_finite() {
        progress.clamp(0.0, MAX_PROGRESS)
    } else {
        0.0
    }
}
