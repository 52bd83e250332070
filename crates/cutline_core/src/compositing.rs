//! Decorates the active set with transition parameters and a stacking order,
//! producing the layer list a rendering surface draws bottom to top.

use crate::resolver::{resolve, ResolveOptions, ResolvedEntry, Role};
use crate::transition::{parameters, TransitionParams};
use crate::types::Timeline;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Z spacing between consecutive tracks.
pub const TRACK_Z_STRIDE: i32 = 10;
/// Stacking value of the selected item; above any track base.
pub const SELECTED_Z: i32 = 100_000;

#[derive(Debug, Clone, Default)]
pub struct CompositeOptions {
    pub resolve: ResolveOptions,
    pub selected: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Layer {
    pub item_id: Uuid,
    pub track_index: usize,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    pub params: TransitionParams,
    pub z_index: i32,
}

/// Resolve `timeline` at `t` and return its layers sorted by `z_index`.
pub fn composite(timeline: &Timeline, t: f64, options: &CompositeOptions) -> Vec<Layer> {
    let entries = resolve(&timeline.tracks, t, &options.resolve);
    layers_from_entries(&entries, options.selected)
}

/// Layers for an already resolved active set, sorted by `z_index`.
pub fn layers_from_entries(entries: &[ResolvedEntry<'_>], selected: Option<Uuid>) -> Vec<Layer> {
    let mut layers: Vec<Layer> = entries
        .iter()
        .map(|entry| decorate(entry, selected))
        .collect();
    // Stable: ties keep resolver order.
    layers.sort_by_key(|l| l.z_index);
    layers
}

fn decorate(entry: &ResolvedEntry<'_>, selected: Option<Uuid>) -> Layer {
    let params = match (&entry.transition, entry.progress) {
        (Some(transition), Some(progress)) => {
            parameters(transition.kind, entry.role, progress, transition.direction)
        }
        _ => TransitionParams::default(),
    };
    let z_index = z_index(entry, &params, selected);

    Layer {
        item_id: entry.item.id,
        track_index: entry.track_index,
        role: entry.role,
        progress: entry.progress,
        params,
        z_index,
    }
}

/// Stacking order of one entry.
///
/// Tracks stack by index; within a track the outgoing layer sits under the
/// main one. Background items pin to the bottom and the selection to the top.
pub fn z_index(entry: &ResolvedEntry<'_>, params: &TransitionParams, selected: Option<Uuid>) -> i32 {
    if selected == Some(entry.item.id) {
        return SELECTED_Z;
    }
    let role_offset = match entry.role {
        Role::Outgoing => 0,
        Role::Main => 1,
    };
    if entry.item.background {
        return role_offset;
    }
    let track_index = i32::try_from(entry.track_index).unwrap_or(i32::MAX / TRACK_Z_STRIDE);
    track_index.saturating_mul(TRACK_Z_STRIDE) + role_offset + params.z_index_hint.unwrap_or(0)
}
