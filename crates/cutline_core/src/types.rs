use crate::settings::EditorSettings;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rounding slack when comparing clip edges computed in floating point.
pub const TIME_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// TransitionKind
// ---------------------------------------------------------------------------

/// Transition family. Names serialize in kebab-case; anything unrecognised
/// becomes `Unknown` and renders as a hard cut.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    #[default]
    None,
    Dissolve,
    FilmDissolve,
    AdditiveDissolve,
    DipToBlack,
    DipToWhite,
    Slide,
    Push,
    Whip,
    Split,
    IrisRound,
    IrisBox,
    Wipe,
    ClockWipe,
    ZoomIn,
    ZoomOut,
    GradientWipe,
    #[serde(other)]
    Unknown,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 17] = [
        TransitionKind::None,
        TransitionKind::Dissolve,
        TransitionKind::FilmDissolve,
        TransitionKind::AdditiveDissolve,
        TransitionKind::DipToBlack,
        TransitionKind::DipToWhite,
        TransitionKind::Slide,
        TransitionKind::Push,
        TransitionKind::Whip,
        TransitionKind::Split,
        TransitionKind::IrisRound,
        TransitionKind::IrisBox,
        TransitionKind::Wipe,
        TransitionKind::ClockWipe,
        TransitionKind::ZoomIn,
        TransitionKind::ZoomOut,
        TransitionKind::GradientWipe,
    ];
}

// ---------------------------------------------------------------------------
// TransitionTiming / Direction
// ---------------------------------------------------------------------------

/// Where the blend window sits relative to the owning item's start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransitionTiming {
    /// Entirely before the item's start.
    Prefix,
    /// Straddles the item's start.
    Overlap,
    /// Entirely after the item's start.
    #[default]
    Postfix,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Unit vector. Positive `dx` means the incoming layer enters from the
    /// right and travels left.
    pub fn vector(self) -> (f64, f64) {
        match self {
            Direction::Left => (1.0, 0.0),
            Direction::Right => (-1.0, 0.0),
            Direction::Up => (0.0, 1.0),
            Direction::Down => (0.0, -1.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Transition
// ---------------------------------------------------------------------------

/// Blend into the item that owns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transition {
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub timing: TransitionTiming,
}

impl Transition {
    pub fn new(kind: TransitionKind, duration: f64, timing: TransitionTiming) -> Self {
        Self {
            kind,
            duration,
            direction: None,
            timing,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// A zero, negative or non-finite duration is treated as no transition.
    pub fn is_effective(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0
    }

    /// Offset of the blend window start relative to the owning item's start.
    pub fn window_offset(&self) -> f64 {
        match self.timing {
            TransitionTiming::Postfix => 0.0,
            TransitionTiming::Overlap => -self.duration / 2.0,
            TransitionTiming::Prefix => -self.duration,
        }
    }

    /// How much of the window lies before the owning item's start.
    pub fn lead_in(&self) -> f64 {
        -self.window_offset()
    }
}

// ---------------------------------------------------------------------------
// TrackKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Overlay,
}

// ---------------------------------------------------------------------------
// ItemContent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemContent {
    Video {
        source: String,
    },
    Image {
        source: String,
    },
    Text {
        text: String,
        font_size: u32,
        color: String,
    },
    Audio {
        source: String,
        #[serde(default = "default_volume")]
        volume: f64,
    },
    Color {
        color: String,
    },
}

fn default_volume() -> f64 {
    1.0
}

impl ItemContent {
    /// Source reference for content backed by a media element.
    pub fn media_source(&self) -> Option<&str> {
        match self {
            ItemContent::Video { source } | ItemContent::Audio { source, .. } => Some(source),
            ItemContent::Image { .. } | ItemContent::Text { .. } | ItemContent::Color { .. } => {
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TimelineItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineItem {
    pub id: Uuid,
    pub start: f64,
    pub duration: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
    #[serde(default)]
    pub background: bool,
    #[serde(default)]
    pub rotation: f64,
    pub content: ItemContent,
}

impl TimelineItem {
    pub fn new(start: f64, duration: f64, content: ItemContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            duration,
            offset: 0.0,
            transition: None,
            background: false,
            rotation: 0.0,
            content,
        }
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Half-open containment `start <= t < start + duration`.
    pub fn contains(&self, t: f64) -> bool {
        t.is_finite() && self.duration > 0.0 && self.start <= t && t < self.end()
    }

    /// Position inside the source media corresponding to timeline time `t`.
    pub fn source_time(&self, t: f64) -> f64 {
        self.offset + (t - self.start)
    }

    pub fn has_media(&self) -> bool {
        self.content.media_source().is_some()
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub id: Uuid,
    pub kind: TrackKind,
    #[serde(default)]
    pub items: Vec<TimelineItem>,
}

impl Track {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            items: vec![],
        }
    }

    pub fn sort_items(&mut self) {
        self.items.sort_by(|a, b| a.start.total_cmp(&b.start));
    }

    /// True when items are strictly ordered by start and pairwise disjoint,
    /// up to [`TIME_EPSILON`] of rounding at shared edges.
    pub fn is_consistent(&self) -> bool {
        self.items
            .windows(2)
            .all(|w| w[0].start < w[1].start && w[0].end() <= w[1].start + TIME_EPSILON)
    }

    pub fn position_of(&self, item_id: Uuid) -> Option<usize> {
        self.items.iter().position(|i| i.id == item_id)
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Timeline {
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// End of the last item on any track; 0 for an empty timeline.
    pub fn duration(&self) -> f64 {
        self.tracks
            .iter()
            .flat_map(|t| t.items.iter())
            .map(|i| i.end())
            .filter(|end| end.is_finite())
            .fold(0.0, f64::max)
    }

    pub fn find_item(&self, item_id: Uuid) -> Option<&TimelineItem> {
        self.tracks
            .iter()
            .flat_map(|t| t.items.iter())
            .find(|i| i.id == item_id)
    }

    /// Find the (track_index, item_index) for a given item id.
    pub fn find_item_location(&self, item_id: Uuid) -> Option<(usize, usize)> {
        for (ti, track) in self.tracks.iter().enumerate() {
            if let Some(ii) = track.position_of(item_id) {
                return Some((ti, ii));
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub settings: EditorSettings,
    #[serde(default)]
    pub timeline: Timeline,
}

impl Project {
    pub fn new(name: impl Into<String>, settings: EditorSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            settings,
            timeline: Timeline::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
