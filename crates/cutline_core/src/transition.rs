//! Rendering parameters for a layer that is mid-transition.
//!
//! [`parameters`] is a pure function of the transition family, the layer's
//! role, the progress through the blend window, and the direction. Empty
//! parameters mean "render unmodified". Translations, insets and radii are
//! percentages of the frame.

use crate::resolver::Role;
use crate::types::{Direction, TransitionKind};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_4, PI};
use std::fmt;

/// Blur peak for whip transitions, in pixels.
pub const WHIP_MAX_BLUR_PX: f64 = 20.0;
/// Iris radius at full progress; large enough to cover the frame corners.
pub const IRIS_FULL_RADIUS: f64 = 75.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    Additive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Filter {
    pub blur_px: Option<f64>,
    pub brightness: Option<f64>,
}

impl Filter {
    pub fn blur(px: f64) -> Self {
        Self {
            blur_px: Some(px),
            brightness: None,
        }
    }

    pub fn brightness(factor: f64) -> Self {
        Self {
            blur_px: None,
            brightness: Some(factor),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(px) = self.blur_px {
            parts.push(format!("blur({px:.2}px)"));
        }
        if let Some(b) = self.brightness {
            parts.push(format!("brightness({b:.3})"));
        }
        write!(f, "{}", parts.join(" "))
    }
}

/// Visible region of a layer, in frame percentages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ClipPath {
    Inset {
        top: f64,
        right: f64,
        bottom: f64,
        left: f64,
    },
    Circle {
        radius: f64,
        cx: f64,
        cy: f64,
    },
    Polygon {
        points: Vec<(f64, f64)>,
    },
}

impl ClipPath {
    fn inset_all(amount: f64) -> Self {
        ClipPath::Inset {
            top: amount,
            right: amount,
            bottom: amount,
            left: amount,
        }
    }
}

impl fmt::Display for ClipPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipPath::Inset {
                top,
                right,
                bottom,
                left,
            } => write!(f, "inset({top:.3}% {right:.3}% {bottom:.3}% {left:.3}%)"),
            ClipPath::Circle { radius, cx, cy } => {
                write!(f, "circle({radius:.3}% at {cx:.3}% {cy:.3}%)")
            }
            ClipPath::Polygon { points } => {
                let pts: Vec<String> = points
                    .iter()
                    .map(|(x, y)| format!("{x:.3}% {y:.3}%"))
                    .collect();
                write!(f, "polygon({})", pts.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TransitionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_percent: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_path: Option<ClipPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<BlendMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index_hint: Option<i32>,
}

impl TransitionParams {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn opacity(value: f64) -> Self {
        Self {
            opacity: Some(value),
            ..Self::default()
        }
    }

    fn translate(dx: f64, dy: f64, percent: f64) -> Self {
        Self {
            translate_percent: Some((dx * percent, dy * percent)),
            ..Self::default()
        }
    }

    fn clip(path: ClipPath) -> Self {
        Self {
            clip_path: Some(path),
            ..Self::default()
        }
    }
}

/// Compute the parameters for one layer of a transition.
///
/// `progress` is clamped to `[0, 1]`; a missing direction means `Left`.
pub fn parameters(
    kind: TransitionKind,
    role: Role,
    progress: f64,
    direction: Option<Direction>,
) -> TransitionParams {
    let p = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let direction = direction.unwrap_or_default();
    let (dx, dy) = direction.vector();

    match kind {
        TransitionKind::Dissolve | TransitionKind::FilmDissolve | TransitionKind::GradientWipe => {
            dissolve(role, p)
        }
        TransitionKind::AdditiveDissolve => TransitionParams {
            blend_mode: Some(BlendMode::Additive),
            ..dissolve(role, p)
        },
        TransitionKind::DipToBlack => dip(role, p),
        TransitionKind::DipToWhite => {
            let brightness = match role {
                Role::Outgoing => 1.0 + 2.0 * p,
                Role::Main => 1.0 + 2.0 * (1.0 - p),
            };
            TransitionParams {
                filter: Some(Filter::brightness(brightness)),
                ..dip(role, p)
            }
        }
        TransitionKind::Slide => match role {
            Role::Outgoing => TransitionParams::default(),
            Role::Main => TransitionParams {
                z_index_hint: Some(1),
                ..TransitionParams::translate(dx, dy, 100.0 * (1.0 - p))
            },
        },
        TransitionKind::Push => push(role, p, dx, dy),
        TransitionKind::Whip => TransitionParams {
            filter: Some(Filter::blur((p * PI).sin() * WHIP_MAX_BLUR_PX)),
            ..push(role, p, dx, dy)
        },
        TransitionKind::Split => reveal(role, || split_inset(p, direction)),
        TransitionKind::IrisRound => reveal(role, || ClipPath::Circle {
            radius: IRIS_FULL_RADIUS * p,
            cx: 50.0,
            cy: 50.0,
        }),
        TransitionKind::IrisBox => reveal(role, || ClipPath::inset_all(50.0 * (1.0 - p))),
        TransitionKind::Wipe => reveal(role, || wipe_inset(p, direction)),
        TransitionKind::ClockWipe => reveal(role, || clock_polygon(p)),
        TransitionKind::ZoomIn => match role {
            Role::Outgoing => TransitionParams {
                scale: Some(1.0 + p),
                ..TransitionParams::opacity(1.0 - p)
            },
            Role::Main => TransitionParams {
                scale: Some(p),
                ..TransitionParams::opacity(p)
            },
        },
        TransitionKind::ZoomOut => match role {
            Role::Outgoing => TransitionParams {
                scale: Some(1.0 - p),
                ..TransitionParams::opacity(1.0 - p)
            },
            Role::Main => TransitionParams {
                scale: Some(2.0 - p),
                ..TransitionParams::opacity(p)
            },
        },
        TransitionKind::None | TransitionKind::Unknown => TransitionParams::default(),
    }
}

fn dissolve(role: Role, p: f64) -> TransitionParams {
    match role {
        Role::Outgoing => TransitionParams::opacity(1.0 - p),
        Role::Main => TransitionParams::opacity(p),
    }
}

fn dip(role: Role, p: f64) -> TransitionParams {
    match role {
        Role::Outgoing if p < 0.5 => TransitionParams::opacity(1.0 - 2.0 * p),
        Role::Main if p > 0.5 => TransitionParams::opacity(2.0 * (p - 0.5)),
        Role::Outgoing | Role::Main => TransitionParams::opacity(0.0),
    }
}

fn push(role: Role, p: f64, dx: f64, dy: f64) -> TransitionParams {
    match role {
        Role::Outgoing => TransitionParams::translate(dx, dy, -100.0 * p),
        Role::Main => TransitionParams::translate(dx, dy, 100.0 * (1.0 - p)),
    }
}

/// Clip-path families leave the outgoing layer alone.
fn reveal(role: Role, path: impl FnOnce() -> ClipPath) -> TransitionParams {
    match role {
        Role::Outgoing => TransitionParams::default(),
        Role::Main => TransitionParams::clip(path()),
    }
}

fn split_inset(p: f64, direction: Direction) -> ClipPath {
    let amount = 50.0 * (1.0 - p);
    match direction {
        Direction::Left | Direction::Right => ClipPath::Inset {
            top: 0.0,
            right: amount,
            bottom: 0.0,
            left: amount,
        },
        Direction::Up | Direction::Down => ClipPath::Inset {
            top: amount,
            right: 0.0,
            bottom: amount,
            left: 0.0,
        },
    }
}

/// The covered edge is the one the incoming layer enters from.
fn wipe_inset(p: f64, direction: Direction) -> ClipPath {
    let amount = 100.0 * (1.0 - p);
    let (top, right, bottom, left) = match direction {
        Direction::Left => (0.0, 0.0, 0.0, amount),
        Direction::Right => (0.0, amount, 0.0, 0.0),
        Direction::Up => (amount, 0.0, 0.0, 0.0),
        Direction::Down => (0.0, 0.0, amount, 0.0),
    };
    ClipPath::Inset {
        top,
        right,
        bottom,
        left,
    }
}

/// Clockwise sweep from 12 o'clock through `p * 2π`.
fn clock_polygon(p: f64) -> ClipPath {
    let sweep = p * 2.0 * PI;
    let mut points = vec![(50.0, 50.0), (50.0, 0.0)];
    for corner in 0..4 {
        let angle = FRAC_PI_4 * (2 * corner + 1) as f64;
        if angle < sweep {
            points.push(square_edge_point(angle));
        }
    }
    points.push(square_edge_point(sweep));
    ClipPath::Polygon { points }
}

/// Where a ray from the frame centre at `angle` (clockwise from up) meets the
/// frame edge.
fn square_edge_point(angle: f64) -> (f64, f64) {
    let (s, c) = angle.sin_cos();
    let k = 50.0 / s.abs().max(c.abs());
    (50.0 + s * k, 50.0 - c * k)
}
