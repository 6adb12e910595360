//! Anchor geometry for connections
//!
//! Connections attach to a node at a fixed radius from its center, along the
//! center-to-center direction.

use serde::{Deserialize, Serialize};

use super::{Position, Rect, NODE_RADIUS};

/// Chords shorter than this are treated as degenerate
pub const MIN_CHORD: f64 = 1e-9;

/// Trimmed endpoints of a connection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchors {
    pub from_point: Position,
    pub to_point: Position,
}

impl Anchors {
    pub fn new(from_point: Position, to_point: Position) -> Self {
        Self {
            from_point,
            to_point,
        }
    }

    /// Rectangle spanned by both anchors
    pub fn span(&self) -> Rect {
        Rect::from_corners(self.from_point, self.to_point)
    }
}

/// Unit vector from `from` to `to`, or `None` when the points coincide
pub fn unit_vector(from: Position, to: Position) -> Option<(f64, f64)> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = dx.hypot(dy);
    if !length.is_finite() || length < MIN_CHORD {
        return None;
    }
    Some((dx / length, dy / length))
}

/// Compute the anchor points between two node rectangles.
///
/// Returns `None` when the centers coincide; callers skip rendering the
/// connection in that case.
pub fn compute_anchors(from_rect: &Rect, to_rect: &Rect) -> Option<Anchors> {
    compute_anchors_with_radius(from_rect, to_rect, NODE_RADIUS)
}

/// [`compute_anchors`] with an explicit attachment radius
pub fn compute_anchors_with_radius(
    from_rect: &Rect,
    to_rect: &Rect,
    radius: f64,
) -> Option<Anchors> {
    let from_center = from_rect.center();
    let to_center = to_rect.center();
    let (ux, uy) = unit_vector(from_center, to_center)?;

    Some(Anchors::new(
        Position::new(from_center.x + ux * radius, from_center.y + uy * radius),
        Position::new(to_center.x - ux * radius, to_center.y - uy * radius),
    ))
}

/// Anchors between two nodes given their top-left positions
pub fn anchors_between(from: Position, to: Position) -> Option<Anchors> {
    compute_anchors(&Rect::node_at(from), &Rect::node_at(to))
}

/// Sign of `v` with zero mapping to zero
pub(crate) fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
