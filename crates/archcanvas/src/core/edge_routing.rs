//! Connection routing between two anchor points
//!
//! Produces typed path descriptors for every path style: straight lines,
//! perpendicular curves, axis-aligned cubic beziers, upward "network" arcs,
//! orthogonal paths with rounded corners, and user-authored custom paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use super::geometry::{sign, unit_vector};
use super::{CustomFallback, CustomPathPoint, CustomStyle, PathStyle, Position, Rect};

/// Endpoints closer than this on either axis route square-rounded as a line
pub const ALIGNMENT_TOLERANCE: f64 = 20.0;

/// One drawing command of a routed path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase")]
pub enum PathSegment {
    MoveTo { to: Position },
    LineTo { to: Position },
    QuadTo { control: Position, to: Position },
    CubicTo { c1: Position, c2: Position, to: Position },
    /// Quadratic segment whose control point reflects the previous one
    SmoothQuadTo { to: Position },
}

impl PathSegment {
    /// Point the segment ends at
    pub fn end(&self) -> Position {
        match *self {
            PathSegment::MoveTo { to }
            | PathSegment::LineTo { to }
            | PathSegment::QuadTo { to, .. }
            | PathSegment::CubicTo { to, .. }
            | PathSegment::SmoothQuadTo { to } => to,
        }
    }

    fn points(&self) -> Vec<Position> {
        match *self {
            PathSegment::MoveTo { to }
            | PathSegment::LineTo { to }
            | PathSegment::SmoothQuadTo { to } => vec![to],
            PathSegment::QuadTo { control, to } => vec![control, to],
            PathSegment::CubicTo { c1, c2, to } => vec![c1, c2, to],
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::MoveTo { to } => write!(f, "M {} {}", to.x, to.y),
            PathSegment::LineTo { to } => write!(f, "L {} {}", to.x, to.y),
            PathSegment::QuadTo { control, to } => {
                write!(f, "Q {} {} {} {}", control.x, control.y, to.x, to.y)
            }
            PathSegment::CubicTo { c1, c2, to } => write!(
                f,
                "C {} {}, {} {}, {} {}",
                c1.x, c1.y, c2.x, c2.y, to.x, to.y
            ),
            PathSegment::SmoothQuadTo { to } => write!(f, "T {} {}", to.x, to.y),
        }
    }
}

/// A routed connection path; `Display` yields SVG path data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDescriptor {
    pub segments: Vec<PathSegment>,
}

impl PathDescriptor {
    fn starting_at(from: Position) -> Self {
        Self {
            segments: vec![PathSegment::MoveTo { to: from }],
        }
    }

    /// A direct line between two points
    pub fn line(from: Position, to: Position) -> Self {
        let mut path = Self::starting_at(from);
        path.push(PathSegment::LineTo { to });
        path
    }

    fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Where the path begins
    pub fn start(&self) -> Position {
        self.segments
            .first()
            .map(PathSegment::end)
            .unwrap_or_default()
    }

    /// Where the path terminates
    pub fn end(&self) -> Position {
        self.segments.last().map(PathSegment::end).unwrap_or_default()
    }

    /// True for a single straight segment
    pub fn is_straight(&self) -> bool {
        matches!(
            self.segments.as_slice(),
            [PathSegment::MoveTo { .. }, PathSegment::LineTo { .. }]
        )
    }

    /// Bounding box of every endpoint and control point
    pub fn bounding_box(&self) -> Rect {
        let mut points = self.segments.iter().flat_map(PathSegment::points);
        let first = points.next().unwrap_or_default();
        points.fold(Rect::new(first.x, first.y, 0.0, 0.0), |acc, p| {
            acc.union(&Rect::new(p.x, p.y, 0.0, 0.0))
        })
    }
}

impl fmt::Display for PathDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Route a connection between two anchors.
///
/// `custom` supplies the user-authored path for [`PathStyle::Custom`]; a
/// custom connection without points routes by its fallback. Coincident
/// anchors always produce a straight line.
pub fn compute_route(
    from: Position,
    to: Position,
    style: PathStyle,
    custom: Option<&CustomStyle>,
) -> PathDescriptor {
    if unit_vector(from, to).is_none() {
        return PathDescriptor::line(from, to);
    }

    let path = match style {
        PathStyle::Straight => PathDescriptor::line(from, to),
        PathStyle::Curve => route_curve(from, to),
        PathStyle::CubicBezier => route_cubic_bezier(from, to),
        PathStyle::CurveNetwork => route_curve_network(from, to),
        PathStyle::SquareRounded => route_square_rounded(from, to),
        PathStyle::Custom => match custom {
            Some(custom) => match custom.custom_path.as_deref() {
                Some(points) if points.len() >= 2 => route_custom(from, to, points),
                _ => route_custom_fallback(from, to, custom.fallback),
            },
            None => PathDescriptor::line(from, to),
        },
    };

    trace!(style = %style, segments = path.segments.len(), "Routed connection");
    path
}

fn midpoint(from: Position, to: Position) -> Position {
    Position::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0)
}

fn route_curve(from: Position, to: Position) -> PathDescriptor {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = dx.hypot(dy);
    let offset = (length * 0.3).min(100.0);
    let mid = midpoint(from, to);
    let control = Position::new(mid.x - dy / length * offset, mid.y + dx / length * offset);

    let mut path = PathDescriptor::starting_at(from);
    path.push(PathSegment::QuadTo { control, to });
    path
}

fn route_cubic_bezier(from: Position, to: Position) -> PathDescriptor {
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    let (c1, c2) = if dx.abs() > dy.abs() {
        let offset = dx.abs() * 0.3 * sign(dx);
        (
            Position::new(from.x + offset, from.y),
            Position::new(to.x - offset, to.y),
        )
    } else {
        let offset = dy.abs() * 0.3 * sign(dy);
        (
            Position::new(from.x, from.y + offset),
            Position::new(to.x, to.y - offset),
        )
    };

    let mut path = PathDescriptor::starting_at(from);
    path.push(PathSegment::CubicTo { c1, c2, to });
    path
}

fn route_curve_network(from: Position, to: Position) -> PathDescriptor {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let lift = (dx.hypot(dy) * 0.3).min(80.0);

    let c1 = Position::new(from.x + dx * 0.25, from.y - lift);
    let c2 = Position::new(from.x + dx * 0.75, to.y - lift);

    let mut path = PathDescriptor::starting_at(from);
    path.push(PathSegment::CubicTo { c1, c2, to });
    path
}

fn route_square_rounded(from: Position, to: Position) -> PathDescriptor {
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    if dy.abs() <= ALIGNMENT_TOLERANCE || dx.abs() <= ALIGNMENT_TOLERANCE {
        return PathDescriptor::line(from, to);
    }

    let radius = (dx.hypot(dy) * 0.1).min(15.0);
    let (sx, sy) = (sign(dx), sign(dy));
    let mut path = PathDescriptor::starting_at(from);

    if dx.abs() >= dy.abs() {
        let turn_x = from.x + dx * 0.7;
        path.push(PathSegment::LineTo {
            to: Position::new(turn_x - sx * radius, from.y),
        });
        path.push(PathSegment::QuadTo {
            control: Position::new(turn_x, from.y),
            to: Position::new(turn_x, from.y + sy * radius),
        });
        path.push(PathSegment::LineTo {
            to: Position::new(turn_x, to.y - sy * radius),
        });
        path.push(PathSegment::QuadTo {
            control: Position::new(turn_x, to.y),
            to: Position::new(turn_x + sx * radius, to.y),
        });
    } else {
        let turn_y = from.y + dy * 0.7;
        path.push(PathSegment::LineTo {
            to: Position::new(from.x, turn_y - sy * radius),
        });
        path.push(PathSegment::QuadTo {
            control: Position::new(from.x, turn_y),
            to: Position::new(from.x + sx * radius, turn_y),
        });
        path.push(PathSegment::LineTo {
            to: Position::new(to.x - sx * radius, turn_y),
        });
        path.push(PathSegment::QuadTo {
            control: Position::new(to.x, turn_y),
            to: Position::new(to.x, turn_y + sy * radius),
        });
    }
    path.push(PathSegment::LineTo { to });
    path
}

/// Map a normalized point onto the anchor vector
pub fn denormalize(from: Position, to: Position, point: &CustomPathPoint) -> Position {
    Position::new(
        from.x + (to.x - from.x) * point.x,
        from.y + (to.y - from.y) * point.y,
    )
}

fn route_custom(from: Position, to: Position, points: &[CustomPathPoint]) -> PathDescriptor {
    let actual: Vec<Position> = points.iter().map(|p| denormalize(from, to, p)).collect();
    let mut path = PathDescriptor::starting_at(from);

    match actual.len() {
        2 => path.push(PathSegment::LineTo { to }),
        3 => path.push(PathSegment::QuadTo {
            control: actual[1],
            to,
        }),
        4 => path.push(PathSegment::CubicTo {
            c1: actual[1],
            c2: actual[2],
            to,
        }),
        _ => {
            // Interior points drive a chain of smooth quadratics.
            let controls = &actual[1..actual.len() - 1];
            path.push(PathSegment::QuadTo {
                control: controls[0],
                to: controls[1],
            });
            for control in &controls[2..] {
                path.push(PathSegment::SmoothQuadTo { to: *control });
            }
            path.push(PathSegment::SmoothQuadTo { to });
        }
    }
    path
}

fn route_custom_fallback(from: Position, to: Position, fallback: CustomFallback) -> PathDescriptor {
    match fallback {
        CustomFallback::Straight => PathDescriptor::line(from, to),
        CustomFallback::Curve => route_curve(from, to),
        CustomFallback::Bezier => {
            let dx = to.x - from.x;
            let dy = to.y - from.y;
            let offset = (dx.hypot(dy) * 0.25).min(80.0);
            let c1 = Position::new(from.x + dx * 0.25 - offset, from.y + dy * 0.25 - offset);
            let c2 = Position::new(from.x + dx * 0.75 + offset, from.y + dy * 0.75 - offset);
            let mut path = PathDescriptor::starting_at(from);
            path.push(PathSegment::CubicTo { c1, c2, to });
            path
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_straight_route() {
        let path = compute_route(p(0.0, 0.0), p(100.0, 50.0), PathStyle::Straight, None);
        assert!(path.is_straight());
        assert_eq!(path.to_string(), "M 0 0 L 100 50");
    }

    #[test]
    fn test_curve_control_is_perpendicular_and_capped() {
        let path = compute_route(p(0.0, 0.0), p(1000.0, 0.0), PathStyle::Curve, None);
        match path.segments[1] {
            PathSegment::QuadTo { control, to } => {
                assert_eq!(control, p(500.0, 100.0));
                assert_eq!(to, p(1000.0, 0.0));
            }
            other => panic!("expected quadratic, got {:?}", other),
        }
    }

    #[test]
    fn test_short_curve_uses_thirty_percent() {
        let path = compute_route(p(0.0, 0.0), p(0.0, 100.0), PathStyle::Curve, None);
        match path.segments[1] {
            PathSegment::QuadTo { control, .. } => {
                assert!((control.x + 30.0).abs() < 1e-9);
                assert!((control.y - 50.0).abs() < 1e-9);
            }
            other => panic!("expected quadratic, got {:?}", other),
        }
    }

    #[test]
    fn test_cubic_bezier_horizontal_dominant() {
        let path = compute_route(p(100.0, 0.0), p(0.0, 20.0), PathStyle::CubicBezier, None);
        assert_eq!(
            path.segments[1],
            PathSegment::CubicTo {
                c1: p(70.0, 0.0),
                c2: p(30.0, 20.0),
                to: p(0.0, 20.0)
            }
        );
    }

    #[test]
    fn test_cubic_bezier_vertical_dominant() {
        let path = compute_route(p(0.0, 0.0), p(10.0, 200.0), PathStyle::CubicBezier, None);
        assert_eq!(
            path.segments[1],
            PathSegment::CubicTo {
                c1: p(0.0, 60.0),
                c2: p(10.0, 140.0),
                to: p(10.0, 200.0)
            }
        );
    }

    #[test]
    fn test_curve_network_always_arcs_upward() {
        for (from, to) in [(p(0.0, 0.0), p(400.0, 0.0)), (p(400.0, 0.0), p(0.0, 0.0))] {
            let path = compute_route(from, to, PathStyle::CurveNetwork, None);
            match path.segments[1] {
                PathSegment::CubicTo { c1, c2, .. } => {
                    assert_eq!(c1.y, -80.0);
                    assert_eq!(c2.y, -80.0);
                }
                other => panic!("expected cubic, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_square_rounded_l_shape() {
        let path = compute_route(p(0.0, 0.0), p(400.0, 200.0), PathStyle::SquareRounded, None);
        assert_eq!(path.segments.len(), 6);
        assert_eq!(path.segments[1].end(), p(265.0, 0.0));
        assert_eq!(path.segments[2].end(), p(280.0, 15.0));
        assert_eq!(path.end(), p(400.0, 200.0));
    }

    #[test]
    fn test_square_rounded_vertical_first() {
        let path = compute_route(p(0.0, 0.0), p(-100.0, 300.0), PathStyle::SquareRounded, None);
        assert_eq!(path.segments[1].end(), p(0.0, 195.0));
        assert_eq!(path.segments[2].end(), p(-15.0, 210.0));
        assert_eq!(path.end(), p(-100.0, 300.0));
    }

    #[test]
    fn test_custom_three_points_is_quadratic() {
        let style = CustomStyle::with_path(vec![
            CustomPathPoint::start(),
            CustomPathPoint::control(0.5, 0.0),
            CustomPathPoint::end(),
        ]);
        let path = compute_route(p(0.0, 0.0), p(200.0, 100.0), PathStyle::Custom, Some(&style));
        assert_eq!(
            path.segments[1],
            PathSegment::QuadTo {
                control: p(100.0, 0.0),
                to: p(200.0, 100.0)
            }
        );
    }

    #[test]
    fn test_custom_many_points_chain_smooth_segments() {
        let mut points = vec![CustomPathPoint::start()];
        for i in 1..6 {
            points.push(CustomPathPoint::control(i as f64 / 6.0, 0.5));
        }
        points.push(CustomPathPoint::new(0.9, 0.9, crate::core::PointKind::End));
        let style = CustomStyle::with_path(points);
        let path = compute_route(p(0.0, 0.0), p(600.0, 600.0), PathStyle::Custom, Some(&style));
        let smooth = path
            .segments
            .iter()
            .filter(|s| matches!(s, PathSegment::SmoothQuadTo { .. }))
            .count();
        assert_eq!(smooth, 4);
        assert_eq!(path.end(), p(600.0, 600.0));
    }

    #[test]
    fn test_custom_without_points_uses_fallback() {
        let style = CustomStyle {
            fallback: CustomFallback::Curve,
            ..CustomStyle::default()
        };
        let path = compute_route(p(0.0, 0.0), p(100.0, 0.0), PathStyle::Custom, Some(&style));
        assert!(matches!(path.segments[1], PathSegment::QuadTo { .. }));

        let line = compute_route(p(0.0, 0.0), p(100.0, 0.0), PathStyle::Custom, None);
        assert!(line.is_straight());
    }

    #[test]
    fn test_coincident_points_never_produce_nan() {
        for style in PathStyle::all() {
            let path = compute_route(p(5.0, 5.0), p(5.0, 5.0), *style, None);
            let text = path.to_string();
            assert!(!text.contains("NaN"), "{} produced {}", style, text);
        }
    }

    #[test]
    fn test_bounding_box_includes_controls() {
        let path = compute_route(p(0.0, 0.0), p(1000.0, 0.0), PathStyle::Curve, None);
        let bbox = path.bounding_box();
        assert_eq!(bbox, Rect::new(0.0, 0.0, 1000.0, 100.0));
    }
}
