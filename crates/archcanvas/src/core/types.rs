//! Core types for diagram editing
//!
//! Shared value types used by the geometry engine, the canvas bounds manager,
//! the diagram model and the importers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use super::EditorError;

/// Fixed width of every node rectangle, in logical units
pub const NODE_WIDTH: f64 = 160.0;

/// Fixed height of every node rectangle, in logical units
pub const NODE_HEIGHT: f64 = 100.0;

/// Distance from a node center to where a connection attaches
pub const NODE_RADIUS: f64 = 40.0;

/// A point in logical (unscaled) canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Return this position moved by `(dx, dy)`
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance to another point
    pub fn distance_to(self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Returns true if both coordinates are finite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height in logical units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle occupied by a node whose top-left corner is `position`
    pub fn node_at(position: Position) -> Self {
        Self::new(position.x, position.y, NODE_WIDTH, NODE_HEIGHT)
    }

    /// Normalized rectangle spanning two corner points in any order
    pub fn from_corners(a: Position, b: Position) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// AABB overlap test; touching edges count as overlapping
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Grow the rectangle by `amount` on every side
    pub fn inflate(&self, amount: f64) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }
}

/// Arrowhead / stroke family selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrowType {
    #[default]
    Default,
    Split,
    Dotted,
}

impl ArrowType {
    pub fn all() -> &'static [ArrowType] {
        &[ArrowType::Default, ArrowType::Split, ArrowType::Dotted]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArrowType::Default => "default",
            ArrowType::Split => "split",
            ArrowType::Dotted => "dotted",
        }
    }
}

impl fmt::Display for ArrowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrowType {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArrowType::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == s.to_lowercase())
            .ok_or_else(|| EditorError::UnknownArrowType {
                name: s.to_string(),
            })
    }
}

/// Routing algorithm used between two anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathStyle {
    #[default]
    Straight,
    Curve,
    CurveNetwork,
    CubicBezier,
    SquareRounded,
    Custom,
}

impl PathStyle {
    pub fn all() -> &'static [PathStyle] {
        &[
            PathStyle::Straight,
            PathStyle::Curve,
            PathStyle::CurveNetwork,
            PathStyle::CubicBezier,
            PathStyle::SquareRounded,
            PathStyle::Custom,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PathStyle::Straight => "straight",
            PathStyle::Curve => "curve",
            PathStyle::CurveNetwork => "curve-network",
            PathStyle::CubicBezier => "cubic-bezier",
            PathStyle::SquareRounded => "square-rounded",
            PathStyle::Custom => "custom",
        }
    }
}

impl fmt::Display for PathStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathStyle {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        PathStyle::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == lowered)
            .ok_or_else(|| EditorError::UnknownPathStyle {
                name: s.to_string(),
            })
    }
}

/// Derived connection label, recomputed from the style triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionType {
    #[default]
    Default,
    Animated,
    Split,
    Dotted,
    Curve,
    CurveNetwork,
    CubicBezier,
    Custom,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Default => "default",
            ConnectionType::Animated => "animated",
            ConnectionType::Split => "split",
            ConnectionType::Dotted => "dotted",
            ConnectionType::Curve => "curve",
            ConnectionType::CurveNetwork => "curve-network",
            ConnectionType::CubicBezier => "cubic-bezier",
            ConnectionType::Custom => "custom",
        }
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the connection type from `(animated, path_style, arrow_type)`.
///
/// First match wins: animated with a non-default arrow, then the path styles
/// curve, curve-network, cubic-bezier and custom, then the split and dotted
/// arrows, else default.
pub fn derive_connection_type(
    animated: bool,
    path_style: PathStyle,
    arrow_type: ArrowType,
) -> ConnectionType {
    if animated && arrow_type != ArrowType::Default {
        return ConnectionType::Animated;
    }
    match (path_style, arrow_type) {
        (PathStyle::Curve, _) => ConnectionType::Curve,
        (PathStyle::CurveNetwork, _) => ConnectionType::CurveNetwork,
        (PathStyle::CubicBezier, _) => ConnectionType::CubicBezier,
        (PathStyle::Custom, _) => ConnectionType::Custom,
        (_, ArrowType::Split) => ConnectionType::Split,
        (_, ArrowType::Dotted) => ConnectionType::Dotted,
        _ => ConnectionType::Default,
    }
}

/// Role of a point in a user-authored custom path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Start,
    #[default]
    Control,
    End,
}

/// A point of a custom path, normalized against the anchor-to-anchor vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomPathPoint {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type", default)]
    pub kind: PointKind,
}

impl CustomPathPoint {
    pub fn new(x: f64, y: f64, kind: PointKind) -> Self {
        Self { x, y, kind }
    }

    pub fn start() -> Self {
        Self::new(0.0, 0.0, PointKind::Start)
    }

    pub fn end() -> Self {
        Self::new(1.0, 1.0, PointKind::End)
    }

    pub fn control(x: f64, y: f64) -> Self {
        Self::new(x, y, PointKind::Control)
    }
}

/// Routing used by a custom connection that carries no point list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomFallback {
    #[default]
    Straight,
    Curve,
    Bezier,
}

/// User-authored stroke and path for a `custom` connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomStyle {
    pub color: String,
    pub thickness: f64,
    #[serde(default = "default_pointer_size")]
    pub pointer_length: f64,
    #[serde(default = "default_pointer_size")]
    pub pointer_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer_color: Option<String>,
    #[serde(rename = "style", default)]
    pub fallback: CustomFallback,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_path: Option<Vec<CustomPathPoint>>,
}

fn default_pointer_size() -> f64 {
    15.0
}

impl Default for CustomStyle {
    fn default() -> Self {
        Self {
            color: "#3B82F6".to_string(),
            thickness: 2.0,
            pointer_length: default_pointer_size(),
            pointer_width: default_pointer_size(),
            pointer_color: None,
            fallback: CustomFallback::Straight,
            custom_path: None,
        }
    }
}

impl CustomStyle {
    /// Custom style drawing along the given normalized points
    pub fn with_path(points: Vec<CustomPathPoint>) -> Self {
        Self {
            custom_path: Some(points),
            ..Self::default()
        }
    }

    /// Colour of the arrowhead; defaults to the stroke colour
    pub fn marker_color(&self) -> &str {
        self.pointer_color.as_deref().unwrap_or(&self.color)
    }
}

/// Service status reported on a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Running,
    Stopped,
    Error,
    Pending,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Running => write!(f, "running"),
            NodeStatus::Stopped => write!(f, "stopped"),
            NodeStatus::Error => write!(f, "error"),
            NodeStatus::Pending => write!(f, "pending"),
        }
    }
}

/// Deployment environment of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}
