//! Stroke styling for connections
//!
//! Resolves the visual stroke of a connection from its arrow type, path style
//! and animation flag. Marker parameters travel with each resolved style so a
//! renderer never shares arrowhead state between connections.

use serde::{Deserialize, Serialize};

use super::{ArrowType, CustomStyle, PathStyle};

const DEFAULT_COLOR: &str = "#60A5FA";
const SPLIT_COLOR: &str = "#F59E0B";
const DOTTED_COLOR: &str = "#a855f7";
const CURVE_COLOR: &str = "#8b5cf6";
const NETWORK_COLOR: &str = "#06b6d4";
const BEZIER_COLOR: &str = "#10b981";
const SQUARE_COLOR: &str = "#f59e0b";

/// Dash animation applied to animated connections
pub const DASH_ANIMATION: &str = "dash 1.5s linear infinite";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

/// Arrowhead drawn at the end of one connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub color: String,
    pub length: f64,
    pub width: f64,
    pub animated: bool,
}

/// Fully resolved stroke of one connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash_array: Option<String>,
    pub line_cap: LineCap,
    pub marker: MarkerStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<String>,
}

/// Resolve the stroke for a style triple.
///
/// The arrow type sets colour and dash pattern, the path style may override
/// colour and width, and animation only applies with a non-default arrow.
pub fn stroke_style(
    arrow_type: ArrowType,
    path_style: PathStyle,
    animated: bool,
    custom: Option<&CustomStyle>,
) -> StrokeStyle {
    let (mut color, dash_array) = match arrow_type {
        ArrowType::Split => (SPLIT_COLOR.to_string(), Some("12,6".to_string())),
        ArrowType::Dotted => (DOTTED_COLOR.to_string(), Some("4,8".to_string())),
        ArrowType::Default => (DEFAULT_COLOR.to_string(), None),
    };
    let mut width = 2.0;
    let mut line_cap = LineCap::Butt;
    let mut marker_color = None;
    let mut marker_size = (10.0, 7.0);

    match path_style {
        PathStyle::Straight => {}
        PathStyle::Curve => {
            color = CURVE_COLOR.to_string();
            if arrow_type == ArrowType::Default {
                width = 3.0;
            }
        }
        PathStyle::CurveNetwork => color = NETWORK_COLOR.to_string(),
        PathStyle::CubicBezier => {
            color = BEZIER_COLOR.to_string();
            width = 3.0;
            line_cap = LineCap::Round;
        }
        PathStyle::SquareRounded => {
            color = SQUARE_COLOR.to_string();
            width = 3.0;
            line_cap = LineCap::Round;
        }
        PathStyle::Custom => match custom {
            Some(custom) => {
                color = custom.color.clone();
                width = custom.thickness;
                marker_color = Some(custom.marker_color().to_string());
                marker_size = (custom.pointer_length, custom.pointer_width);
            }
            None => {
                color = SQUARE_COLOR.to_string();
                width = 3.0;
            }
        },
    }

    let animate = animated && arrow_type != ArrowType::Default;
    StrokeStyle {
        marker: MarkerStyle {
            color: marker_color.unwrap_or_else(|| color.clone()),
            length: marker_size.0,
            width: marker_size.1,
            animated: animate,
        },
        color,
        width,
        dash_array,
        line_cap,
        animation: animate.then(|| DASH_ANIMATION.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stroke() {
        let style = stroke_style(ArrowType::Default, PathStyle::Straight, false, None);
        assert_eq!(style.color, "#60A5FA");
        assert_eq!(style.width, 2.0);
        assert!(style.dash_array.is_none());
        assert!(style.animation.is_none());
    }

    #[test]
    fn test_curve_overrides_split_colour_but_keeps_dashes() {
        let style = stroke_style(ArrowType::Split, PathStyle::Curve, false, None);
        assert_eq!(style.color, "#8b5cf6");
        assert_eq!(style.width, 2.0);
        assert_eq!(style.dash_array.as_deref(), Some("12,6"));
    }

    #[test]
    fn test_animation_needs_non_default_arrow() {
        let still = stroke_style(ArrowType::Default, PathStyle::Straight, true, None);
        assert!(still.animation.is_none());
        let moving = stroke_style(ArrowType::Dotted, PathStyle::Straight, true, None);
        assert_eq!(moving.animation.as_deref(), Some(DASH_ANIMATION));
        assert!(moving.marker.animated);
    }

    #[test]
    fn test_custom_marker_is_per_connection() {
        let red = CustomStyle {
            color: "#ff0000".to_string(),
            thickness: 4.0,
            pointer_color: Some("#000000".to_string()),
            ..CustomStyle::default()
        };
        let blue = CustomStyle {
            color: "#0000ff".to_string(),
            ..CustomStyle::default()
        };
        let a = stroke_style(ArrowType::Default, PathStyle::Custom, false, Some(&red));
        let b = stroke_style(ArrowType::Default, PathStyle::Custom, false, Some(&blue));
        assert_eq!(a.marker.color, "#000000");
        assert_eq!(a.width, 4.0);
        assert_eq!(b.marker.color, "#0000ff");
    }
}
