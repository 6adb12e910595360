//! Text label measurement
//!
//! Labels are measured in display columns so wide glyphs (CJK, emoji) take
//! the space a renderer would give them.

use unicode_width::UnicodeWidthStr;

use super::{Position, Rect, Size};

/// Horizontal advance of one display column, in logical units
pub const GLYPH_ADVANCE: f64 = 8.0;

/// Height of one text line, in logical units
pub const LINE_HEIGHT: f64 = 20.0;

/// Padding around label text on each side
pub const LABEL_PADDING: f64 = 8.0;

/// Display columns of the widest line
pub fn display_columns(text: &str) -> usize {
    text.lines()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
}

/// Logical size a label occupies, never smaller than one empty line
pub fn label_extent(text: &str) -> Size {
    let lines = text.lines().count().max(1);
    Size::new(
        display_columns(text) as f64 * GLYPH_ADVANCE + LABEL_PADDING * 2.0,
        lines as f64 * LINE_HEIGHT + LABEL_PADDING * 2.0,
    )
}

/// Hit rectangle of a label placed at `position`
pub fn label_rect(text: &str, position: Position) -> Rect {
    let size = label_extent(text);
    Rect::new(position.x, position.y, size.width, size.height)
}
