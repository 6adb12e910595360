//! Terminal tables for catalog and route output
//!
//! Catalog swatches are painted with the technology's own color using
//! crossterm ANSI styling.

use crossterm::style::{Color, Stylize};
use unicode_width::UnicodeWidthStr;

use archcanvas::editor::RoutedConnection;
use archcanvas::Technology;

/// Parse `#rrggbb` (or `#rgb`) into a terminal color
pub fn parse_hex(color: &str) -> Option<Color> {
    let hex = color.strip_prefix('#')?;
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

fn pad(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(used)))
}

/// One line per technology: swatch, icon, id, name and category
pub fn catalog_table(entries: &[Technology], color: bool) -> String {
    let id_width = entries.iter().map(|t| t.id.len()).max().unwrap_or(0);
    let name_width = entries
        .iter()
        .map(|t| UnicodeWidthStr::width(t.name.as_str()))
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(entries.len());
    for technology in entries {
        let swatch = match parse_hex(&technology.color).filter(|_| color) {
            Some(c) => format!("{}", "██".with(c)),
            None => "  ".to_string(),
        };
        lines.push(format!(
            "{} {} {}  {}  {}",
            swatch,
            pad(&technology.icon, 2),
            pad(&technology.id, id_width),
            pad(&technology.name, name_width),
            technology.category
        ));
    }
    lines.join("\n")
}

/// One line per routed connection: id, type and SVG path
pub fn route_table(routes: &[RoutedConnection]) -> String {
    let id_width = routes.iter().map(|r| r.id.len()).max().unwrap_or(0);
    routes
        .iter()
        .map(|r| format!("{}  {:<8}  {}", pad(&r.id, id_width), r.connection_type.as_str(), r.path))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use archcanvas::TechnologyCatalog;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#FF0080"), Some(Color::Rgb { r: 255, g: 0, b: 128 }));
        assert_eq!(parse_hex("#fff"), Some(Color::Rgb { r: 255, g: 255, b: 255 }));
        assert_eq!(parse_hex("red"), None);
        assert_eq!(parse_hex("#12345"), None);
    }

    #[test]
    fn test_catalog_table_without_color_has_no_escapes() {
        let catalog = TechnologyCatalog::builtin();
        let entries: Vec<_> = catalog.iter().cloned().collect();
        let table = catalog_table(&entries, false);
        assert_eq!(table.lines().count(), entries.len());
        assert!(!table.contains('\x1b'));
        assert!(table.contains("postgres"));
    }

    #[test]
    fn test_catalog_table_with_color_paints_swatches() {
        if std::env::var("NO_COLOR").is_ok() {
            return;
        }
        let catalog = TechnologyCatalog::builtin();
        let entries: Vec<_> = catalog.by_category("Database").cloned().collect();
        let table = catalog_table(&entries, true);
        assert!(table.contains('\x1b'));
    }
}
