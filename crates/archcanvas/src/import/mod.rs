//! Diagram import and export
//!
//! Payloads arrive as JSON import records or raw service logs, are parsed
//! into an [`ImportRecord`] and applied to a model by the
//! [`ImportNormalizer`].

mod detector;
#[cfg(feature = "logs")]
mod logs;
mod normalizer;
mod record;
mod technology;

pub use detector::*;
#[cfg(feature = "logs")]
pub use logs::*;
pub use normalizer::*;
pub use record::*;
pub use technology::*;

use crate::core::{EditorError, TechnologyCatalog};

/// Parse `input` as `format`, detecting the format when `None`
pub fn parse_input(
    input: &str,
    format: Option<InputFormat>,
    catalog: &TechnologyCatalog,
) -> Result<ImportRecord, EditorError> {
    match format.unwrap_or_else(|| detect_format(input)) {
        InputFormat::Json => parse_json(input),
        InputFormat::Logs => parse_log_input(input, catalog),
    }
}

#[cfg(feature = "logs")]
fn parse_log_input(input: &str, catalog: &TechnologyCatalog) -> Result<ImportRecord, EditorError> {
    let parsed = parse_logs(input, catalog);
    if parsed.services.is_empty() {
        return Err(EditorError::import_error(
            "no service names found in log input".to_string(),
        ));
    }
    Ok(parsed.to_import_record())
}

#[cfg(not(feature = "logs"))]
fn parse_log_input(_input: &str, _catalog: &TechnologyCatalog) -> Result<ImportRecord, EditorError> {
    Err(EditorError::import_error(
        "log import requires the 'logs' feature".to_string(),
    ))
}
