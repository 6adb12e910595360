//! Input format detection
//!
//! Decides whether an import payload is a JSON record or raw log text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// Core trait for import format detectors
pub trait Detector: Send + Sync {
    /// Detect if the input matches this format
    fn detect(&self, input: &str) -> bool;

    /// Get the confidence level of the detection (0.0 to 1.0)
    fn confidence(&self, input: &str) -> f64;

    /// Get the format name
    fn format(&self) -> InputFormat;

    /// Get key patterns that this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Json,
    Logs,
}

impl InputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Json => "json",
            InputFormat::Logs => "logs",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(InputFormat::Json),
            "logs" | "log" => Ok(InputFormat::Logs),
            _ => Err(format!("unknown input format '{}'", s)),
        }
    }
}

/// Recognises the JSON import schema
#[derive(Debug, Default)]
pub struct JsonDetector;

impl JsonDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Detector for JsonDetector {
    fn detect(&self, input: &str) -> bool {
        self.confidence(input) >= 0.5
    }

    fn confidence(&self, input: &str) -> f64 {
        let input = input.trim();
        if !(input.starts_with('{') && input.ends_with('}')) {
            return 0.0;
        }
        let mut score: f64 = 0.4;
        if input.contains("\"nodes\"") {
            score += 0.4;
        }
        if input.contains("\"connections\"") {
            score += 0.2;
        }
        score.min(1.0)
    }

    fn format(&self) -> InputFormat {
        InputFormat::Json
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["{", "\"nodes\"", "\"connections\""]
    }
}

/// Recognises line-oriented service logs
#[derive(Debug, Default)]
pub struct LogDetector;

impl LogDetector {
    pub fn new() -> Self {
        Self
    }
}

const LOG_MARKERS: [&str; 8] = [
    "service=", "svc:", "trace_id", "traceId", "INFO", "ERROR", "WARN", "pod/",
];

impl Detector for LogDetector {
    fn detect(&self, input: &str) -> bool {
        self.confidence(input) >= 0.3
    }

    fn confidence(&self, input: &str) -> f64 {
        let lines: Vec<&str> = input.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return 0.0;
        }
        let marked = lines
            .iter()
            .filter(|line| LOG_MARKERS.iter().any(|m| line.contains(m)))
            .count();
        let ratio = marked as f64 / lines.len() as f64;
        trace!(lines = lines.len(), marked, ratio, "LogDetector confidence");
        ratio
    }

    fn format(&self) -> InputFormat {
        InputFormat::Logs
    }

    fn patterns(&self) -> Vec<&'static str> {
        LOG_MARKERS.to_vec()
    }
}

/// Pick the most likely format; JSON wins ties, logs are the fallback
pub fn detect_format(input: &str) -> InputFormat {
    let detectors: [&dyn Detector; 2] = [&JsonDetector, &LogDetector];
    let best = detectors
        .iter()
        .map(|d| (d.format(), d.confidence(input)))
        .fold(None, |best: Option<(InputFormat, f64)>, (format, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((format, score)),
        });
    let format = match best {
        Some((format, score)) if score > 0.0 => format,
        _ => InputFormat::Logs,
    };
    debug!(format = %format, "Detected import format");
    format
}
