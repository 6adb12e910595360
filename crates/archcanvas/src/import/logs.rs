//! Log import
//!
//! Turns free-form service logs into an import record. Each line is split
//! into tokens with a chumsky lexer, then fields are picked out of the token
//! stream: service name, trace id, HTTP endpoint, level, status code and
//! duration. Services become nodes; consecutive distinct services that share
//! a trace id become connections.

use chumsky::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, span, trace, Level};

use super::{auto_map, ImportConnection, ImportNode, ImportRecord};
use crate::core::TechnologyCatalog;

const LEVELS: &[&str] = &["TRACE", "DEBUG", "INFO", "WARN", "WARNING", "ERROR", "FATAL"];
const METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH"];
const TRACE_KEYS: &[&str] = &["trace_id", "trace-id", "traceid", "x-trace-id", "trace"];

/// One lexical unit of a log line
#[derive(Debug, Clone, PartialEq)]
pub enum LogToken {
    Timestamp(String),
    Quoted(String),
    Word(String),
    Punct(char),
}

impl LogToken {
    fn word(&self) -> Option<&str> {
        match self {
            LogToken::Word(w) => Some(w.as_str()),
            _ => None,
        }
    }

    /// Word or quoted text
    fn text(&self) -> Option<&str> {
        match self {
            LogToken::Word(w) | LogToken::Quoted(w) => Some(w.as_str()),
            _ => None,
        }
    }

    fn is_key(&self, keys: &[&str]) -> bool {
        self.text()
            .map(|t| keys.iter().any(|k| t.eq_ignore_ascii_case(k)))
            .unwrap_or(false)
    }
}

fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t\r").repeated().ignored()
}

fn digits<'src>(count: usize) -> impl Parser<'src, &'src str, ()> + Clone {
    one_of('0'..='9').repeated().exactly(count).ignored()
}

/// `2024-01-15T10:30:00.123Z` or `01/15/2024 10:30:00`
fn timestamp_parser<'src>() -> impl Parser<'src, &'src str, LogToken> + Clone {
    let clock = digits(2)
        .then(just(':'))
        .then(digits(2))
        .then(just(':'))
        .then(digits(2))
        .ignored();
    let fraction = just('.').then(one_of('0'..='9').repeated().at_least(1)).or_not();

    let iso = digits(4)
        .then(just('-'))
        .then(digits(2))
        .then(just('-'))
        .then(digits(2))
        .then(one_of("T "))
        .then(clock.clone())
        .then(fraction)
        .then(just('Z').or_not())
        .ignored();
    let slashed = digits(2)
        .then(just('/'))
        .then(digits(2))
        .then(just('/'))
        .then(digits(4))
        .then(one_of(" \t").repeated().at_least(1))
        .then(clock)
        .ignored();

    iso.or(slashed)
        .to_slice()
        .map(|s: &str| LogToken::Timestamp(s.to_string()))
}

/// Lexer for a single log line
pub fn token_parser<'src>() -> impl Parser<'src, &'src str, Vec<LogToken>> + Clone {
    let quoted = just('"')
        .ignore_then(none_of('"').repeated().to_slice())
        .then_ignore(just('"'))
        .map(|s: &str| LogToken::Quoted(s.to_string()));

    let word = any()
        .filter(|c: &char| c.is_alphanumeric() || matches!(*c, '-' | '_' | '.' | '/'))
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| LogToken::Word(s.to_string()));

    let punct = any().filter(|c: &char| !c.is_whitespace()).map(LogToken::Punct);

    let token = timestamp_parser().or(quoted).or(word).or(punct);

    inline_whitespace()
        .ignore_then(token.then_ignore(inline_whitespace()).repeated().collect())
        .then_ignore(end())
}

/// Split one line into tokens; unlexable input yields no tokens
pub fn tokenize(line: &str) -> Vec<LogToken> {
    token_parser().parse(line).into_result().unwrap_or_default()
}

/// Fields recovered from one log line
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

/// Value following `key`, skipping a `:` or `=` separator
fn value_after<'a>(tokens: &'a [LogToken], keys: &[&str]) -> Option<&'a str> {
    tokens.iter().enumerate().find_map(|(i, token)| {
        if !token.is_key(keys) {
            return None;
        }
        let mut rest = tokens[i + 1..].iter();
        let mut next = rest.next()?;
        if matches!(next, LogToken::Punct(':') | LogToken::Punct('=')) {
            next = rest.next()?;
        }
        next.text()
    })
}

fn is_level(word: &str) -> bool {
    LEVELS.iter().any(|l| word.eq_ignore_ascii_case(l))
}

fn service_of(tokens: &[LogToken]) -> Option<String> {
    if let Some(name) = value_after(tokens, &["service", "svc"]) {
        return Some(name.to_string());
    }
    let bracketed = tokens.windows(3).find_map(|w| match w {
        [LogToken::Punct('['), LogToken::Word(name), LogToken::Punct(']')] if !is_level(name) => {
            Some(name.clone())
        }
        _ => None,
    });
    if bracketed.is_some() {
        return bracketed;
    }
    if let Some(pod) = tokens
        .iter()
        .filter_map(LogToken::word)
        .find_map(|w| w.strip_prefix("pod/"))
        .filter(|p| !p.is_empty())
    {
        return Some(pod.to_string());
    }
    value_after(tokens, &["container"]).map(str::to_string)
}

fn endpoint_of(tokens: &[LogToken]) -> Option<(Option<String>, String)> {
    let request = tokens.windows(2).find_map(|w| match w {
        [LogToken::Word(method), LogToken::Word(path)]
            if path.starts_with('/') && METHODS.iter().any(|m| method.eq_ignore_ascii_case(m)) =>
        {
            Some((Some(method.to_uppercase()), path.clone()))
        }
        _ => None,
    });
    request.or_else(|| value_after(tokens, &["endpoint", "path"]).map(|p| (None, p.to_string())))
}

fn status_of(tokens: &[LogToken]) -> Option<u16> {
    tokens.iter().filter_map(LogToken::word).find_map(|w| {
        let code: u16 = w.parse().ok()?;
        (w.len() == 3 && (100..600).contains(&code)).then_some(code)
    })
}

fn duration_of(tokens: &[LogToken]) -> Option<f64> {
    tokens.iter().filter_map(LogToken::word).find_map(|w| {
        let split = w.find(|c: char| c.is_ascii_alphabetic())?;
        let (number, unit) = w.split_at(split);
        let value: f64 = number.parse().ok()?;
        match unit.to_ascii_lowercase().as_str() {
            "ms" | "millisecond" | "milliseconds" => Some(value),
            "s" | "sec" | "second" | "seconds" => Some(value * 1000.0),
            _ => None,
        }
    })
}

/// Extract the known fields from one line
pub fn parse_line(line: &str) -> LogEntry {
    let tokens = tokenize(line);
    let timestamp = tokens.iter().find_map(|t| match t {
        LogToken::Timestamp(ts) => Some(ts.clone()),
        _ => None,
    });
    let level = value_after(&tokens, &["level"])
        .filter(|l| is_level(l))
        .or_else(|| tokens.iter().filter_map(LogToken::word).find(|w| is_level(w)))
        .map(str::to_uppercase);
    let (method, endpoint) = match endpoint_of(&tokens) {
        Some((method, path)) => (method, Some(path)),
        None => (None, None),
    };

    let entry = LogEntry {
        timestamp,
        level,
        service: service_of(&tokens),
        trace_id: value_after(&tokens, TRACE_KEYS).map(str::to_string),
        method,
        endpoint,
        status_code: status_of(&tokens),
        duration_ms: duration_of(&tokens),
    };
    trace!(?entry, "Parsed log line");
    entry
}

/// A service seen in the logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogService {
    pub name: String,
    pub technology: String,
    pub endpoints: Vec<String>,
    pub traces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMetadata {
    pub total_logs: usize,
    pub log_levels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<(String, String)>,
}

/// Everything recovered from a block of log text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedLogs {
    pub services: Vec<LogService>,
    pub connections: Vec<ImportConnection>,
    pub metadata: LogMetadata,
}

impl ParsedLogs {
    /// Convert to an import record; positions are left to auto-layout
    pub fn to_import_record(&self) -> ImportRecord {
        ImportRecord {
            nodes: self
                .services
                .iter()
                .map(|s| ImportNode::named(&s.name).with_technology(&s.technology))
                .collect(),
            connections: self.connections.clone(),
            layout: None,
        }
    }
}

/// Parse a block of log text
pub fn parse_logs(text: &str, catalog: &TechnologyCatalog) -> ParsedLogs {
    let parse_span = span!(Level::INFO, "parse_logs", input_len = text.len());
    let _enter = parse_span.enter();

    let entries: Vec<LogEntry> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(parse_line)
        .collect();

    let mut services: Vec<LogService> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut levels: Vec<String> = Vec::new();
    for entry in &entries {
        if let Some(level) = &entry.level {
            if !levels.contains(level) {
                levels.push(level.clone());
            }
        }
        let Some(name) = &entry.service else { continue };
        let slot = *index.entry(name.clone()).or_insert_with(|| {
            services.push(LogService {
                name: name.clone(),
                technology: auto_map(name, None, catalog),
                endpoints: Vec::new(),
                traces: Vec::new(),
            });
            services.len() - 1
        });
        let service = &mut services[slot];
        if let Some(endpoint) = &entry.endpoint {
            if !service.endpoints.contains(endpoint) {
                service.endpoints.push(endpoint.clone());
            }
        }
        if let Some(trace_id) = &entry.trace_id {
            if !service.traces.contains(trace_id) {
                service.traces.push(trace_id.clone());
            }
        }
    }

    let timestamps: BTreeSet<&str> = entries.iter().filter_map(|e| e.timestamp.as_deref()).collect();
    let time_range = match (timestamps.first(), timestamps.last()) {
        (Some(start), Some(end)) => Some((start.to_string(), end.to_string())),
        _ => None,
    };

    let connections = trace_connections(&entries);
    debug!(
        lines = entries.len(),
        services = services.len(),
        connections = connections.len(),
        "Log import parsed"
    );
    ParsedLogs {
        services,
        connections,
        metadata: LogMetadata {
            total_logs: entries.len(),
            log_levels: levels,
            time_range,
        },
    }
}

/// Consecutive distinct services within each trace, de-duplicated
fn trace_connections(entries: &[LogEntry]) -> Vec<ImportConnection> {
    let mut trace_order: Vec<&str> = Vec::new();
    let mut by_trace: HashMap<&str, Vec<&str>> = HashMap::new();
    for entry in entries {
        let (Some(trace_id), Some(service)) = (entry.trace_id.as_deref(), entry.service.as_deref())
        else {
            continue;
        };
        let chain = by_trace.entry(trace_id).or_insert_with(|| {
            trace_order.push(trace_id);
            Vec::new()
        });
        if !chain.contains(&service) {
            chain.push(service);
        }
    }

    let mut connections: Vec<ImportConnection> = Vec::new();
    for trace_id in trace_order {
        let Some(chain) = by_trace.get(trace_id) else { continue };
        for pair in chain.windows(2) {
            let connection = ImportConnection::new(pair[0], pair[1]);
            if !connections.contains(&connection) {
                connections.push(connection);
            }
        }
    }
    connections
}
