//! Command-line interface for the archcanvas utility
//!
//! Imports JSON records or service logs into a diagram, lays it out and
//! prints nodes, routed connections or the technology catalog.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::colorizer::{catalog_table, route_table};
use archcanvas::core::logging::init_logging;
use archcanvas::editor::Editor;
use archcanvas::import::{detect_format, parse_input, InputFormat};
use archcanvas::layout::LayoutKind;
use archcanvas::TechnologyCatalog;

/// ArchCanvas - lay out and route infrastructure diagrams
#[derive(Parser)]
#[command(name = "archcanvas")]
#[command(about = "Import, lay out and route infrastructure diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a JSON record or service logs and print the editor snapshot
    Import {
        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the snapshot JSON (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Input format; detected when omitted
        #[arg(short, long, value_enum)]
        format: Option<FormatChoice>,

        /// Layout for nodes without positions
        #[arg(short, long, value_enum)]
        layout: Option<LayoutChoice>,

        /// Print the normalized import record instead of the snapshot
        #[arg(long)]
        record: bool,
    },

    /// Re-layout every node of an import and print the positioned record
    Layout {
        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Layout algorithm
        #[arg(short, long, value_enum, default_value_t = LayoutChoice::Hierarchy)]
        algorithm: LayoutChoice,
    },

    /// Print routed connection paths for an import
    Route {
        /// Input file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Detect the format of an import payload
    Detect {
        /// Input file to analyze (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List the technology catalog
    Catalog {
        /// Only list one category
        #[arg(long)]
        category: Option<String>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,

        /// When to use colors in output
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },

    /// Validate an import payload without applying it
    Validate {
        /// Input file to validate (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// Import formats accepted on the command line
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum FormatChoice {
    Json,
    Logs,
}

impl From<FormatChoice> for InputFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Json => InputFormat::Json,
            FormatChoice::Logs => InputFormat::Logs,
        }
    }
}

/// Layout algorithms accepted on the command line
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum LayoutChoice {
    #[default]
    Hierarchy,
    Circular,
    Grid,
}

impl From<LayoutChoice> for LayoutKind {
    fn from(value: LayoutChoice) -> Self {
        match value {
            LayoutChoice::Hierarchy => LayoutKind::Hierarchy,
            LayoutChoice::Circular => LayoutKind::Circular,
            LayoutChoice::Grid => LayoutKind::Grid,
        }
    }
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if output is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Main CLI application
pub struct ArchCanvasApp {
    catalog: TechnologyCatalog,
}

impl ArchCanvasApp {
    pub fn new() -> Self {
        Self::with_catalog(TechnologyCatalog::builtin())
    }

    pub fn with_catalog(catalog: TechnologyCatalog) -> Self {
        Self { catalog }
    }

    fn editor(&self) -> Editor {
        Editor::new().with_catalog(self.catalog.clone())
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("ARCHCANVAS_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("ARCHCANVAS_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("ArchCanvas v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Import {
                input,
                output,
                format,
                layout,
                record,
            } => {
                let content = self.read_input(input)?;
                let rendered = self.import_command(
                    &content,
                    format.map(Into::into),
                    layout.map(Into::into),
                    record,
                    cli.verbose,
                )?;
                self.write_output(output, &rendered)
            }
            Commands::Layout {
                input,
                output,
                algorithm,
            } => {
                let content = self.read_input(input)?;
                let rendered = self.layout_command(&content, algorithm.into())?;
                self.write_output(output, &rendered)
            }
            Commands::Route { input, json } => {
                let content = self.read_input(input)?;
                let rendered = self.route_command(&content, json)?;
                self.write_output(None, &rendered)
            }
            Commands::Detect { input } => {
                let content = self.read_input(input)?;
                println!("{}", detect_format(&content));
                Ok(())
            }
            Commands::Catalog {
                category,
                json,
                color,
            } => {
                let rendered =
                    self.catalog_command(category.as_deref(), json, self.should_colorize(color))?;
                self.write_output(None, &rendered)
            }
            Commands::Validate { input } => {
                let content = self.read_input(input)?;
                self.validate_command(&content, cli.verbose)
            }
        }
    }

    /// Import and return the snapshot (or the normalized record) as JSON
    pub fn import_command(
        &self,
        content: &str,
        format: Option<InputFormat>,
        layout: Option<LayoutKind>,
        record_only: bool,
        verbose: bool,
    ) -> Result<String> {
        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }
        debug!(bytes = content.len(), format = ?format, layout = ?layout, "Import command");
        let mut editor = self.editor();
        let summary = editor.import_text(content, format, layout)?;
        if verbose {
            eprintln!(
                "Imported {} nodes and {} connections",
                summary.node_ids.len(),
                summary.connection_ids.len()
            );
        }
        if record_only {
            return Ok(editor.export().to_json()?);
        }
        Ok(serde_json::to_string_pretty(&editor.snapshot())?)
    }

    /// Import, re-layout every node and return the positioned record
    pub fn layout_command(&self, content: &str, algorithm: LayoutKind) -> Result<String> {
        let mut editor = self.editor();
        editor.import_text(content, None, Some(algorithm))?;
        let moved = editor.apply_layout(algorithm, None)?;
        info!(layout = %algorithm, moved, "Layout applied");
        Ok(editor.export().to_json()?)
    }

    /// Import and list routed connections
    pub fn route_command(&self, content: &str, json: bool) -> Result<String> {
        let mut editor = self.editor();
        editor.import_text(content, None, None)?;
        let routes = editor.routes();
        if json {
            return Ok(serde_json::to_string_pretty(&routes)?);
        }
        Ok(route_table(&routes))
    }

    /// List catalog entries, optionally one category only
    pub fn catalog_command(&self, category: Option<&str>, json: bool, color: bool) -> Result<String> {
        let entries: Vec<_> = match category {
            Some(category) => self.catalog.by_category(category).cloned().collect(),
            None => self.catalog.iter().cloned().collect(),
        };
        if entries.is_empty() {
            return Err(anyhow!("No technologies in category '{}'", category.unwrap_or("")));
        }
        if json {
            return Ok(serde_json::to_string_pretty(&entries)?);
        }
        Ok(catalog_table(&entries, color))
    }

    /// Parse without applying; errors describe the first problem found
    pub fn validate_command(&self, content: &str, verbose: bool) -> Result<()> {
        let format = detect_format(content);
        if verbose {
            eprintln!("Detected format: {}", format);
        }
        match parse_input(content, Some(format), &self.catalog) {
            Ok(record) => {
                println!(
                    "✓ Valid {} import ({} nodes, {} connections)",
                    format,
                    record.nodes.len(),
                    record.connections.len()
                );
                Ok(())
            }
            Err(e) => {
                println!("✗ Invalid {} import: {}", format, e);
                Err(e.into())
            }
        }
    }

    /// Determine if we should colorize terminal output
    fn should_colorize(&self, color: ColorChoice) -> bool {
        match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                if std::env::var("NO_COLOR").is_ok() {
                    return false;
                }
                crossterm::tty::IsTty::is_tty(&std::io::stdout())
            }
        }
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                if content.is_empty() || content.ends_with('\n') {
                    print!("{}", content);
                } else {
                    println!("{}", content);
                }
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for ArchCanvasApp {
    fn default() -> Self {
        Self::new()
    }
}
