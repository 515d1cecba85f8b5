use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Traces the ray sources of the default optical bench and prints the segments.
#[derive(Parser, Debug)]
#[command(name = "lightpath")]
#[command(about = "Geometric ray propagation through mirrors, lenses and beam splitters")]
pub struct Args {
    /// JSON trace configuration; missing fields take their defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Overrides the maximum branch depth of the configuration
    #[arg(long)]
    pub max_depth: Option<usize>,

    #[arg(long, value_enum, default_value = "info", help = "Set the logging level")]
    pub log_level: LogLevel,
}
