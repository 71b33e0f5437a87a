//! Platform logging initialization for the groupcast binary.
//!
//! The default destination is a log file in the state directory, so log lines
//! do not interleave with the terminal UI.

use std::fs::File;
use std::path::Path;

use clap::ValueEnum;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// File name of the log inside the state directory.
pub const LOG_FILENAME: &str = "groupcast.log";

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogDestination {
    /// Write to the log file only.
    File,
    /// Write to the terminal (stderr for warnings and errors).
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initialize the logger. A log file that cannot be created only costs the
/// file logger; the rest still initializes.
pub fn initialize(destination: LogDestination, log_path: &Path) {
    let level = LevelFilter::Info;
    let config = build_config();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if matches!(destination, LogDestination::Terminal | LogDestination::Both) {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if matches!(destination, LogDestination::File | LogDestination::Both) {
        if let Some(file_logger) = create_file_logger(level, config, log_path) {
            loggers.push(file_logger);
        }
    }
    if loggers.is_empty() {
        return;
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    log_path: &Path,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
