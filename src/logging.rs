use std::fs::File;
use std::path::PathBuf;

use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use thiserror::Error;


#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("`{value}` is not a log level")]
    InvalidLevel { value: String },

    #[error("couldn't create log file {}", path.display())]
    CreateFile { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// Where tree diagnostics go.
///
/// Rotations and fixup steps log at `trace`, no-op removals and bulk
/// construction at `debug`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub terminal: LevelFilter,
    pub file: Option<(PathBuf, LevelFilter)>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { terminal: LevelFilter::Warn, file: None }
    }
}

impl LogConfig {
    /// Reads `BSTREE_LOG` (terminal level) and `BSTREE_LOG_FILE` (path, logged at the same level or `Info`).
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError> {
        let mut config = Self::default();
        let level = lookup("BSTREE_LOG");
        if let Some(value) = &level {
            config.terminal = value.parse().map_err(|_| LoggingError::InvalidLevel { value: value.clone() })?;
        }
        if let Some(path) = lookup("BSTREE_LOG_FILE") {
            let file_level = if level.is_some() { config.terminal } else { LevelFilter::Info };
            config.file = Some((path.into(), file_level));
        }
        Ok(config)
    }

    fn loggers(&self) -> Result<Vec<Box<dyn SharedLogger>>, LoggingError> {
        let mut loggers: Vec<Box<dyn SharedLogger>> = vec![
            TermLogger::new(self.terminal, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        ];
        if let Some((path, level)) = &self.file {
            let file = File::create(path)
                .map_err(|source| LoggingError::CreateFile { path: path.clone(), source })?;
            loggers.push(WriteLogger::new(*level, Config::default(), file));
        }
        Ok(loggers)
    }
}

/// Installs the global logger. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    CombinedLogger::init(config.loggers()?)?;
    Ok(())
}
