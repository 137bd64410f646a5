//! Configuration management for p2pboot
//!
//! Handles CLI argument parsing, config file loading, and defaults.

use crate::native::LibraryLocation;
use crate::request::SEPARATOR;
use crate::variant::Variant;
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the directory searched for native libraries
pub const LIBRARY_DIR_ENV: &str = "P2PBOOT_LIBRARY_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Cli(#[from] clap::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Parser, Debug)]
#[command(name = "p2pboot")]
#[command(about = "Launch a native libp2p daemon or client library", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML config file; explicit flags take precedence over it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Explicit path of the shared library to load
    #[arg(long)]
    library: Option<PathBuf>,

    /// Directory holding the shared library
    #[arg(long, env = LIBRARY_DIR_ENV)]
    library_dir: Option<PathBuf>,

    /// Logical library name, also used as the launch identifier
    #[arg(long)]
    library_name: Option<String>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Call the start entry point on the main thread and skip Ctrl+C handling
    #[arg(long)]
    no_supervise: bool,

    /// Seconds to wait for the native start call to return after stop
    #[arg(long)]
    shutdown_grace_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// libp2pd: startDaemon(launch string) / stopDaemon()
    Daemon(ForwardArgs),
    /// libp2pc: startClient(launch string)
    Client(ForwardArgs),
    /// libp2pd: startDaemon() / stopDaemon(), arguments are dropped
    LegacyDaemon(ForwardArgs),
    /// libp2pd: startD() / stopD(), arguments are dropped
    CompactDaemon(ForwardArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ForwardArgs {
    /// Arguments forwarded verbatim to the native library
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Commands {
    fn into_parts(self) -> (Variant, Vec<String>) {
        match self {
            Commands::Daemon(f) => (Variant::Daemon, f.args),
            Commands::Client(f) => (Variant::Client, f.args),
            Commands::LegacyDaemon(f) => (Variant::LegacyDaemon, f.args),
            Commands::CompactDaemon(f) => (Variant::CompactDaemon, f.args),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub variant: Variant,
    pub library_name: Option<String>,
    pub library_dir: Option<PathBuf>,
    pub library_path: Option<PathBuf>,
    pub log_level: String,
    pub supervise: bool,
    pub shutdown_grace_secs: u64,
    pub args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            variant: Variant::Daemon,
            library_name: None,
            library_dir: None,
            library_path: None,
            log_level: "info".to_string(),
            supervise: true,
            shutdown_grace_secs: 5,
            args: Vec::new(),
        }
    }
}

impl Config {
    /// Create config from the process's CLI arguments
    ///
    /// Usage errors print clap's message and exit.
    pub fn from_cli() -> Result<Self, ConfigError> {
        Self::from_parsed(Cli::parse())
    }

    /// Create config from an explicit argument list (first item is the program name)
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::from_parsed(Cli::try_parse_from(args)?)
    }

    fn from_parsed(cli: Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::default(),
        };

        if let Some(command) = cli.command {
            let (variant, args) = command.into_parts();
            config.variant = variant;
            config.args = args;
        }
        // A location given on the command line replaces the file's location
        // as a whole, since an explicit path always beats a directory.
        match (cli.library, cli.library_dir) {
            (None, None) => {}
            (path, dir) => {
                config.library_path = path;
                config.library_dir = dir;
            }
        }
        if cli.library_name.is_some() {
            config.library_name = cli.library_name;
        }
        if let Some(level) = cli.log_level {
            config.log_level = level;
        }
        if cli.no_supervise {
            config.supervise = false;
        }
        if let Some(secs) = cli.shutdown_grace_secs {
            config.shutdown_grace_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load config from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.library_name {
            if name.is_empty() {
                return Err(ConfigError::Invalid("library name must not be empty".into()));
            }
            if name.contains(SEPARATOR) {
                return Err(ConfigError::Invalid(format!(
                    "library name {name:?} must not contain '{SEPARATOR}'"
                )));
            }
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log level must not be empty".into()));
        }
        Ok(())
    }

    /// First field of the launch string and logical library name
    pub fn identifier(&self) -> &str {
        self.library_name
            .as_deref()
            .unwrap_or_else(|| self.variant.identifier())
    }

    pub fn library_location(&self) -> LibraryLocation {
        LibraryLocation::select(
            self.library_path.as_deref(),
            self.library_dir.as_deref(),
            self.identifier(),
        )
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
