// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! Subcommands:
//!
//! - `run`: Start the security service (default)
//! - `validate`: Validate the configuration file
//! - `version`: Show version information
//! - `hash-password`: Produce a bcrypt hash for a seed user
//! - `gen-secret`: Generate a base64 token signing secret

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// LevelUp - catalog security service
///
/// Issues signed tokens on login and gates every catalog route by role
/// and permission.
#[derive(Parser, Debug)]
#[command(
    name = "levelup",
    author = "Sylvex <contact@sylvex.io>",
    version = levelup_core::VERSION,
    about = "LevelUp catalog authentication and authorization service",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "levelup.yaml",
        env = "LEVELUP_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long, env = "LEVELUP_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json, compact). Overrides the config file.
    #[arg(long, env = "LEVELUP_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the LevelUp CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the security service
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration without starting the server.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,

    /// Hash a password with bcrypt
    ///
    /// The output can be pasted into `users[].password_hash`.
    #[command(name = "hash-password")]
    HashPassword(HashPasswordArgs),

    /// Generate a token signing secret
    ///
    /// Prints a base64 encoded random key for `security.jwt.secret`.
    #[command(name = "gen-secret")]
    GenSecret(GenSecretArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Listen port. Overrides `server.port`.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Skip creating the configured seed users
    #[arg(long)]
    pub no_seed: bool,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation (secrets redacted)
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `hash-password` command.
#[derive(Args, Debug, Clone)]
pub struct HashPasswordArgs {
    /// Password to hash
    #[arg(required_unless_present = "stdin")]
    pub password: Option<String>,

    /// Read the password from stdin
    #[arg(long)]
    pub stdin: bool,

    /// bcrypt cost factor
    #[arg(long, default_value = "10")]
    pub cost: u32,
}

/// Arguments for the `gen-secret` command.
#[derive(Args, Debug, Clone)]
pub struct GenSecretArgs {
    /// Key length in bytes
    #[arg(short, long, default_value = "64")]
    pub bytes: usize,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<levelup_config::LogFormat> for LogFormat {
    fn from(format: levelup_config::LogFormat) -> Self {
        match format {
            levelup_config::LogFormat::Text => LogFormat::Text,
            levelup_config::LogFormat::Compact => LogFormat::Compact,
            levelup_config::LogFormat::Json => LogFormat::Json,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Resolves the log level.
    ///
    /// `--quiet` and `--verbose` win, then `--log-level`, then the config
    /// file, then `info`.
    pub fn effective_log_level(&self, configured: Option<levelup_config::LogLevel>) -> String {
        if self.quiet {
            "warn".to_string()
        } else if self.verbose {
            "debug".to_string()
        } else if let Some(level) = &self.log_level {
            level.clone()
        } else {
            configured.unwrap_or_default().as_str().to_string()
        }
    }

    /// Resolves the log format: `--log-format`, then the config file.
    pub fn effective_log_format(&self, configured: Option<levelup_config::LogFormat>) -> LogFormat {
        self.log_format
            .or_else(|| configured.map(LogFormat::from))
            .unwrap_or_default()
    }
}

impl Default for ValidateArgs {
    fn default() -> Self {
        Self {
            show_config: false,
            format: OutputFormat::Text,
            strict: false,
        }
    }
}

impl Default for GenSecretArgs {
    fn default() -> Self {
        Self {
            bytes: 64,
            output: None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
