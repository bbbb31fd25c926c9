// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Command failures and their process exit codes.
//!
//! | Code | Meaning                                   |
//! |------|-------------------------------------------|
//! | 1    | Bad configuration or command-line input   |
//! | 2    | Startup failed (bind, logging, seeding)   |
//! | 3    | The server or a command failed at runtime |
//! | 4    | Reading stdin or writing a file failed    |

use std::path::PathBuf;

use thiserror::Error;

pub type BinResult<T> = Result<T, BinError>;

#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration file failed to load or validate.
    #[error(transparent)]
    Config(#[from] levelup_config::ConfigError),

    /// Input that is invalid regardless of the file, e.g. a missing
    /// argument or an unknown seed role.
    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Startup failed: {0}")]
    Startup(String),

    /// Seeding users could not reach the identity store.
    #[error("Identity store: {0}")]
    Store(#[from] levelup_core::StoreError),

    #[error("Server error: {0}")]
    Server(#[from] levelup_api::ApiError),

    #[error("{0}")]
    Runtime(String),

    #[error("Cannot read standard input: {0}")]
    Stdin(#[from] std::io::Error),

    #[error("Cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Wraps another failure with what was being attempted.
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn init(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Exit code for this failure; wrapped errors keep their own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Invalid(_) => 1,
            Self::Startup(_) | Self::Store(_) => 2,
            Self::Server(_) | Self::Runtime(_) => 3,
            Self::Stdin(_) | Self::Write { .. } => 4,
            Self::Context { source, .. } => source.exit_code(),
        }
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Prints the error and its cause chain on stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================
