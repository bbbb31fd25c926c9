// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # levelup-bin
//!
//! CLI binary for the LevelUp catalog security service.
//!
//! - CLI argument parsing with clap
//! - Runtime wiring from the configuration file to the API server
//! - Graceful shutdown on SIGTERM, SIGINT and SIGQUIT
//! - Logging initialization
//!
//! ## Usage
//!
//! ```bash
//! # Start the service (default command)
//! levelup
//!
//! # Start with custom config and port
//! levelup -c /etc/levelup/levelup.yaml run --port 9000
//!
//! # Validate configuration
//! levelup validate --strict
//!
//! # Hash a seed user password
//! levelup hash-password 'admin12345'
//!
//! # Generate a signing secret
//! levelup gen-secret -o /etc/levelup/jwt.key
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{LevelupRuntime, RuntimeBuilder};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
