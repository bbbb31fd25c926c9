// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.

mod gen_secret;
mod hash_password;
mod run;
mod validate;
mod version;

pub use gen_secret::{gen_secret, generate_secret};
pub use hash_password::hash_password;
pub use run::run;
pub use validate::{validate, ValidationReport};
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Run(args) => run::run(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
        Commands::HashPassword(args) => hash_password::hash_password(&cli, args).await,
        Commands::GenSecret(args) => gen_secret::gen_secret(&cli, args),
    }
}
