// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Prints version information for every crate.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("LevelUp - catalog security service");
    println!();
    println!("Version Information:");
    println!("  levelup-bin:    {}", env!("CARGO_PKG_VERSION"));
    println!("  levelup-core:   {}", levelup_core::VERSION);
    println!("  levelup-api:    {}", levelup_api::VERSION);
    println!("  levelup-config: {}", levelup_config::VERSION);
    println!();
    println!("Build Information:");
    println!("  Rust Edition: 2024");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
