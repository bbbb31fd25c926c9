// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use std::path::Path;

use serde_json::Value;

use levelup_config::{AuditBackend, LevelupConfig};
use levelup_core::Role;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Keys whose values never leave the process.
const SECRET_KEYS: &[&str] = &["secret", "password", "password_hash"];

/// Executes the `validate` command.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::config(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = levelup_config::load_config(config_path)
        .map_err(|e| BinError::from(e).with_context("Configuration validation failed"))?;

    let report = ValidationReport::new(config_path, &config);
    let shown = if args.show_config {
        Some(redacted(&config)?)
    } else {
        None
    };

    match args.format {
        OutputFormat::Text => report.print_text(shown.as_ref())?,
        OutputFormat::Json => {
            let mut output = report.to_json();
            if let Some(shown) = shown {
                output["config"] = shown;
            }
            println!("{}", to_pretty(&output)?);
        }
    }

    if args.strict && !report.warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            report.warnings.len()
        )));
    }

    Ok(())
}

// =============================================================================
// ValidationReport
// =============================================================================

/// Summary and warnings for a configuration that passed validation.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Checked file.
    pub config_path: String,
    /// Listen address.
    pub addr: String,
    /// Configured route rules.
    pub route_rules: usize,
    /// Whether catalog rules are appended.
    pub include_catalog: bool,
    /// Seed user count.
    pub seed_users: usize,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Builds the report for a validated configuration.
    pub fn new(path: &Path, config: &LevelupConfig) -> Self {
        Self {
            config_path: path.display().to_string(),
            addr: config.server.socket_addr().to_string(),
            route_rules: config.security.routes.rules.len(),
            include_catalog: config.security.routes.include_catalog,
            seed_users: config.users.len(),
            warnings: warnings(config),
        }
    }

    fn to_json(&self) -> Value {
        serde_json::json!({
            "valid": true,
            "config_path": self.config_path,
            "summary": {
                "addr": self.addr,
                "route_rules": self.route_rules,
                "include_catalog": self.include_catalog,
                "seed_users": self.seed_users,
            },
            "warnings": self.warnings,
        })
    }

    fn print_text(&self, shown: Option<&Value>) -> BinResult<()> {
        println!("Configuration is valid: {}", self.config_path);
        println!();
        println!("Summary:");
        println!("  Listen:       {}", self.addr);
        println!("  Route rules:  {}", self.route_rules);
        println!("  Catalog:      {}", if self.include_catalog { "included" } else { "excluded" });
        println!("  Seed users:   {}", self.seed_users);

        if !self.warnings.is_empty() {
            println!();
            println!("Warnings:");
            for warning in &self.warnings {
                println!("  ! {}", warning);
            }
        }

        if let Some(shown) = shown {
            println!();
            println!("Parsed configuration:");
            println!("{}", to_pretty(shown)?);
        }

        Ok(())
    }
}

fn warnings(config: &LevelupConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let security = &config.security;

    if security.cookie.enabled && !security.cookie.secure {
        warnings.push("Authorization cookie is sent without the Secure flag".to_string());
    }

    if !config.audit.enabled {
        warnings.push("Audit trail is disabled".to_string());
    } else if config.audit.backend == AuditBackend::Memory {
        warnings.push("Audit entries are kept in memory only".to_string());
    }

    if !security.routes.include_catalog && security.routes.rules.is_empty() {
        warnings.push("No route rules: every route falls back to the default access".to_string());
    }

    let plain: Vec<&str> = config
        .users
        .iter()
        .filter(|u| u.password.is_some())
        .map(|u| u.subject.as_str())
        .collect();
    if !plain.is_empty() {
        warnings.push(format!(
            "Seed users with plain text passwords: {}",
            plain.join(", ")
        ));
    }

    let has_admin = config.users.iter().any(|u| {
        u.enabled && u.parsed_roles().is_ok_and(|roles| roles.contains(&Role::Admin))
    });
    if !has_admin {
        warnings.push("No enabled ADMIN seed user".to_string());
    }

    warnings
}

/// Serializes the configuration with secrets masked.
fn redacted(config: &LevelupConfig) -> BinResult<Value> {
    let mut value = serde_json::to_value(config)
        .map_err(|e| BinError::runtime(format!("Failed to serialize configuration: {}", e)))?;
    mask(&mut value);
    Ok(value)
}

fn mask(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if SECRET_KEYS.contains(&key.as_str()) && !entry.is_null() {
                    *entry = Value::String("***".to_string());
                } else {
                    mask(entry);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask),
        _ => {}
    }
}

fn to_pretty(value: &Value) -> BinResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| BinError::runtime(format!("Failed to render output: {}", e)))
}

// =============================================================================
// Tests
// =============================================================================
