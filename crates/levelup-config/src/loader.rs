// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading for LevelUp.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and resolve `${VAR}` / `${VAR:default}` placeholders
//! 2. Parse YAML, TOML or JSON, chosen by file extension
//! 3. Apply `LEVELUP_*` environment overrides
//! 4. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! LEVELUP_SERVER_HOST=127.0.0.1
//! LEVELUP_SERVER_PORT=9090
//! LEVELUP_JWT_SECRET=<base64>
//! LEVELUP_JWT_EXPIRATION_SECS=36000
//! LEVELUP_COOKIE_SECURE=true
//! LEVELUP_LOG_LEVEL=debug
//! LEVELUP_LOG_FORMAT=json
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LevelupConfig, LogFormat, LogLevel, SecretValue};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "LEVELUP";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for LevelUp.
///
/// # Examples
///
/// ```no_run
/// use levelup_config::loader::ConfigLoader;
///
/// let loader = ConfigLoader::new();
/// let config = loader.load("levelup.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve placeholders and apply overrides.
    resolve_env_vars: bool,

    /// Variables to use instead of the process environment.
    vars: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
            vars: None,
        }
    }

    /// Creates a builder for configuring the loader.
    pub fn builder() -> ConfigLoaderBuilder {
        ConfigLoaderBuilder::new()
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Reads variables from the given map instead of the process environment.
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = Some(vars);
        self
    }

    /// Loads configuration from a file.
    ///
    /// The file format is determined by the file extension:
    /// - `.yaml` or `.yml` - YAML format
    /// - `.toml` - TOML format
    /// - `.json` - JSON format
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<LevelupConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content = self.read_file(path)?;
        let format = ConfigFormat::from_path(path)?;

        let config = self.process(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })?;

        info!("Configuration loaded successfully");
        debug!(
            port = config.server.port,
            rules = config.security.routes.rules.len(),
            users = config.users.len(),
            "Configuration summary"
        );

        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<LevelupConfig> {
        self.process(content, format)
    }

    fn process(&self, content: &str, format: ConfigFormat) -> ConfigResult<LevelupConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        let mut config: LevelupConfig = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reads file content.
    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    fn var(&self, name: &str) -> Option<String> {
        match &self.vars {
            Some(vars) => vars.get(name).cloned(),
            None => env::var(name).ok(),
        }
    }

    /// Resolves environment variable placeholders in content.
    ///
    /// Supports the format: `${VAR_NAME}` or `${VAR_NAME:default}`
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut chars = content.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' || chars.peek() != Some(&'{') {
                result.push(c);
                continue;
            }
            chars.next();

            let mut var_content = String::new();
            let mut found_close = false;
            for c in chars.by_ref() {
                if c == '}' {
                    found_close = true;
                    break;
                }
                var_content.push(c);
            }

            if !found_close {
                result.push_str("${");
                result.push_str(&var_content);
                continue;
            }

            let (var_name, default_value) = match var_content.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_content.as_str(), None),
            };

            match (self.var(var_name), default_value) {
                (Some(value), _) => result.push_str(&value),
                (None, Some(default)) => result.push_str(default),
                (None, None) => {
                    warn!("Environment variable '{}' not found", var_name);
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        }

        result
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&self, config: &mut LevelupConfig) -> ConfigResult<()> {
        let name = |suffix: &str| format!("{}_{}", self.env_prefix, suffix);

        if let Some(value) = self.var(&name("SERVER_HOST")) {
            config.server.host = value.parse().map_err(|_| {
                ConfigError::invalid_env_var(name("SERVER_HOST"), "expected an IP address")
            })?;
        }
        if let Some(value) = self.var(&name("SERVER_PORT")) {
            config.server.port = value.parse().map_err(|_| {
                ConfigError::invalid_env_var(name("SERVER_PORT"), "expected valid port number")
            })?;
        }

        if let Some(value) = self.var(&name("JWT_SECRET")) {
            config.security.jwt.secret = Some(SecretValue::new(value));
        }
        if let Some(value) = self.var(&name("JWT_EXPIRATION_SECS")) {
            config.security.jwt.expiration_secs = value.parse().map_err(|_| {
                ConfigError::invalid_env_var(name("JWT_EXPIRATION_SECS"), "expected valid number")
            })?;
        }

        if let Some(value) = self.var(&name("COOKIE_SECURE")) {
            config.security.cookie.secure = parse_bool(&value);
        }

        if let Some(value) = self.var(&name("LOG_LEVEL")) {
            config.logging.level = LogLevel::parse(&value).ok_or_else(|| {
                ConfigError::invalid_env_var(name("LOG_LEVEL"), "expected trace, debug, info, warn or error")
            })?;
        }
        if let Some(value) = self.var(&name("LOG_FORMAT")) {
            config.logging.format = LogFormat::parse(&value).ok_or_else(|| {
                ConfigError::invalid_env_var(name("LOG_FORMAT"), "expected text, compact or json")
            })?;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigLoaderBuilder
// =============================================================================

/// Builder for ConfigLoader.
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    env_prefix: Option<String>,
    resolve_env_vars: Option<bool>,
    vars: Option<HashMap<String, String>>,
}

impl ConfigLoaderBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environment prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn resolve_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = Some(enabled);
        self
    }

    /// Sets a variable in place of the process environment.
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Builds the ConfigLoader.
    pub fn build(self) -> ConfigLoader {
        let mut loader = ConfigLoader::new();

        if let Some(prefix) = self.env_prefix {
            loader.env_prefix = prefix;
        }
        if let Some(resolve_env_vars) = self.resolve_env_vars {
            loader.resolve_env_vars = resolve_env_vars;
        }
        loader.vars = self.vars;

        loader
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parses a string based on format.
fn parse_str<T: DeserializeOwned>(content: &str, format: ConfigFormat) -> ConfigResult<T> {
    match format {
        ConfigFormat::Yaml => parse_yaml(content),
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

/// YAML parsing through the config crate.
fn parse_yaml<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(content, config::FileFormat::Yaml))
        .build()
        .map_err(|e| ConfigError::serialization(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::serialization(e.to_string()))
}

/// Parses a string to bool.
fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "enabled"
    )
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<LevelupConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<LevelupConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::JwtAlgorithm;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SECRET: &str = "bGV2ZWx1cC10ZXN0LXNlY3JldC1rZXktdGhhdC1pcy1sb25nLWVub3VnaA==";

    fn test_yaml() -> String {
        format!(
            r#"
server:
  port: 9090

security:
  jwt:
    secret: "{SECRET}"
    expiration_secs: 36000
    algorithm: HS512
  routes:
    rules:
      - pattern: /api/v1/games/**
        methods: [GET]
        access: permitAll

users:
  - subject: user@user.com
    password: user12345
    roles: [USER]
"#
        )
    }

    fn isolated() -> ConfigLoader {
        ConfigLoader::new().with_vars(HashMap::new())
    }

    #[test]
    fn test_load_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(test_yaml().as_bytes()).unwrap();

        let config = isolated().load(file.path()).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.security.jwt.expiration_secs, 36000);
        assert_eq!(config.security.jwt.algorithm, JwtAlgorithm::HS512);
        assert_eq!(config.security.routes.rules.len(), 1);
        assert_eq!(config.security.routes.rules[0].methods, vec!["GET"]);
        assert_eq!(config.users[0].subject, "user@user.com");
    }

    #[test]
    fn test_load_toml() {
        let toml = format!(
            r#"
[server]
port = 7070

[security.jwt]
secret = "{SECRET}"
"#
        );
        let config = isolated().load_from_str(&toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.server.port, 7070);
    }

    #[test]
    fn test_load_json() {
        let json = format!(r#"{{"security": {{"jwt": {{"secret": "{SECRET}"}}}}}}"#);
        let config = isolated().load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = format!(r#"{{"security": {{"jwt": {{"secret": "{SECRET}", "issuer": "x"}}}}}}"#);
        assert!(isolated().load_from_str(&json, ConfigFormat::Json).is_err());
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("levelup.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("levelup.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("levelup.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("levelup.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("levelup.ini")).is_err());
    }

    #[test]
    fn test_env_placeholder_resolution() {
        let loader = ConfigLoader::builder().var("JWT_KEY", SECRET).build();

        assert_eq!(
            loader.resolve_env_placeholders("secret: ${JWT_KEY}"),
            format!("secret: {}", SECRET)
        );
        assert_eq!(
            loader.resolve_env_placeholders("port: ${MISSING_PORT:8081}"),
            "port: 8081"
        );
        assert_eq!(loader.resolve_env_placeholders("x: ${MISSING}"), "x: ${MISSING}");
        assert_eq!(loader.resolve_env_placeholders("x: ${OPEN"), "x: ${OPEN");
    }

    #[test]
    fn test_secret_from_placeholder() {
        let yaml = "security:\n  jwt:\n    secret: \"${LEVELUP_TEST_SECRET}\"\n";
        let config = ConfigLoader::builder()
            .var("LEVELUP_TEST_SECRET", SECRET)
            .build()
            .load_from_str(yaml, ConfigFormat::Yaml)
            .unwrap();
        assert_eq!(config.security.jwt.secret.unwrap().expose(), SECRET);
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::builder()
            .var("LEVELUP_JWT_SECRET", SECRET)
            .var("LEVELUP_SERVER_PORT", "9191")
            .var("LEVELUP_JWT_EXPIRATION_SECS", "600")
            .var("LEVELUP_COOKIE_SECURE", "yes")
            .var("LEVELUP_LOG_LEVEL", "debug")
            .var("LEVELUP_LOG_FORMAT", "json")
            .build()
            .load_from_str("{}", ConfigFormat::Json)
            .unwrap();

        assert_eq!(config.server.port, 9191);
        assert_eq!(config.security.jwt.expiration_secs, 600);
        assert!(config.security.cookie.secure);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_env_override() {
        let result = ConfigLoader::builder()
            .var("LEVELUP_JWT_SECRET", SECRET)
            .var("LEVELUP_SERVER_PORT", "eighty")
            .build()
            .load_from_str("{}", ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn test_env_disabled_skips_overrides() {
        let loader = ConfigLoader::builder()
            .var("LEVELUP_JWT_SECRET", SECRET)
            .resolve_env_vars(false)
            .build();
        assert!(loader.load_from_str("{}", ConfigFormat::Json).is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool("on"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
    }

    #[test]
    fn test_file_not_found() {
        let result = isolated().load("/nonexistent/path/levelup.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_parse_error_carries_path() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(b"{ not json").unwrap();

        let result = isolated().load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
