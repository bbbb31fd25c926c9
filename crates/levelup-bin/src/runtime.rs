// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Turns a validated [`LevelupConfig`] into the pieces the API crate needs
//! (token manager, identity store, route table, audit logger), seeds the
//! configured users, then serves until a shutdown signal arrives.

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use levelup_api::auth::BcryptHasher;
use levelup_api::config::{CookieConfig, CorsConfig, SameSitePolicy};
use levelup_api::{ApiConfig, ApiServer, AppState, JwtConfig, PasswordPolicy, RoutePolicy, RouteRule};
use levelup_config::{
    load_config, AuditBackend, AuditConfig, JwtAlgorithm, LevelupConfig, RoutesConfig, SameSite,
    SeedUserConfig,
};
use levelup_core::{
    Access, AuditLog, AuditLogger, Identity, InMemoryAuditLogger, InMemoryIdentityStore,
    NoOpAuditLogger, TracingAuditLogger,
};

use crate::error::{BinError, BinResult};
use crate::shutdown::{ShutdownCoordinator, REQUESTED};

// =============================================================================
// LevelupRuntime
// =============================================================================

/// The service runtime.
pub struct LevelupRuntime {
    config: Arc<LevelupConfig>,
    shutdown: ShutdownCoordinator,
    seed: bool,
}

impl LevelupRuntime {
    /// Creates a runtime for an already validated configuration.
    pub fn new(config: LevelupConfig) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: ShutdownCoordinator::new(),
            seed: true,
        }
    }

    /// Enables or disables seeding the configured users.
    pub fn with_seed(mut self, enabled: bool) -> Self {
        self.seed = enabled;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LevelupConfig {
        &self.config
    }

    /// Returns a handle that can stop the runtime.
    pub fn shutdown_handle(&self) -> ShutdownCoordinator {
        self.shutdown.clone()
    }

    /// Builds the shared application state.
    pub fn build_state(&self) -> BinResult<AppState> {
        let config = &self.config;

        let state = AppState::builder()
            .config(api_config(config)?)
            .identity_store(Arc::new(InMemoryIdentityStore::new()))
            .password_hasher(Arc::new(BcryptHasher::new(config.security.password.bcrypt_cost)))
            .route_policy(Arc::new(route_policy(&config.security.routes)?))
            .audit_logger(audit_logger(&config.audit))
            .build()?;

        Ok(state)
    }

    /// Binds the configured address and serves until shutdown.
    pub async fn run(self) -> BinResult<()> {
        let addr = self.config.server.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| BinError::init(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener).await
    }

    /// Serves on an already bound listener until shutdown.
    pub async fn serve(self, listener: TcpListener) -> BinResult<()> {
        info!("Starting LevelUp security service v{}", levelup_core::VERSION);

        let state = self.build_state()?;
        let seeded = if self.seed {
            seed_users(&state, &self.config.users).await?
        } else {
            info!("Seeding disabled");
            0
        };

        let audit = state.audit().clone();
        let addr = listener.local_addr()?;
        self.log_startup(&audit, &state, addr, seeded).await;

        let signals = {
            let coordinator = self.shutdown.clone();
            tokio::spawn(async move { coordinator.wait_for_shutdown().await })
        };

        let grace = self.config.server.shutdown_timeout();
        let drain_deadline = {
            let signal = self.shutdown.shutdown_signal();
            async move {
                signal.await;
                tokio::time::sleep(grace).await;
            }
        };

        info!(%addr, "LevelUp is ready");

        let server = ApiServer::new(state).serve(listener, self.shutdown.shutdown_signal());
        let result = tokio::select! {
            result = server => result.map_err(BinError::from),
            _ = drain_deadline => {
                warn!(?grace, "Graceful shutdown timed out, dropping open connections");
                Ok(())
            }
        };

        // Releases the signal task if the server stopped on its own.
        self.shutdown.initiate_shutdown();
        let reason = match &result {
            Ok(()) => signals.await.unwrap_or(REQUESTED).to_string(),
            Err(e) => format!("server error: {}", e),
        };

        if let Err(e) = audit.log(AuditLog::system_shutdown(Some(reason))).await {
            warn!("Failed to log shutdown event: {}", e);
        }
        if let Err(e) = audit.flush().await {
            warn!("Failed to flush audit log: {}", e);
        }

        info!("LevelUp shutdown complete");
        result
    }

    async fn log_startup(
        &self,
        audit: &Arc<dyn AuditLogger>,
        state: &AppState,
        addr: std::net::SocketAddr,
        seeded: usize,
    ) {
        let entry = AuditLog::system_start(levelup_core::VERSION).with_details(serde_json::json!({
            "addr": addr.to_string(),
            "seeded_users": seeded,
            "route_rules": state.policy().rules().len(),
            "audit_backend": audit.name(),
        }));

        if let Err(e) = audit.log(entry).await {
            warn!("Failed to log startup event: {}", e);
        }
    }
}

// =============================================================================
// Configuration Mapping
// =============================================================================

/// Maps the file configuration onto the API server configuration.
pub fn api_config(config: &LevelupConfig) -> BinResult<ApiConfig> {
    let server = &config.server;
    let security = &config.security;

    let secret = security
        .jwt
        .secret
        .as_ref()
        .map(|s| s.expose().to_string())
        .ok_or_else(|| BinError::config("security.jwt.secret is required"))?;

    let algorithm = match security.jwt.algorithm {
        JwtAlgorithm::HS256 => jsonwebtoken::Algorithm::HS256,
        JwtAlgorithm::HS384 => jsonwebtoken::Algorithm::HS384,
        JwtAlgorithm::HS512 => jsonwebtoken::Algorithm::HS512,
    };

    let same_site = match security.cookie.same_site {
        SameSite::Strict => SameSitePolicy::Strict,
        SameSite::Lax => SameSitePolicy::Lax,
        SameSite::None => SameSitePolicy::None,
    };

    Ok(ApiConfig {
        host: server.host,
        port: server.port,
        cors: CorsConfig {
            allowed_origins: server.cors.allowed_origins.clone(),
            allowed_methods: server.cors.allowed_methods.clone(),
            allowed_headers: server.cors.allowed_headers.clone(),
            allow_credentials: server.cors.allow_credentials,
            max_age: server.cors.max_age_secs,
        },
        jwt: JwtConfig::new(secret)
            .with_expiration_secs(security.jwt.expiration_secs)
            .with_algorithm(algorithm)
            .with_leeway(security.jwt.leeway_secs),
        cookie: CookieConfig {
            enabled: security.cookie.enabled,
            name: security.cookie.name.clone(),
            path: security.cookie.path.clone(),
            domain: security.cookie.domain.clone(),
            http_only: security.cookie.http_only,
            secure: security.cookie.secure,
            same_site,
        },
        password: PasswordPolicy {
            min_length: security.password.min_length,
            max_length: security.password.max_length,
        },
        request_timeout: server.request_timeout(),
    })
}

/// Builds the route table. Configured rules come first, then the catalog
/// rules when `include_catalog` is set.
pub fn route_policy(routes: &RoutesConfig) -> BinResult<RoutePolicy> {
    let default_access = Access::parse(&routes.default_access)
        .map_err(|e| BinError::config(format!("security.routes.default_access: {}", e)))?;

    let mut policy = RoutePolicy::new().with_default_access(default_access);

    for (index, rule) in routes.rules.iter().enumerate() {
        let rule = RouteRule::from_parts(&rule.pattern, &rule.methods, &rule.access)
            .map_err(|e| BinError::config(format!("security.routes.rules[{}]: {}", index, e)))?;
        policy = policy.with_rule(rule);
    }

    if routes.include_catalog {
        for rule in RoutePolicy::catalog().rules() {
            policy = policy.with_rule(rule.clone());
        }
    }

    Ok(policy)
}

/// Creates the audit logger for the configured backend.
pub fn audit_logger(config: &AuditConfig) -> Arc<dyn AuditLogger> {
    if !config.enabled {
        info!("Audit logging disabled");
        return Arc::new(NoOpAuditLogger::new());
    }

    match config.backend {
        AuditBackend::Tracing => Arc::new(TracingAuditLogger::new()),
        AuditBackend::Memory => Arc::new(InMemoryAuditLogger::with_capacity(config.memory_capacity)),
    }
}

/// Creates the configured users that are not in the store yet.
///
/// Returns the number of identities created.
pub async fn seed_users(state: &AppState, users: &[SeedUserConfig]) -> BinResult<usize> {
    let store = state.store();
    let hasher = state.auth().hasher();
    let mut created = 0;

    for user in users {
        let subject = user.subject.trim();

        if store.exists_by_subject(subject).await? {
            debug!(subject, "Seed user already present");
            continue;
        }

        let password_hash = match (&user.password_hash, &user.password) {
            (Some(hash), _) => hash.expose().to_string(),
            (None, Some(password)) => hasher.hash(password.expose()).await.map_err(|e| {
                BinError::init(format!("Failed to hash password for '{}': {}", subject, e))
            })?,
            (None, None) => {
                return Err(BinError::config(format!(
                    "Seed user '{}' has no password or password_hash",
                    subject
                )));
            }
        };

        let roles = user
            .parsed_roles()
            .map_err(|name| BinError::config(format!("Seed user '{}': unknown role '{}'", subject, name)))?;

        let identity = Identity::active(subject, password_hash, roles).with_enabled(user.enabled);
        if store.create(identity).await? {
            created += 1;
        } else {
            debug!(subject, "Seed user registered concurrently");
        }
    }

    if created > 0 {
        info!(created, "Seeded users");
    }

    Ok(created)
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the service runtime.
pub struct RuntimeBuilder {
    config_path: Option<std::path::PathBuf>,
    config: Option<LevelupConfig>,
    port: Option<u16>,
    seed: bool,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_path: None,
            config: None,
            port: None,
            seed: true,
        }
    }

    /// Sets the configuration file path.
    pub fn config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the configuration directly.
    pub fn config(mut self, config: LevelupConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the listen port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Enables or disables seeding.
    pub fn seed(mut self, enabled: bool) -> Self {
        self.seed = enabled;
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> BinResult<LevelupRuntime> {
        let mut config = match self.config {
            Some(cfg) => cfg,
            None => {
                let path = self
                    .config_path
                    .ok_or_else(|| BinError::config("No configuration provided"))?;

                load_config(&path).map_err(|e| {
                    BinError::from(e).with_context(format!("Failed to load {}", path.display()))
                })?
            }
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        config.validate()?;

        Ok(LevelupRuntime::new(config).with_seed(self.seed))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
