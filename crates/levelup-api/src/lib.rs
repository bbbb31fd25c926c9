// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # levelup-api
//!
//! HTTP security pipeline for the LevelUp game catalog.
//!
//! This crate provides the bearer token codec, login and account lifecycle
//! endpoints, the authorization cookie, and the route access gate that
//! every request passes before reaching a handler.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod cookie;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod policy;
pub mod response;
pub mod server;
pub mod state;

pub use auth::{AuthContext, AuthService, JwtConfig, JwtManager, PasswordPolicy};
pub use config::{ApiConfig, CorsConfig};
pub use error::{ApiError, ApiResult};
pub use policy::{RoutePattern, RoutePolicy, RouteRule};
pub use server::ApiServer;
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
