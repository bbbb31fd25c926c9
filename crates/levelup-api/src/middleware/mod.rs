// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations for the API server.
//!
//! Applied outermost first:
//!
//! - [`AuthLayer`]: binds the bearer token's context into the request
//! - [`GateLayer`]: enforces the route policy on that context

mod auth;
mod gate;

pub use auth::{extract_bearer_token, AuthLayer, AuthMiddleware, BEARER_PREFIX};
pub use gate::{GateLayer, GateMiddleware};
