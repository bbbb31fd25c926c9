// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers for all endpoints.
//!
//! - [`health`]: Health check endpoints
//! - [`auth`]: Login, registration and the caller's own account
//! - [`admin`]: Identity administration

mod admin;
mod auth;
mod health;

pub use admin::*;
pub use auth::*;
pub use health::*;
