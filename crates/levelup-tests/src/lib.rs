// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # LevelUp Integration Tests
//!
//! End to end tests for login, token verification and the route gate,
//! plus configuration loading and runtime wiring.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Seed users, secrets and configuration documents
//!   - `harness`: An in-process router with seeded users
//!   - `assertions`: Response assertion helpers
//!   - `mocks`: Failing store and fast hasher
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p levelup-tests
//! cargo test -p levelup-tests --test integration_auth
//! cargo test -p levelup-tests --test integration_gate
//! cargo test -p levelup-tests --test integration_config
//! ```
//!
//! ## Using the Harness
//!
//! ```rust,ignore
//! use levelup_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new().await;
//!     let token = app.login(USER_EMAIL, USER_PASSWORD).await;
//!     app.get("/api/v1/auth/me", Some(&token)).await.assert_status(StatusCode::OK);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use axum::http::StatusCode;
}
