// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Response Assertions
//!
//! Failure messages include the body so a wrong status is diagnosable
//! without rerunning.

use axum::http::StatusCode;
use levelup_api::JwtManager;

use super::harness::TestResponse;

impl TestResponse {
    /// Asserts the status code.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected {}, got {} with body: {}",
            expected, self.status, self.text
        );
        self
    }

    /// Asserts an error response with the given status and `error.code`.
    #[track_caller]
    pub fn assert_error(&self, status: StatusCode, code: &str) -> &Self {
        self.assert_status(status);
        assert_eq!(
            self.error_code(),
            Some(code),
            "Expected error code {}, got body: {}",
            code,
            self.text
        );
        self
    }

    /// Asserts that the gate let the request through to routing.
    ///
    /// Catalog resources have no handlers here, so an allowed request ends
    /// in the `NOT_FOUND` fallback instead of a 401 or 403.
    #[track_caller]
    pub fn assert_passed_gate(&self) -> &Self {
        self.assert_error(StatusCode::NOT_FOUND, "NOT_FOUND")
    }

    /// Asserts a header is present.
    #[track_caller]
    pub fn assert_header(&self, name: &str) -> &Self {
        assert!(
            self.headers.contains_key(name),
            "Expected header {} in {:?}",
            name,
            self.headers
        );
        self
    }
}

/// Asserts that a token verifies and carries every listed authority.
#[track_caller]
pub fn assert_token_authorities(jwt: &JwtManager, token: &str, expected: &[&str]) {
    let decoded = jwt.decode(token).expect("token should verify");
    for authority in expected {
        assert!(
            decoded.has_authority(authority),
            "Token for {} lacks {}: {:?}",
            decoded.subject,
            authority,
            decoded.authorities
        );
    }
}

/// Asserts that a token verifies and carries none of the listed authorities.
#[track_caller]
pub fn assert_token_lacks(jwt: &JwtManager, token: &str, absent: &[&str]) {
    let decoded = jwt.decode(token).expect("token should verify");
    for authority in absent {
        assert!(
            !decoded.has_authority(authority),
            "Token for {} unexpectedly carries {}",
            decoded.subject,
            authority
        );
    }
}
