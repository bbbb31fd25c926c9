// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication module.
//!
//! This module provides:
//! - Token claims and the HMAC token codec
//! - Password hashing and policy
//! - Credential validation against the identity store
//! - The per-request authentication context
//! - Login and identity lifecycle operations

mod claims;
mod context;
mod credentials;
mod jwt;
mod password;
mod service;

pub use claims::{Claims, GrantedAuthority};
pub use context::AuthContext;
pub use credentials::{CredentialError, CredentialResult, CredentialValidator};
pub use jwt::{DecodedToken, IssuedToken, JwtConfig, JwtManager, TokenError, TokenResult};
pub use password::{
    BcryptHasher, PasswordError, PasswordHasher, PasswordPolicy, PasswordResult, MAX_PASSWORD_LENGTH,
    MIN_PASSWORD_LENGTH,
};
pub use service::{AccountError, ActivationToken, AuthService, LoginOutcome, Registration};
