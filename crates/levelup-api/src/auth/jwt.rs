// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT token management.
//!
//! Tokens are HMAC signed with a base64 encoded shared secret loaded once at
//! startup. They are stateless: nothing is stored server-side and there is no
//! revocation list, so a token's authorities stay in force until it expires.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use super::Claims;
use crate::error::{ApiError, ApiResult};

// =============================================================================
// TokenError
// =============================================================================

/// Token codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Bad structure, bad encoding or bad signature.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Error message.
        message: String,
    },

    /// The token's expiry lies in the past.
    #[error("Token has expired")]
    Expired,

    /// The token uses an algorithm this service does not accept.
    #[error("Unsupported token: {message}")]
    Unsupported {
        /// Error message.
        message: String,
    },

    /// The token string or its subject is empty.
    #[error("Token claims are empty")]
    EmptyClaims,

    /// Signing a new token failed.
    #[error("Failed to sign token: {message}")]
    Signing {
        /// Error message.
        message: String,
    },
}

impl TokenError {
    /// Creates a malformed token error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Creates an unsupported token error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::Malformed { .. } => "MALFORMED_TOKEN",
            TokenError::Expired => "EXPIRED_TOKEN",
            TokenError::Unsupported { .. } => "UNSUPPORTED_TOKEN",
            TokenError::EmptyClaims => "EMPTY_CLAIMS",
            TokenError::Signing { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns `true` if the failure lies with the server, not the token.
    pub fn is_server_error(&self) -> bool {
        matches!(self, TokenError::Signing { .. })
    }
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;

// =============================================================================
// JwtConfig
// =============================================================================

/// JWT configuration.
#[derive(Clone)]
pub struct JwtConfig {
    /// Base64 encoded HMAC secret.
    pub secret: String,
    /// Token lifetime in seconds.
    pub expiration_secs: i64,
    /// Algorithm to use for signing.
    pub algorithm: Algorithm,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("expiration_secs", &self.expiration_secs)
            .field("algorithm", &self.algorithm)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expiration_secs: Self::TWO_WEEKS,
            algorithm: Algorithm::HS256,
            leeway_secs: 0,
        }
    }
}

impl JwtConfig {
    /// Two weeks, the LevelUp token lifetime.
    pub const TWO_WEEKS: i64 = 14 * 24 * 60 * 60;

    /// Ten hours, the NextSpring token lifetime.
    pub const TEN_HOURS: i64 = 10 * 60 * 60;

    /// Creates a new configuration with the given base64 secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the token lifetime in seconds.
    pub fn with_expiration_secs(mut self, secs: i64) -> Self {
        self.expiration_secs = secs;
        self
    }

    /// Sets the token lifetime.
    pub fn with_expiration(mut self, duration: Duration) -> Self {
        self.expiration_secs = duration.as_secs() as i64;
        self
    }

    /// Sets the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the clock skew tolerance.
    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ApiResult<()> {
        if self.secret.is_empty() {
            return Err(ApiError::internal("JWT secret is not configured"));
        }
        let decoded = BASE64
            .decode(self.secret.as_bytes())
            .map_err(|e| ApiError::internal(format!("JWT secret is not valid base64: {}", e)))?;
        if decoded.len() < 32 {
            tracing::warn!(
                bytes = decoded.len(),
                "JWT secret is shorter than recommended (32 bytes)"
            );
        }
        if self.expiration_secs <= 0 {
            return Err(ApiError::internal("JWT expiration must be positive"));
        }
        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ApiError::internal(format!(
                "JWT algorithm {:?} is not an HMAC algorithm",
                self.algorithm
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Issued / Decoded tokens
// =============================================================================

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWS string.
    pub token: String,
    /// Issued at.
    pub issued_at: DateTime<Utc>,
    /// Expires at.
    pub expires_at: DateTime<Utc>,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// The verified content of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    /// Subject.
    pub subject: String,
    /// Authorities embedded at issuance.
    pub authorities: BTreeSet<String>,
    /// Issued at.
    pub issued_at: DateTime<Utc>,
    /// Expires at.
    pub expires_at: DateTime<Utc>,
}

impl DecodedToken {
    /// Returns `true` if the token carries the authority.
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

// =============================================================================
// JwtManager
// =============================================================================

/// Issues and verifies access tokens.
#[derive(Clone)]
pub struct JwtManager {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl JwtManager {
    /// Creates a new JWT manager with the given configuration.
    pub fn new(config: JwtConfig) -> ApiResult<Self> {
        config.validate()?;

        let encoding_key = EncodingKey::from_base64_secret(&config.secret)
            .map_err(|e| ApiError::internal(format!("Invalid JWT secret: {}", e)))?;
        let decoding_key = DecodingKey::from_base64_secret(&config.secret)
            .map_err(|e| ApiError::internal(format!("Invalid JWT secret: {}", e)))?;

        let mut validation = Validation::new(config.algorithm);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;
        validation.validate_nbf = false;

        Ok(Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
        })
    }

    /// Signs a token for `subject` carrying `authorities`, issued at `now`.
    pub fn issue<I, A>(&self, subject: &str, authorities: I, now: DateTime<Utc>) -> TokenResult<IssuedToken>
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        if subject.trim().is_empty() {
            return Err(TokenError::EmptyClaims);
        }

        let claims = Claims::new(subject, authorities, now, self.config.expiration_secs);
        let header = Header::new(self.config.algorithm);
        let token = encode(&header, &claims, &self.encoding_key).map_err(|e| TokenError::Signing {
            message: e.to_string(),
        })?;

        let issued_at = claims
            .issued_at()
            .ok_or_else(|| TokenError::Signing {
                message: "issue time out of range".to_string(),
            })?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| TokenError::Signing {
                message: "expiry out of range".to_string(),
            })?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
            expires_in: self.config.expiration_secs,
        })
    }

    /// Verifies a token and returns its content.
    pub fn decode(&self, token: &str) -> TokenResult<DecodedToken> {
        if token.trim().is_empty() {
            return Err(TokenError::EmptyClaims);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(map_jwt_error)?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(TokenError::EmptyClaims);
        }

        let issued_at = claims
            .issued_at()
            .ok_or_else(|| TokenError::malformed("issued-at out of range"))?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| TokenError::malformed("expiry out of range"))?;
        let authorities = claims.authority_set();

        Ok(DecodedToken {
            subject: claims.sub,
            authorities,
            issued_at,
            expires_at,
        })
    }

    /// Verifies a token, discarding its content.
    pub fn validate(&self, token: &str) -> TokenResult<()> {
        self.decode(token).map(|_| ())
    }

    /// Returns the token lifetime in seconds.
    pub fn expiration_secs(&self) -> i64 {
        self.config.expiration_secs
    }

    /// Returns the signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("algorithm", &self.config.algorithm)
            .field("expiration_secs", &self.config.expiration_secs)
            .field("leeway_secs", &self.config.leeway_secs)
            .finish()
    }
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm | ErrorKind::InvalidAlgorithmName => {
            TokenError::unsupported(e.to_string())
        }
        ErrorKind::InvalidSignature => TokenError::malformed("invalid signature"),
        ErrorKind::InvalidToken => TokenError::malformed("invalid token structure"),
        _ => TokenError::malformed(e.to_string()),
    }
}

// =============================================================================
// Tests
// =============================================================================
