// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! Every layer's error enum converts into [`ApiError`], which owns the
//! mapping to HTTP status codes and the JSON error body:
//!
//! ```json
//! { "error": { "code": "EXPIRED_TOKEN", "message": "Token has expired" } }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use levelup_core::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{AccountError, CredentialError, TokenError};
use crate::policy::GateError;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Token decoding or signing failure.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Login refused.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Identity lifecycle failure.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Authorization gate denial.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Identity store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Resource not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Unauthorized (401).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// Forbidden (403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message.
        message: String,
    },

    /// Validation error (422).
    #[error("Validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
        /// Field-specific errors.
        #[source]
        errors: Option<ValidationErrors>,
    },

    /// Conflict (409).
    #[error("Conflict: {message}")]
    Conflict {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: None,
        }
    }

    /// Creates a validation error with field errors.
    pub fn validation_with_errors(message: impl Into<String>, errors: ValidationErrors) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Some(errors),
        }
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Token(e) if e.is_server_error() => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Token(_) => StatusCode::BAD_REQUEST,
            ApiError::Credential(e) => match e {
                CredentialError::NotFound { .. } => StatusCode::NOT_FOUND,
                CredentialError::AccountDisabled { .. } | CredentialError::AccountLocked { .. } => {
                    StatusCode::FORBIDDEN
                }
                CredentialError::BadCredentials => StatusCode::UNAUTHORIZED,
                CredentialError::Store(_) | CredentialError::Password(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Account(e) => match e {
                AccountError::InvalidSubject { .. }
                | AccountError::PasswordUnchanged
                | AccountError::NoRoles => StatusCode::UNPROCESSABLE_ENTITY,
                AccountError::Password(p) if p.is_policy_violation() => StatusCode::UNPROCESSABLE_ENTITY,
                AccountError::SubjectTaken { .. } | AccountError::AlreadyActivated { .. } => {
                    StatusCode::CONFLICT
                }
                AccountError::NotFound { .. } => StatusCode::NOT_FOUND,
                AccountError::BadCredentials => StatusCode::UNAUTHORIZED,
                AccountError::Password(_) | AccountError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Gate(GateError::Unauthorized { .. }) => StatusCode::UNAUTHORIZED,
            ApiError::Gate(GateError::Forbidden { .. }) => StatusCode::FORBIDDEN,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Token(e) => e.error_code(),
            ApiError::Credential(e) => match e {
                CredentialError::NotFound { .. } => "NOT_FOUND",
                CredentialError::AccountDisabled { .. } => "ACCOUNT_DISABLED",
                CredentialError::AccountLocked { .. } => "ACCOUNT_LOCKED",
                CredentialError::BadCredentials => "BAD_CREDENTIALS",
                CredentialError::Store(_) | CredentialError::Password(_) => "INTERNAL_ERROR",
            },
            ApiError::Account(e) => match e {
                AccountError::InvalidSubject { .. }
                | AccountError::PasswordUnchanged
                | AccountError::NoRoles => "VALIDATION_ERROR",
                AccountError::Password(p) if p.is_policy_violation() => "VALIDATION_ERROR",
                AccountError::SubjectTaken { .. } => "CONFLICT",
                AccountError::AlreadyActivated { .. } => "ALREADY_ACTIVATED",
                AccountError::NotFound { .. } => "NOT_FOUND",
                AccountError::BadCredentials => "BAD_CREDENTIALS",
                AccountError::Password(_) | AccountError::Store(_) => "INTERNAL_ERROR",
            },
            ApiError::Gate(GateError::Unauthorized { .. }) => "UNAUTHORIZED",
            ApiError::Gate(GateError::Forbidden { .. }) => "FORBIDDEN",
            ApiError::Store(_) => "INTERNAL_ERROR",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns a user-facing error message.
    ///
    /// Server errors never expose their internal message.
    pub fn user_message(&self) -> String {
        if self.is_server_error() {
            return "An internal server error occurred".to_string();
        }

        match self {
            ApiError::Token(TokenError::Expired) => "Token has expired".to_string(),
            ApiError::Token(TokenError::EmptyClaims) => "Token claims are empty".to_string(),
            ApiError::Token(TokenError::Unsupported { .. }) => "Token is not supported".to_string(),
            ApiError::Token(_) => "Token is malformed".to_string(),
            ApiError::Credential(CredentialError::NotFound { .. }) => "User not found".to_string(),
            ApiError::Credential(CredentialError::AccountDisabled { .. }) => {
                "Account is not activated".to_string()
            }
            ApiError::Credential(CredentialError::AccountLocked { .. }) => "Account is locked".to_string(),
            ApiError::Credential(_) => "Invalid email or password".to_string(),
            ApiError::Account(AccountError::NotFound { .. }) => "User not found".to_string(),
            ApiError::Account(e) => e.to_string(),
            ApiError::Gate(GateError::Unauthorized { .. }) => "Authentication is required".to_string(),
            ApiError::Gate(GateError::Forbidden { .. }) => "Access is denied".to_string(),
            ApiError::NotFound { resource } => format!("{} not found", resource),
            ApiError::BadRequest { message } => message.clone(),
            ApiError::Unauthorized { .. } => "Authentication is required".to_string(),
            ApiError::Forbidden { .. } => "Access is denied".to_string(),
            ApiError::Validation { message, .. } => format!("Validation failed: {}", message),
            ApiError::Conflict { message } => message.clone(),
            ApiError::Store(_) | ApiError::Internal { .. } => {
                "An internal server error occurred".to_string()
            }
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.user_message();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
                details: self.error_details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl ApiError {
    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Validation {
                errors: Some(errors),
                ..
            } => Some(serde_json::to_value(errors).unwrap_or_default()),
            ApiError::Account(AccountError::Password(p)) if p.is_policy_violation() => {
                Some(serde_json::json!({ "fields": [{ "field": "password", "message": p.to_string() }] }))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Collection of field validation errors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationErrors {
    /// Field-specific errors.
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates a new validation errors collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field error.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns `true` if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts to an ApiError if there are errors.
    pub fn into_result<T>(self, success: T) -> ApiResult<T> {
        if self.is_empty() {
            Ok(success)
        } else {
            Err(ApiError::validation_with_errors("Validation failed", self))
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} validation errors", self.fields.len())
    }
}

/// A single field validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// Error message.
    pub message: String,
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", err))
    }
}

// =============================================================================
// Tests
// =============================================================================
