//! Error types for ao-harvest
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for ao-harvest
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Validation Errors (fail fast, never retried)
    // ============================================================================
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unsupported query type: {name}")]
    UnsupportedQueryType { name: String },

    #[error("Invalid range for '{field}': min ({min}) must be less than max ({max})")]
    InvalidRange { field: String, min: i64, max: i64 },

    // ============================================================================
    // Transport Errors (retried up to budget)
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Protocol Errors (malformed or error-bearing response, retried up to budget)
    // ============================================================================
    #[error("GraphQL errors: {messages}")]
    GraphQL { messages: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Persistence Errors (logged and swallowed during a run)
    // ============================================================================
    #[error("Checkpoint failed: {message}")]
    Checkpoint { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an invalid-range error
    pub fn invalid_range(field: impl Into<String>, min: i64, max: i64) -> Self {
        Self::InvalidRange {
            field: field.into(),
            min,
            max,
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a GraphQL error from the upstream error payload
    pub fn graphql(messages: impl Into<String>) -> Self {
        Self::GraphQL {
            messages: messages.into(),
        }
    }

    /// Create a malformed-response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a checkpoint error
    pub fn checkpoint(message: impl Into<String>) -> Self {
        Self::Checkpoint {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error is retryable within a page's retry budget.
    ///
    /// Transport and protocol failures are absorbed by the retry loop;
    /// validation and configuration errors surface to the caller immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_)
            | Error::GraphQL { .. }
            | Error::MalformedResponse { .. }
            | Error::JsonParse(_) => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for ao-harvest
pub type Result<T> = std::result::Result<T, Error>;
