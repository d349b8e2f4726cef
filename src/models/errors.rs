//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so logs and HTTP responses can
//! tell "bad input" apart from "try again later".
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - ADDRESS_xxx / LEDGER_xxx / PARTIAL_xxx: pipeline failures
//! - API_xxx: HTTP boundary errors
//! - CFG_xxx: Configuration errors

use thiserror::Error;

/// Application-wide error type
#[derive(Debug, Error)]
#[error("[{}] {}", .code.as_str(), .message)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // ============================================
    // Pipeline Errors
    // ============================================
    /// Wallet address failed structural validation
    AddressInvalid,
    /// RPC/network failure, timeout or malformed ledger response
    LedgerUnavailable,
    /// A best-effort collaborator could not answer
    PartialDataUnavailable,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors
    // ============================================
    Internal,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddressInvalid => "ADDRESS_INVALID",
            Self::LedgerUnavailable => "LEDGER_UNAVAILABLE",
            Self::PartialDataUnavailable => "PARTIAL_DATA_UNAVAILABLE",
            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::AddressInvalid | Self::ApiBadRequest => 400,
            Self::ApiRateLimited => 429,
            Self::LedgerUnavailable => 503,
            _ => 500,
        }
    }

    /// Check if the caller may retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LedgerUnavailable | Self::PartialDataUnavailable | Self::ApiRateLimited
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Malformed wallet address
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AddressInvalid, msg)
    }

    /// Ledger RPC unreachable, failing or returning garbage
    pub fn ledger_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::LedgerUnavailable, msg)
    }

    /// Collaborator down; callers degrade to defaults
    pub fn partial_data(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::PartialDataUnavailable, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// Internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Ledger request timed out".to_string()
        } else if err.is_connect() {
            "Ledger connection failed".to_string()
        } else {
            format!("Ledger request failed: {}", err)
        };
        Self::with_source(ErrorCode::LedgerUnavailable, message, err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorCode::LedgerUnavailable,
            format!("Malformed ledger response: {}", err),
            err,
        )
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::ledger_unavailable("Ledger queries exceeded the request timeout")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::ledger_unavailable("Connection timed out");
        assert_eq!(err.code, ErrorCode::LedgerUnavailable);
        assert_eq!(err.code_str(), "LEDGER_UNAVAILABLE");
        assert_eq!(err.to_string(), "[LEDGER_UNAVAILABLE] Connection timed out");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::LedgerUnavailable.is_retryable());
        assert!(!ErrorCode::AddressInvalid.is_retryable());
        assert!(!ErrorCode::ConfigInvalidValue.is_retryable());
    }

    #[test]
    fn test_http_status_separates_input_from_outage() {
        assert_eq!(ErrorCode::AddressInvalid.http_status(), 400);
        assert_eq!(ErrorCode::ApiBadRequest.http_status(), 400);
        assert_eq!(ErrorCode::LedgerUnavailable.http_status(), 503);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::Internal.http_status(), 500);
    }

    #[test]
    fn test_json_error_maps_to_ledger_unavailable() {
        let err: AppError = serde_json::from_str::<u64>("not json").unwrap_err().into();
        assert_eq!(err.code, ErrorCode::LedgerUnavailable);
        assert!(std::error::Error::source(&err).is_some());
    }
}
