//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code for log correlation and
//! monitoring in production.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - SCORE_xxx: risk-score computation errors
//! - STORE_xxx: entity store errors
//! - API_xxx: API errors
//! - CFG_xxx: configuration errors
//! - DATA_xxx: dataset generation/export errors

use std::fmt;

/// Application-wide error type; all failures flow through this
#[derive(Debug)]
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

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Scoring Errors
    // ============================================
    /// A factor referenced by a non-zero weight is absent from the input
    ScoreMissingFactor,
    /// A weight is negative or not finite
    ScoreInvalidWeight,
    /// Weights of a scheme do not sum to 1.0 (and are not all zero)
    ScoreWeightSum,

    // ============================================
    // Store Errors
    // ============================================
    /// No entity with the requested id
    StoreEntityNotFound,
    /// Entity type not supported by the requested operation
    StoreUnsupportedEntity,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Unauthorized (invalid API key)
    ApiUnauthorized,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,
    /// Resource not found
    ApiNotFound,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Dataset Errors
    // ============================================
    /// Failed to export the generated dataset
    DataExportFailed,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            // Scoring
            Self::ScoreMissingFactor => "SCORE_MISSING_FACTOR",
            Self::ScoreInvalidWeight => "SCORE_INVALID_WEIGHT",
            Self::ScoreWeightSum => "SCORE_WEIGHT_SUM",

            // Store
            Self::StoreEntityNotFound => "STORE_ENTITY_NOT_FOUND",
            Self::StoreUnsupportedEntity => "STORE_UNSUPPORTED_ENTITY",

            // API
            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiUnauthorized => "API_UNAUTHORIZED",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",
            Self::ApiNotFound => "API_NOT_FOUND",

            // Configuration
            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            // Dataset
            Self::DataExportFailed => "DATA_EXPORT_FAILED",

            // Generic
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest
            | Self::ScoreInvalidWeight
            | Self::ScoreWeightSum
            | Self::StoreUnsupportedEntity
            | Self::ConfigInvalidValue => 400,
            Self::ApiUnauthorized => 401,
            Self::ApiNotFound | Self::StoreEntityNotFound => 404,
            Self::ApiRateLimited => 429,
            _ => 500,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Factor required by a non-zero weight is missing from the input set
    pub fn missing_factor(name: &str) -> Self {
        Self::new(
            ErrorCode::ScoreMissingFactor,
            format!("Missing risk factor: {}", name),
        )
    }

    /// Weight is negative or not finite
    pub fn invalid_weight(name: &str, weight: f64) -> Self {
        Self::new(
            ErrorCode::ScoreInvalidWeight,
            format!("Invalid weight for factor {}: {}", name, weight),
        )
    }

    /// Weights do not sum to 1.0
    pub fn weight_sum(sum: f64) -> Self {
        Self::new(
            ErrorCode::ScoreWeightSum,
            format!("Weights must sum to 1.0 (or all be zero), got {}", sum),
        )
    }

    /// Entity not found in the store
    pub fn entity_not_found(entity_type: &str, id: u32) -> Self {
        Self::new(
            ErrorCode::StoreEntityNotFound,
            format!("{} {} not found", entity_type, id),
        )
    }

    /// Unsupported entity type
    pub fn unsupported_entity(entity_type: &str) -> Self {
        Self::new(
            ErrorCode::StoreUnsupportedEntity,
            format!("Unsupported entity type: {}", entity_type),
        )
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// Dataset export failed
    pub fn export_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DataExportFailed, msg)
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

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::DataExportFailed, "JSON serialization error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::missing_factor("political_stability");
        assert_eq!(err.code, ErrorCode::ScoreMissingFactor);
        assert_eq!(err.code_str(), "SCORE_MISSING_FACTOR");
        assert!(err.message.contains("political_stability"));
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ApiBadRequest.http_status(), 400);
        assert_eq!(ErrorCode::StoreEntityNotFound.http_status(), 404);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::ScoreMissingFactor.http_status(), 500);
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::entity_not_found("country", 42);
        let rendered = err.to_string();
        assert!(rendered.contains("STORE_ENTITY_NOT_FOUND"));
        assert!(rendered.contains("country 42"));
    }
}
