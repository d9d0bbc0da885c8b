//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type SentinelResult<T> = Result<T, SentinelError>;

/// Result type returned across the enrichment gateway boundary
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the recon-sentinel system
#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("LLM error: {message}")]
    Llm {
        message: String,
        provider: Option<String>,
        model: Option<String>,
        context: ErrorContext,
    },

    #[error("Enrichment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl SentinelError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            SentinelError::Config { context, .. } => Some(context),
            SentinelError::Validation { context, .. } => Some(context),
            SentinelError::NotFound { context, .. } => Some(context),
            SentinelError::Llm { context, .. } => Some(context),
            SentinelError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            SentinelError::Gateway(err) => !err.is_invalid_input(),
            SentinelError::Llm { .. } => true,
            SentinelError::Config { .. } => false,
            SentinelError::Validation { .. } => false,
            SentinelError::NotFound { .. } => false,
            _ => false,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            SentinelError::Internal { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Internal error occurred"
                );
            }
            SentinelError::Config { .. } | SentinelError::Validation { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Configuration or validation error"
                );
            }
            SentinelError::Gateway(_) | SentinelError::Llm { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Enrichment error (may be recoverable)"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Uniform failure shape of the enrichment gateway.
///
/// `message` is always safe to show to a user. The raw cause of an upstream
/// failure is kept in `detail` and is only meant for logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Required input was missing or empty; the model was never contacted
    #[error("{message}")]
    InvalidInput { message: String },

    /// The model call failed or returned output that did not match the schema
    #[error("{message}")]
    Failed { message: String, detail: String },
}

impl GatewayError {
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn failed<M: Into<String>, D: Into<String>>(message: M, detail: D) -> Self {
        Self::Failed {
            message: message.into(),
            detail: detail.into(),
        }
    }

    /// User-facing message
    pub fn message(&self) -> &str {
        match self {
            GatewayError::InvalidInput { message } | GatewayError::Failed { message, .. } => {
                message
            }
        }
    }

    /// Raw failure detail, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            GatewayError::InvalidInput { .. } => None,
            GatewayError::Failed { detail, .. } => Some(detail),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, GatewayError::InvalidInput { .. })
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::SentinelError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'sentinel config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::SentinelError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::SentinelError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Verify the resource name"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_keeps_detail_out_of_message() {
        let err = GatewayError::failed(
            "Failed to generate summary. Please try again.",
            "HTTP 500 from provider",
        );
        assert_eq!(err.to_string(), "Failed to generate summary. Please try again.");
        assert_eq!(err.detail(), Some("HTTP 500 from provider"));
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn invalid_input_is_not_recoverable() {
        let err: SentinelError = GatewayError::invalid_input("No data to analyze.").into();
        assert!(!err.is_recoverable());

        let err: SentinelError = GatewayError::failed("x", "y").into();
        assert!(err.is_recoverable());
    }
}
