//! Startup error handling
//!
//! Configuration and logging failures carry an [`ErrorContext`] so the operator
//! gets the failing component, operation and a hint on how to fix it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

pub type CoreResult<T> = Result<T, CoreError>;

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
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Errors raised while bringing the process up
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        field: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Logging error: {message}")]
    Logging {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl CoreError {
    pub fn context(&self) -> &ErrorContext {
        match self {
            CoreError::Config { context, .. } => context,
            CoreError::Logging { context, .. } => context,
        }
    }

    /// Name of the offending configuration field, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            CoreError::Config { field, .. } => field.as_deref(),
            CoreError::Logging { .. } => None,
        }
    }

    pub fn log(&self) {
        error!(
            error_id = %self.context().error_id,
            component = %self.context().component,
            error = %self,
            "Startup error"
        );
    }
}

/// Build a [`CoreError::Config`] for a specific settings field
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $field:expr) => {
        $crate::CoreError::Config {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            source: None,
            context: $crate::ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Check proposal.toml or the PROPOSAL__* environment variables"),
        }
    };
}
