//! Error types for MedCore
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::llm::LlmError;

/// All error types that can occur in the coordinator library
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Model client could not be constructed (missing credential, bad HTTP setup)
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// A round-trip to the model capability failed
    #[error("Transport error: {0}")]
    Transport(#[from] LlmError),

    /// Tool name outside the closed catalog
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Result type alias for coordinator operations
pub type Result<T> = std::result::Result<T, CoordinatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialization_error() {
        let err = CoordinatorError::Initialization("GEMINI_API_KEY not set".to_string());
        assert_eq!(err.to_string(), "Initialization failed: GEMINI_API_KEY not set");
    }

    #[test]
    fn test_unknown_tool_error() {
        let err = CoordinatorError::UnknownTool("Pharmacy".to_string());
        assert_eq!(err.to_string(), "Unknown tool: Pharmacy");
    }

    #[test]
    fn test_transport_error_conversion() {
        let llm_err = LlmError::InvalidResponse("no candidates".to_string());
        let err: CoordinatorError = llm_err.into();
        assert!(matches!(err, CoordinatorError::Transport(_)));
        assert!(err.to_string().contains("no candidates"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(CoordinatorError::Initialization("no client".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
