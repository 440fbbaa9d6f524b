//! Error types for chat-export
//!
//! Structural misses inside the conversation (missing message containers,
//! content blocks or sender labels) are not errors: the walker skips them.
//! Everything here is raised either by the browser plumbing around the
//! pipeline or by a media conversion that the normalizer logs and swallows.

use thiserror::Error;

/// Errors raised while driving the browser or producing an export
#[derive(Debug, Error)]
pub enum ExportError {
    /// Browser could not be launched
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Could not attach to a running browser
    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    /// Tab creation, lookup or close failed
    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    /// Navigation did not start or complete
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// The page tree could not be extracted or parsed
    #[error("Failed to parse DOM: {0}")]
    DomParseFailed(String),

    /// JavaScript evaluation in the page failed
    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    /// A tool invocation failed
    #[error("Tool '{tool}' failed: {reason}")]
    ToolExecutionFailed { tool: String, reason: String },

    /// Caller supplied an unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Host profile override could not be read
    #[error("Failed to load host profile: {0}")]
    ProfileLoadFailed(String),

    /// A drawable surface could not be turned into a static image
    #[error("Surface snapshot failed: {0}")]
    SnapshotFailed(String),

    /// Printing the export document to PDF failed
    #[error("PDF rendering failed: {0}")]
    PdfRenderFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_display() {
        let err = ExportError::ToolExecutionFailed {
            tool: "save_pdf".to_string(),
            reason: "no tab".to_string(),
        };
        assert_eq!(err.to_string(), "Tool 'save_pdf' failed: no tab");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ExportError = io.into();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
