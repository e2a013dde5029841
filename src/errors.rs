// ABOUTME: Error types for the slide-build application
// ABOUTME: Provides structured error handling for each stage of the build pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Slide info parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Course not found: subject '{subject}', course '{course}'")]
    CourseNotFound { subject: String, course: String },

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Invalid theme value: {0}")]
    InvalidTheme(String),

    #[error("Invalid page range '{input}': {reason}")]
    InvalidPageRange { input: String, reason: String },

    #[error("LaTeX compilation failed on pass {pass}\n--- LOG ---\n{diagnostic}")]
    CompileFailed { pass: u8, diagnostic: String },

    #[error("LaTeX compilation timed out on pass {pass} after {timeout_secs} seconds")]
    CompileTimeout { pass: u8, timeout_secs: u64 },

    #[error("Compiler reported success but produced no output: {0}")]
    ArtifactMissing(PathBuf),

    #[error("Slide info store error: {0}")]
    StoreError(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl BuildError {
    /// Errors raised by the external typesetting toolchain, including a
    /// compile that exits cleanly without leaving its artifact behind.
    pub fn is_toolchain_error(&self) -> bool {
        matches!(
            self,
            BuildError::CompileFailed { .. }
                | BuildError::CompileTimeout { .. }
                | BuildError::ArtifactMissing(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
