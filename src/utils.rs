// ABOUTME: Utility functions for the slide-build application
// ABOUTME: Provides path validation, directory creation and file-name helpers

use crate::errors::{BuildError, Result};
use std::path::Path;

/// Validate that a file exists
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(BuildError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(BuildError::ValidationError(format!(
            "Path is not a file: {:?}",
            path
        )));
    }
    Ok(())
}

/// Validate that a directory exists
pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(BuildError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(BuildError::ValidationError(format!(
            "Path is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        return Err(BuildError::ValidationError(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory_exists(parent)?;
        }
    }
    Ok(())
}

/// Path as LaTeX wants it, with forward slashes only
pub fn tex_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a title usable as part of a file name on macOS and Linux
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if c == ':' || c == '/' { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches('.');
    if trimmed.is_empty() {
        "default_filename".to_string()
    } else {
        trimmed.to_string()
    }
}
