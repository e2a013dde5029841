// ABOUTME: Configuration module for the slide-build application
// ABOUTME: Provides directory layout, timeouts and environment variable handling

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wall-clock limit for a single compiler pass
pub const DEFAULT_COMPILE_TIMEOUT_SECS: u64 = 180;

/// Global configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the slide info store, templates and build area
    pub tool_dir: PathBuf,
    /// Root under which subject/course directories live
    pub project_root: PathBuf,
    pub store_path: PathBuf,
    pub templates_dir: PathBuf,
    pub build_dir: PathBuf,
    pub compile_timeout_secs: u64,
    /// Leave intermediate LaTeX files in the build directory
    pub keep_build: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_tool_dir(PathBuf::from("."))
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out every path relative to a tool directory, the way the
    /// build tool is normally installed next to the course tree.
    pub fn with_tool_dir(tool_dir: PathBuf) -> Self {
        let project_root = default_project_root(&tool_dir);
        Self {
            store_path: tool_dir.join("slideinfo.json"),
            templates_dir: tool_dir.join("templates"),
            build_dir: tool_dir.join("build"),
            project_root,
            tool_dir,
            compile_timeout_secs: DEFAULT_COMPILE_TIMEOUT_SECS,
            keep_build: false,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let tool_dir = env::var("SLIDE_TOOL_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let mut config = Self::with_tool_dir(tool_dir);

        if let Some(root) = env_path("SLIDE_PROJECT_ROOT") {
            config.project_root = root;
        }
        if let Some(store) = env_path("SLIDE_STORE_PATH") {
            config.store_path = store;
        }
        if let Some(templates) = env_path("SLIDE_TEMPLATES_DIR") {
            config.templates_dir = templates;
        }
        if let Some(build) = env_path("SLIDE_BUILD_DIR") {
            config.build_dir = build;
        }

        config.compile_timeout_secs = env::var("SLIDE_COMPILE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_COMPILE_TIMEOUT_SECS);
        config.keep_build = env::var("SLIDE_KEEP_BUILD")
            .ok()
            .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        config
    }

    pub fn compile_timeout(&self) -> Duration {
        Duration::from_secs(self.compile_timeout_secs)
    }

    /// Absolute location of a course directory relative to the project root
    pub fn course_dir(&self, relative: &Path) -> PathBuf {
        self.project_root.join(relative)
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key).ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

fn default_project_root(tool_dir: &Path) -> PathBuf {
    // "." has no parent component, so step up explicitly
    match tool_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => tool_dir.join(".."),
    }
}
