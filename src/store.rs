// ABOUTME: Slide info store for the slide-build application
// ABOUTME: Resolves subject/course pairs to directories and titles and records build counts

use crate::errors::{BuildError, Result};
use chrono::Local;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Timestamp format used for `created_at` / `update_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Per-course bookkeeping entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub title: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub update_at: String,
    /// Fields this tool does not interpret but must not drop on rewrite
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A subject: its base directory plus every course keyed by identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectEntry {
    pub dir: String,
    #[serde(flatten)]
    pub courses: BTreeMap<String, CourseRecord>,
}

/// Whole contents of `slideinfo.json`, keyed by subject code
pub type Registry = BTreeMap<String, SubjectEntry>;

/// Where a course lives and what it is called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseLocation {
    /// Course directory relative to the project root (`<subject dir>/<course>`)
    pub dir: PathBuf,
    pub title: String,
}

/// State of a course record after a build has been recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTimestamps {
    pub count: u64,
    pub created_at: String,
    pub update_at: String,
}

/// Access to the subject/course registry.
pub trait SlideStore {
    fn resolve(&self, subject: &str, course: &str) -> Result<Option<CourseLocation>>;

    fn record_build(&mut self, subject: &str, course: &str) -> Result<BuildTimestamps>;
}

fn resolve_in(registry: &Registry, subject: &str, course: &str) -> Option<CourseLocation> {
    let entry = registry.get(subject)?;
    let record = entry.courses.get(course)?;
    Some(CourseLocation {
        dir: Path::new(&entry.dir).join(course),
        title: record.title.clone(),
    })
}

fn record_in(
    registry: &mut Registry,
    subject: &str,
    course: &str,
    now: &str,
) -> Result<BuildTimestamps> {
    let entry = registry.get_mut(subject).ok_or_else(|| {
        BuildError::StoreError(format!("subject '{}' not found in slide info", subject))
    })?;
    let record = entry.courses.get_mut(course).ok_or_else(|| {
        BuildError::StoreError(format!(
            "course '{}' not found under subject '{}'",
            course, subject
        ))
    })?;

    if record.count > 0 {
        record.update_at = now.to_string();
    } else {
        record.created_at = now.to_string();
    }
    record.count += 1;

    Ok(BuildTimestamps {
        count: record.count,
        created_at: record.created_at.clone(),
        update_at: record.update_at.clone(),
    })
}

fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// File-backed store. The file is read once on open and rewritten on every
/// recorded build.
pub struct JsonSlideStore {
    path: PathBuf,
    registry: Registry,
}

impl JsonSlideStore {
    pub fn open(path: &Path) -> Result<Self> {
        info!("Reading slide info: {:?}", path);
        if !path.exists() {
            return Err(BuildError::PathNotFoundError(path.to_path_buf()));
        }
        let raw = fs::read_to_string(path)?;
        let registry: Registry = serde_json::from_str(&raw)?;
        debug!("Loaded {} subjects", registry.len());
        Ok(Self {
            path: path.to_path_buf(),
            registry,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn save(&self) -> Result<()> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.registry.serialize(&mut serializer)?;
        fs::write(&self.path, out)?;
        Ok(())
    }
}

impl SlideStore for JsonSlideStore {
    fn resolve(&self, subject: &str, course: &str) -> Result<Option<CourseLocation>> {
        Ok(resolve_in(&self.registry, subject, course))
    }

    fn record_build(&mut self, subject: &str, course: &str) -> Result<BuildTimestamps> {
        let stamps = record_in(&mut self.registry, subject, course, &now_timestamp())?;
        self.save()?;
        info!(
            "Recorded build #{} for {}/{} in {:?}",
            stamps.count, subject, course, self.path
        );
        Ok(stamps)
    }
}

/// In-memory store with a fixed clock, for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub registry: Registry,
    pub now: String,
}

impl MemoryStore {
    pub fn new(now: &str) -> Self {
        Self {
            registry: Registry::new(),
            now: now.to_string(),
        }
    }

    /// Register a course, creating the subject entry if needed
    pub fn with_course(mut self, subject: &str, dir: &str, course: &str, title: &str) -> Self {
        let entry = self
            .registry
            .entry(subject.to_string())
            .or_insert_with(|| SubjectEntry {
                dir: dir.to_string(),
                courses: BTreeMap::new(),
            });
        entry.courses.insert(
            course.to_string(),
            CourseRecord {
                title: title.to_string(),
                ..CourseRecord::default()
            },
        );
        self
    }

    pub fn record(&self, subject: &str, course: &str) -> Option<&CourseRecord> {
        self.registry.get(subject)?.courses.get(course)
    }
}

impl SlideStore for MemoryStore {
    fn resolve(&self, subject: &str, course: &str) -> Result<Option<CourseLocation>> {
        Ok(resolve_in(&self.registry, subject, course))
    }

    fn record_build(&mut self, subject: &str, course: &str) -> Result<BuildTimestamps> {
        let now = self.now.clone();
        record_in(&mut self.registry, subject, course, &now)
    }
}
