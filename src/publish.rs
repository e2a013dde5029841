// ABOUTME: Artifact publishing module for the slide-build application
// ABOUTME: Names the compiled PDF, copies it next to the course sources and cleans the build area

use crate::errors::Result;
use crate::utils;
use log::{debug, info};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Intermediate files LaTeX leaves next to `main.tex`
pub const BYPRODUCT_EXTENSIONS: &[&str] = &[
    "aux",
    "log",
    "nav",
    "out",
    "snm",
    "toc",
    "vrb",
    "fls",
    "fdb_latexmk",
    "synctex.gz",
    "pdf",
    "tex",
];

/// Which variant of the deck was built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSuffix {
    /// A frame range was extracted
    Range,
    Teacher,
    Presentation,
    /// Full handout, no suffix
    Handout,
}

impl OutputSuffix {
    /// Range extraction wins over teacher mode, which wins over presentation
    pub fn select(range_extracted: bool, teacher: bool, handout: bool) -> Self {
        if range_extracted {
            OutputSuffix::Range
        } else if teacher {
            OutputSuffix::Teacher
        } else if !handout {
            OutputSuffix::Presentation
        } else {
            OutputSuffix::Handout
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputSuffix::Range => "_test",
            OutputSuffix::Teacher => "_tech",
            OutputSuffix::Presentation => "_pr",
            OutputSuffix::Handout => "",
        }
    }
}

/// `{course}_{title}{suffix}.{extension}`
pub fn output_file_name(course: &str, title: &str, suffix: OutputSuffix, extension: &str) -> String {
    format!(
        "{}_{}{}.{}",
        course,
        utils::sanitize_filename(title),
        suffix.as_str(),
        extension
    )
}

/// Files placed in the course directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub artifact: PathBuf,
    pub document: PathBuf,
}

/// Copy the compiled artifact under its final name, then the document it
/// was built from.
pub fn publish_artifact(
    artifact: &Path,
    document: &Path,
    target_dir: &Path,
    file_name: &str,
) -> Result<Published> {
    utils::validate_file_exists(artifact)?;
    utils::validate_directory_exists(target_dir)?;

    let final_artifact = target_dir.join(file_name);
    fs::copy(artifact, &final_artifact)?;
    info!("Copied {:?} -> {:?}", artifact, final_artifact);

    let document_name = document
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("main.tex"));
    let final_document = target_dir.join(document_name);
    fs::copy(document, &final_document)?;
    info!("Copied {:?} -> {:?}", document, final_document);

    Ok(Published {
        artifact: final_artifact,
        document: final_document,
    })
}

/// Delete `{stem}.{ext}` byproducts from the build directory. Files that
/// are already gone are fine; any other failure is reported.
pub fn clean_build_dir(build_dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for ext in BYPRODUCT_EXTENSIONS {
        let path = build_dir.join(format!("{}.{}", stem, ext));
        if remove_if_present(&path)? {
            removed.push(path);
        }
    }
    Ok(removed)
}

/// Delete a file, returning whether it existed. Only `NotFound` is ignored.
pub fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {:?}", path);
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
