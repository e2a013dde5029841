// ABOUTME: Build pipeline for the slide-build application
// ABOUTME: Wires store lookup, theme, extraction, assembly, compilation and publishing together

use crate::config::Config;
use crate::document::{self, TemplateVars};
use crate::errors::{BuildError, Result};
use crate::frames::{self, PageRange};
use crate::publish::{self, OutputSuffix};
use crate::store::{BuildTimestamps, SlideStore};
use crate::theme::{self, Theme};
use crate::toolchain::{self, Compiler};
use crate::utils;
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

/// Source file inside every course directory
pub const CONTENT_FILE: &str = "content.tex";
/// Stem of the document compiled in the build directory
pub const MAIN_STEM: &str = "main";

/// What to build
#[derive(Debug, Clone, Default)]
pub struct BuildRequest {
    pub subject: String,
    pub course: String,
    pub page_range: PageRange,
    /// Handout: progressive reveals disabled
    pub handout: bool,
    /// Include instructor-only annotations
    pub teacher: bool,
}

/// What a successful build produced
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub artifact: PathBuf,
    pub document: PathBuf,
    pub theme: Theme,
    pub range_extracted: bool,
    pub record: BuildTimestamps,
}

/// Body to compile and whether it is a frame subset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedBody {
    pub text: String,
    pub range_extracted: bool,
}

/// Narrow the source to the requested frames. An empty selection falls
/// back to the whole document.
pub fn select_body(content: &str, range: PageRange) -> SelectedBody {
    if !range.is_specified() {
        return SelectedBody {
            text: content.trim_end().to_string(),
            range_extracted: false,
        };
    }

    let part = frames::select_frames(content, range);
    if part.trim().is_empty() {
        warn!(
            "No frames match range {}; building the whole document",
            range
        );
        SelectedBody {
            text: content.trim_end().to_string(),
            range_extracted: false,
        }
    } else {
        SelectedBody {
            text: part.trim_end().to_string(),
            range_extracted: true,
        }
    }
}

/// Run one build end to end. The course directory and the store are only
/// touched once compilation has succeeded.
pub fn build<S: SlideStore, C: Compiler>(
    config: &Config,
    store: &mut S,
    compiler: &mut C,
    request: &BuildRequest,
) -> Result<BuildOutcome> {
    let location = store
        .resolve(&request.subject, &request.course)?
        .ok_or_else(|| BuildError::CourseNotFound {
            subject: request.subject.clone(),
            course: request.course.clone(),
        })?;

    let course_dir = config.course_dir(&location.dir);
    let content_path = course_dir.join(CONTENT_FILE);
    utils::validate_file_exists(&content_path)?;
    let content = fs::read_to_string(&content_path)?;

    let theme = theme::theme_for_document(&content)?;
    info!("Target directory: {:?}", location.dir);
    info!(
        "Page range: {} / handout: {} / teacher mode: {}",
        request.page_range, request.handout, request.teacher
    );
    info!("Beamer theme: {}", theme);

    let template_path = config.templates_dir.join(theme.template_file());
    utils::validate_file_exists(&template_path)?;
    let template = fs::read_to_string(&template_path)?;

    let vars = TemplateVars {
        dir: utils::tex_path(&location.dir),
        title: format!("{} {}", request.course, location.title),
        handout: request.handout,
        teacher: request.teacher,
    };

    let body = select_body(&content, request.page_range);
    let tex = document::assemble_document(&template, &vars, &body.text);

    utils::ensure_directory_exists(&config.build_dir)?;
    let main_tex_name = format!("{}.tex", MAIN_STEM);
    let main_tex = config.build_dir.join(&main_tex_name);
    document::write_document(&tex, &main_tex)?;

    // A PDF left by a kept or failed build must not pass for fresh output
    let artifact = config.build_dir.join(format!("{}.pdf", MAIN_STEM));
    if publish::remove_if_present(&artifact)? {
        info!("Removed stale artifact {:?}", artifact);
    }
    toolchain::compile(
        compiler,
        &theme.invocation(&main_tex_name),
        &config.build_dir,
        config.compile_timeout(),
        &artifact,
    )?;

    let suffix = OutputSuffix::select(body.range_extracted, request.teacher, request.handout);
    let file_name = publish::output_file_name(&request.course, &location.title, suffix, "pdf");
    let published = publish::publish_artifact(&artifact, &main_tex, &course_dir, &file_name)?;

    if config.keep_build {
        info!("Keeping build files in {:?}", config.build_dir);
    } else {
        publish::clean_build_dir(&config.build_dir, MAIN_STEM)?;
    }

    let record = store.record_build(&request.subject, &request.course)?;

    Ok(BuildOutcome {
        artifact: published.artifact,
        document: published.document,
        theme,
        range_extracted: body.range_extracted,
        record,
    })
}
