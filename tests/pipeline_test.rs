use slide_build::theme::Invocation;
use slide_build::{
    BuildError, BuildRequest, Compiler, Config, JsonSlideStore, MemoryStore, PageRange,
    PassOutcome, SlideStore, Theme, build,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

const TEMPLATE: &str = "% dir @@sdir@@\n% footer @@stitle@@\n%@@pausemode@@\n%@@teachermode@@\n\\begin{document}";

const CONTENT: &str = r"\begin{frame}{Alpha}
alpha body
\end{frame}

\begin{frame}{Beta}
beta body
\end{frame}

\begin{frame}{Gamma}
gamma body
\end{frame}
";

/// Stands in for lualatex/latexmk: copies the document into a fake PDF
#[derive(Default)]
struct FakeCompiler {
    calls: Vec<Invocation>,
    fail: bool,
    /// Exit cleanly without writing any output
    silent: bool,
}

impl Compiler for FakeCompiler {
    fn run_pass(
        &mut self,
        invocation: &Invocation,
        work_dir: &Path,
        _timeout: Duration,
    ) -> slide_build::Result<PassOutcome> {
        self.calls.push(invocation.clone());
        if self.fail {
            return Ok(PassOutcome::failed("", "! Emergency stop.\n"));
        }
        if self.silent {
            return Ok(PassOutcome::succeeded());
        }
        let tex = fs::read_to_string(work_dir.join("main.tex"))?;
        fs::write(work_dir.join("main.pdf"), tex)?;
        fs::write(work_dir.join("main.aux"), "aux")?;
        fs::write(work_dir.join("main.log"), "log")?;
        Ok(PassOutcome::succeeded())
    }
}

struct Fixture {
    _temp: TempDir,
    config: Config,
    course_dir: PathBuf,
}

fn setup(content: &str) -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();

    let temp = TempDir::new().expect("Failed to create temp dir");
    let tool_dir = temp.path().join("build_slide");
    let config = Config::with_tool_dir(tool_dir.clone());

    fs::create_dir_all(&config.templates_dir).expect("Failed to create templates dir");
    for theme in [Theme::SimpleDarkBlue, Theme::Metropolis] {
        fs::write(
            config.templates_dir.join(theme.template_file()),
            format!("% theme {}\n{}", theme, TEMPLATE),
        )
        .expect("Failed to write template");
    }

    let course_dir = temp.path().join("prog").join("07");
    fs::create_dir_all(&course_dir).expect("Failed to create course dir");
    fs::write(course_dir.join("content.tex"), content).expect("Failed to write content");

    Fixture {
        _temp: temp,
        config,
        course_dir,
    }
}

fn store() -> MemoryStore {
    MemoryStore::new("2026-03-04 05:06:07").with_course("2030302", "prog", "07", "Functions")
}

fn request(page_range: PageRange, handout: bool, teacher: bool) -> BuildRequest {
    BuildRequest {
        subject: "2030302".to_string(),
        course: "07".to_string(),
        page_range,
        handout,
        teacher,
    }
}

#[test]
fn test_build_single_frame_range() {
    let fixture = setup(CONTENT);
    let mut store = store();
    let mut compiler = FakeCompiler::default();

    let outcome = build(
        &fixture.config,
        &mut store,
        &mut compiler,
        &request("2".parse().unwrap(), true, true),
    )
    .expect("build failed");

    assert_eq!(outcome.artifact, fixture.course_dir.join("07_Functions_test.pdf"));
    assert!(outcome.range_extracted);
    assert_eq!(outcome.theme, Theme::SimpleDarkBlue);
    assert_eq!(compiler.calls.len(), 2);
    assert_eq!(compiler.calls[0].program, "lualatex");

    let doc = fs::read_to_string(fixture.course_dir.join("main.tex")).unwrap();
    let body = doc
        .split("\\begin{document}\n\n")
        .nth(1)
        .expect("document body missing");
    assert_eq!(body, "\\begin{frame}{Beta}\nbeta body\n\\end{frame}\n\\end{document}\n");
    assert!(doc.contains("% dir prog/07"));
    assert!(doc.contains("% footer 07 Functions"));
    assert!(doc.contains("\\mypausemodefalse"));
    assert!(doc.contains("\\teachermodetrue"));

    // The fake PDF is the compiled document
    assert_eq!(fs::read_to_string(&outcome.artifact).unwrap(), doc);

    // Byproducts are gone from the build area
    assert!(!fixture.config.build_dir.join("main.pdf").exists());
    assert!(!fixture.config.build_dir.join("main.aux").exists());
    assert!(!fixture.config.build_dir.join("main.tex").exists());

    assert_eq!(outcome.record.count, 1);
    assert_eq!(store.record("2030302", "07").unwrap().count, 1);
}

#[test]
fn test_build_full_presentation() {
    let fixture = setup(CONTENT);
    let mut store = store();
    let mut compiler = FakeCompiler::default();

    let outcome = build(
        &fixture.config,
        &mut store,
        &mut compiler,
        &request(PageRange::Unspecified, false, false),
    )
    .expect("build failed");

    assert_eq!(outcome.artifact, fixture.course_dir.join("07_Functions_pr.pdf"));
    assert!(!outcome.range_extracted);

    let doc = fs::read_to_string(&outcome.document).unwrap();
    assert!(doc.contains("\\mypausemodetrue"));
    assert!(doc.contains("\\teachermodefalse"));
    assert!(doc.contains("alpha body") && doc.contains("gamma body"));
    assert!(doc.ends_with("\\end{frame}\n\\end{document}\n"));
}

#[test]
fn test_build_handout_and_teacher_names() {
    let fixture = setup(CONTENT);
    let mut store = store();
    let mut compiler = FakeCompiler::default();

    let handout = build(
        &fixture.config,
        &mut store,
        &mut compiler,
        &request(PageRange::Unspecified, true, false),
    )
    .expect("handout build failed");
    assert_eq!(handout.artifact, fixture.course_dir.join("07_Functions.pdf"));

    let teacher = build(
        &fixture.config,
        &mut store,
        &mut compiler,
        &request(PageRange::Unspecified, false, true),
    )
    .expect("teacher build failed");
    assert_eq!(teacher.artifact, fixture.course_dir.join("07_Functions_tech.pdf"));

    assert_eq!(teacher.record.count, 2);
    assert_eq!(teacher.record.created_at, "2026-03-04 05:06:07");
    assert_eq!(teacher.record.update_at, "2026-03-04 05:06:07");
}

#[test]
fn test_build_range_past_end_falls_back_to_whole_document() {
    let fixture = setup(CONTENT);
    let mut store = store();
    let mut compiler = FakeCompiler::default();

    let outcome = build(
        &fixture.config,
        &mut store,
        &mut compiler,
        &request("9-12".parse().unwrap(), false, false),
    )
    .expect("build failed");

    assert!(!outcome.range_extracted);
    assert_eq!(outcome.artifact, fixture.course_dir.join("07_Functions_pr.pdf"));
    let doc = fs::read_to_string(&outcome.document).unwrap();
    assert!(doc.contains("alpha body") && doc.contains("beta body") && doc.contains("gamma body"));
}

#[test]
fn test_build_uses_metropolis_profile() {
    let content = format!("@@@--(metropolis)--@@@\n{}", CONTENT);
    let fixture = setup(&content);
    let mut store = store();
    let mut compiler = FakeCompiler::default();

    let outcome = build(
        &fixture.config,
        &mut store,
        &mut compiler,
        &request(PageRange::Unspecified, true, false),
    )
    .expect("build failed");

    assert_eq!(outcome.theme, Theme::Metropolis);
    assert_eq!(compiler.calls.len(), 2);
    assert_eq!(compiler.calls[0].program, "latexmk");
    let doc = fs::read_to_string(&outcome.document).unwrap();
    assert!(doc.starts_with("% theme metropolis"));
}

#[test]
fn test_failed_compile_leaves_course_dir_and_store_untouched() {
    let fixture = setup(CONTENT);
    let mut store = store();
    let mut compiler = FakeCompiler {
        fail: true,
        ..FakeCompiler::default()
    };

    let err = build(
        &fixture.config,
        &mut store,
        &mut compiler,
        &request(PageRange::Unspecified, false, false),
    )
    .unwrap_err();

    assert!(err.is_toolchain_error());
    assert_eq!(compiler.calls.len(), 1);

    let entries: Vec<_> = fs::read_dir(&fixture.course_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("content.tex")]);

    let record = store.record("2030302", "07").unwrap();
    assert_eq!(record.count, 0);
    assert_eq!(record.created_at, "");
}

#[test]
fn test_invalid_theme_aborts_before_compiling() {
    let fixture = setup(&format!("@@@--(Warsaw)--@@@\n{}", CONTENT));
    let mut store = store();
    let mut compiler = FakeCompiler::default();

    let err = build(
        &fixture.config,
        &mut store,
        &mut compiler,
        &request(PageRange::Unspecified, false, false),
    )
    .unwrap_err();

    assert!(matches!(err, BuildError::InvalidTheme(ref v) if v == "Warsaw"));
    assert!(compiler.calls.is_empty());
}

#[test]
fn test_unknown_course_is_configuration_error() {
    let fixture = setup(CONTENT);
    let mut store = store();
    let mut compiler = FakeCompiler::default();

    let mut req = request(PageRange::Unspecified, false, false);
    req.course = "99".to_string();
    let err = build(&fixture.config, &mut store, &mut compiler, &req).unwrap_err();

    assert!(matches!(err, BuildError::CourseNotFound { .. }));
    assert!(!err.is_toolchain_error());
    assert!(compiler.calls.is_empty());
}

#[test]
fn test_missing_content_file() {
    let fixture = setup(CONTENT);
    fs::remove_file(fixture.course_dir.join("content.tex")).unwrap();
    let mut store = store();
    let mut compiler = FakeCompiler::default();

    let err = build(
        &fixture.config,
        &mut store,
        &mut compiler,
        &request(PageRange::Unspecified, false, false),
    )
    .unwrap_err();
    assert!(matches!(err, BuildError::PathNotFoundError(_)));
}

#[test]
fn test_keep_build_leaves_intermediate_files() {
    let mut fixture = setup(CONTENT);
    fixture.config.keep_build = true;
    let mut store = store();
    let mut compiler = FakeCompiler::default();

    build(
        &fixture.config,
        &mut store,
        &mut compiler,
        &request(PageRange::Unspecified, false, false),
    )
    .expect("build failed");

    assert!(fixture.config.build_dir.join("main.tex").exists());
    assert!(fixture.config.build_dir.join("main.log").exists());
}

#[test]
fn test_json_store_updated_after_build() {
    let fixture = setup(CONTENT);
    let store_path = fixture.config.store_path.clone();
    fs::write(
        &store_path,
        r#"{"2030302": {"dir": "prog", "07": {"title": "Functions", "count": 3, "created_at": "2025-04-01 09:00:00", "update_at": ""}}}"#,
    )
    .unwrap();

    let mut store = JsonSlideStore::open(&store_path).unwrap();
    let mut compiler = FakeCompiler::default();
    let outcome = build(
        &fixture.config,
        &mut store,
        &mut compiler,
        &request(PageRange::Unspecified, true, false),
    )
    .expect("build failed");

    assert_eq!(outcome.record.count, 4);
    assert_eq!(outcome.record.created_at, "2025-04-01 09:00:00");
    assert!(!outcome.record.update_at.is_empty());

    let reopened = JsonSlideStore::open(&store_path).unwrap();
    let location = reopened.resolve("2030302", "07").unwrap().unwrap();
    assert_eq!(location.title, "Functions");
    assert_eq!(reopened.registry()["2030302"].courses["07"].count, 4);
}

#[test]
fn test_leftover_pdf_is_not_published() {
    let fixture = setup(CONTENT);
    let mut store = store();
    fs::create_dir_all(&fixture.config.build_dir).unwrap();
    fs::write(fixture.config.build_dir.join("main.pdf"), "old output").unwrap();

    let mut compiler = FakeCompiler {
        silent: true,
        ..FakeCompiler::default()
    };
    let err = build(
        &fixture.config,
        &mut store,
        &mut compiler,
        &request("2".parse().unwrap(), false, false),
    )
    .unwrap_err();

    assert!(matches!(err, BuildError::ArtifactMissing(_)), "got {:?}", err);
    assert_eq!(compiler.calls.len(), 2);
    assert!(!fixture.course_dir.join("07_Functions_test.pdf").exists());
    assert!(!fixture.course_dir.join("main.tex").exists());
    assert_eq!(store.record("2030302", "07").unwrap().count, 0);
}

#[test]
fn test_kept_build_output_does_not_satisfy_next_build() {
    let mut fixture = setup(CONTENT);
    fixture.config.keep_build = true;
    let mut store = store();

    let first = build(
        &fixture.config,
        &mut store,
        &mut FakeCompiler::default(),
        &request(PageRange::Unspecified, false, false),
    )
    .expect("first build failed");
    assert!(fixture.config.build_dir.join("main.pdf").exists());
    fs::remove_file(&first.artifact).unwrap();

    let mut silent = FakeCompiler {
        silent: true,
        ..FakeCompiler::default()
    };
    let err = build(
        &fixture.config,
        &mut store,
        &mut silent,
        &request("2".parse().unwrap(), false, false),
    )
    .unwrap_err();

    assert!(matches!(err, BuildError::ArtifactMissing(_)), "got {:?}", err);
    assert!(!fixture.course_dir.join("07_Functions_test.pdf").exists());
    assert_eq!(store.record("2030302", "07").unwrap().count, 1);
}
