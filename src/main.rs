// ABOUTME: Main entry point for the slide-build program.
// ABOUTME: Provides CLI interface and executes a build through the library.

use anyhow::Context;
use clap::Parser;
use slide_build::{BuildRequest, Config, JsonSlideStore, PageRange, ProcessCompiler};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Build a Beamer deck from a course directory", long_about = None)]
struct Cli {
    /// Subject code as registered in slideinfo.json
    subject: String,

    /// Course directory name under the subject
    course: String,

    /// Frame range to build, e.g. 5 or 3-7
    #[arg(short, long)]
    page: Option<PageRange>,

    /// Handout mode (disable \pause)
    #[arg(long)]
    ho: bool,

    /// Teacher mode (include instructor notes)
    #[arg(long)]
    tech: bool,

    /// Timeout in seconds for each compiler pass
    #[arg(long)]
    timeout: Option<u64>,

    /// Keep intermediate files in the build directory
    #[arg(long)]
    keep_build: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> anyhow::Result<PathBuf> {
    let mut config = Config::from_env();
    if let Some(timeout) = cli.timeout {
        config.compile_timeout_secs = timeout;
    }
    config.keep_build |= cli.keep_build;

    let mut store = JsonSlideStore::open(&config.store_path)
        .with_context(|| format!("Failed to open slide info {:?}", config.store_path))?;
    let mut compiler = ProcessCompiler::new();

    let request = BuildRequest {
        subject: cli.subject.clone(),
        course: cli.course.clone(),
        page_range: cli.page.unwrap_or_default(),
        handout: cli.ho,
        teacher: cli.tech,
    };

    let outcome = slide_build::build(&config, &mut store, &mut compiler, &request)?;
    Ok(outcome.artifact)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&cli) {
        Ok(artifact) => {
            println!("Output: {}", artifact.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
