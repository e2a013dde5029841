// ABOUTME: Toolchain module for the slide-build application
// ABOUTME: Runs the LaTeX compiler twice with a timeout and classifies the result

use crate::errors::{BuildError, Result};
use crate::theme::Invocation;
use log::{debug, info, warn};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Passes per build; the second one resolves cross-references and navigation
pub const COMPILE_PASSES: u8 = 2;

const MAX_DIAGNOSTIC_LINES: usize = 80;
const MAX_DIAGNOSTIC_CHARS: usize = 3000;
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of one compiler pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed {
        success: bool,
        stdout: String,
        stderr: String,
    },
    TimedOut,
}

impl PassOutcome {
    pub fn succeeded() -> Self {
        PassOutcome::Completed {
            success: true,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn failed(stdout: &str, stderr: &str) -> Self {
        PassOutcome::Completed {
            success: false,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }
}

/// Something that can run one compiler pass
pub trait Compiler {
    fn run_pass(
        &mut self,
        invocation: &Invocation,
        work_dir: &Path,
        timeout: Duration,
    ) -> Result<PassOutcome>;
}

/// Progress of a two-pass compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileState {
    Idle,
    Pass1Running,
    Pass2Running,
    Success,
    Failed { pass: u8, diagnostic: String },
    TimedOut { pass: u8 },
}

impl CompileState {
    pub fn start(self) -> Self {
        match self {
            CompileState::Idle => CompileState::Pass1Running,
            other => other,
        }
    }

    /// Pass number currently running, if any
    pub fn running_pass(&self) -> Option<u8> {
        match self {
            CompileState::Pass1Running => Some(1),
            CompileState::Pass2Running => Some(2),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CompileState::Success | CompileState::Failed { .. } | CompileState::TimedOut { .. }
        )
    }

    /// Transition on the outcome of the running pass. A failure on any pass
    /// is final; there is no retry.
    pub fn advance(self, outcome: PassOutcome) -> Self {
        let pass = match self.running_pass() {
            Some(pass) => pass,
            None => return self,
        };

        match outcome {
            PassOutcome::TimedOut => CompileState::TimedOut { pass },
            PassOutcome::Completed {
                success: false,
                stdout,
                stderr,
            } => CompileState::Failed {
                pass,
                diagnostic: diagnostic_tail(&stdout, &stderr),
            },
            PassOutcome::Completed { success: true, .. } => {
                if pass < COMPILE_PASSES {
                    CompileState::Pass2Running
                } else {
                    CompileState::Success
                }
            }
        }
    }
}

/// Run both passes and verify the artifact exists afterwards
pub fn compile<C: Compiler>(
    compiler: &mut C,
    invocation: &Invocation,
    work_dir: &Path,
    timeout: Duration,
    artifact: &Path,
) -> Result<()> {
    info!("RUN: {}", invocation.command_line());

    let mut state = CompileState::Idle.start();
    while let Some(pass) = state.running_pass() {
        debug!("Compiler pass {} of {}", pass, COMPILE_PASSES);
        let outcome = compiler.run_pass(invocation, work_dir, timeout)?;
        state = state.advance(outcome);
    }

    match state {
        CompileState::Success => {
            if !artifact.exists() {
                return Err(BuildError::ArtifactMissing(artifact.to_path_buf()));
            }
            info!("LaTeX compilation succeeded");
            Ok(())
        }
        CompileState::Failed { pass, diagnostic } => {
            warn!("LaTeX compilation failed on pass {}", pass);
            Err(BuildError::CompileFailed { pass, diagnostic })
        }
        CompileState::TimedOut { pass } => Err(BuildError::CompileTimeout {
            pass,
            timeout_secs: timeout.as_secs(),
        }),
        other => Err(BuildError::UnknownError(format!(
            "compile stopped in non-terminal state {:?}",
            other
        ))),
    }
}

/// Excerpt of compiler output worth showing the user: error lines if there
/// are any, otherwise the end of the log.
pub fn diagnostic_tail(stdout: &str, stderr: &str) -> String {
    let errors: Vec<&str> = stdout
        .lines()
        .chain(stderr.lines())
        .filter(|line| line.starts_with("! ") || line.to_lowercase().contains("error"))
        .collect();

    if !errors.is_empty() {
        let skip = errors.len().saturating_sub(MAX_DIAGNOSTIC_LINES);
        return errors[skip..].join("\n");
    }

    let source = if stdout.trim().is_empty() {
        stderr
    } else {
        stdout
    };
    tail_chars(source, MAX_DIAGNOSTIC_CHARS).to_string()
}

fn tail_chars(s: &str, max: usize) -> &str {
    let count = s.chars().count();
    if count <= max {
        return s;
    }
    match s.char_indices().nth(count - max) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

/// Runs the real compiler as a child process
#[derive(Debug, Default)]
pub struct ProcessCompiler;

impl ProcessCompiler {
    pub fn new() -> Self {
        Self
    }
}

fn drain<R: Read + Send + 'static>(reader: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut r) = reader {
            let _ = r.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Kill and reap a child that is no longer wanted
pub(crate) fn stop_child(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

impl Compiler for ProcessCompiler {
    fn run_pass(
        &mut self,
        invocation: &Invocation,
        work_dir: &Path,
        timeout: Duration,
    ) -> Result<PassOutcome> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                BuildError::ConfigError(format!(
                    "failed to start '{}': {}",
                    invocation.program, e
                ))
            })?;

        // Pipes are drained on their own threads so a chatty compiler
        // cannot block on a full buffer while we wait for it.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break Some(status),
                Ok(None) => {}
                Err(e) => {
                    stop_child(&mut child);
                    return Err(e.into());
                }
            }
            if Instant::now() >= deadline {
                warn!("Compiler exceeded {:?}, killing it", timeout);
                stop_child(&mut child);
                break None;
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        Ok(match status {
            Some(status) => PassOutcome::Completed {
                success: status.success(),
                stdout,
                stderr,
            },
            None => PassOutcome::TimedOut,
        })
    }
}
