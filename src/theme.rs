// ABOUTME: Theme resolution module for the slide-build application
// ABOUTME: Picks the Beamer theme, its template and its compiler invocation from the first line

use crate::errors::{BuildError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static RE_THEME_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"@@@--\((.*?)\)--@@@").unwrap());

/// Supported Beamer themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    SimpleDarkBlue,
    Metropolis,
}

/// A compiler command line, run from the build directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl Theme {
    /// Name as written inside the marker
    pub fn name(&self) -> &'static str {
        match self {
            Theme::SimpleDarkBlue => "SimpleDarkBlue",
            Theme::Metropolis => "metropolis",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SimpleDarkBlue" => Some(Theme::SimpleDarkBlue),
            "metropolis" => Some(Theme::Metropolis),
            _ => None,
        }
    }

    /// Template file under the templates directory
    pub fn template_file(&self) -> &'static str {
        match self {
            Theme::SimpleDarkBlue => "main_template.txt",
            Theme::Metropolis => "metro_template.txt",
        }
    }

    /// Compiler command for `main_tex`. Metropolis needs shell escape and
    /// the latexmk driver; the default theme compiles with plain lualatex.
    pub fn invocation(&self, main_tex: &str) -> Invocation {
        match self {
            Theme::SimpleDarkBlue => {
                Invocation::new("lualatex", &["-interaction=nonstopmode", main_tex])
            }
            Theme::Metropolis => Invocation::new(
                "latexmk",
                &[
                    "-lualatex",
                    "-shell-escape",
                    "-interaction=nonstopmode",
                    "-file-line-error",
                    main_tex,
                ],
            ),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve the theme from a document's first line.
///
/// No marker selects the default theme; a marker naming an unknown theme
/// is an error.
pub fn theme_from_first_line(first_line: &str) -> Result<Theme> {
    match RE_THEME_MARKER.captures(first_line) {
        None => Ok(Theme::default()),
        Some(caps) => {
            let value = &caps[1];
            Theme::from_name(value).ok_or_else(|| BuildError::InvalidTheme(value.to_string()))
        }
    }
}

/// Resolve the theme of a whole document. Only the first line is inspected.
pub fn theme_for_document(tex: &str) -> Result<Theme> {
    theme_from_first_line(tex.lines().next().unwrap_or(""))
}
