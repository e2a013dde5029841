// ABOUTME: Frame extraction module for the slide-build application
// ABOUTME: Locates \begin{frame}...\end{frame} blocks and selects a contiguous range of them

use crate::errors::{BuildError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Smallest span from an opening frame marker to the next closing one.
/// Frames never nest, so the lazy match is exact.
static RE_FRAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\begin\{frame\}.*?\\end\{frame\}").unwrap());

/// 1-based inclusive frame range requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRange {
    /// Build the whole document
    #[default]
    Unspecified,
    Span { first: usize, last: usize },
}

impl PageRange {
    /// Normalise a raw request: `first` is at least 1, `last` at least `first`.
    pub fn span(first: usize, last: usize) -> Self {
        let first = first.max(1);
        PageRange::Span {
            first,
            last: last.max(first),
        }
    }

    pub fn is_specified(&self) -> bool {
        matches!(self, PageRange::Span { .. })
    }
}

impl FromStr for PageRange {
    type Err = BuildError;

    /// Accepts `""`, `N` or `N-M`. `0` means the first frame.
    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        if input.is_empty() {
            return Ok(PageRange::Unspecified);
        }

        let invalid = |reason: &str| BuildError::InvalidPageRange {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        if let Some((start, end)) = input.split_once('-') {
            let first = start
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid("expected integers in 'start-end' form"))?;
            let last = end
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid("expected integers in 'start-end' form"))?;
            Ok(PageRange::span(first, last))
        } else {
            let page = input
                .parse::<usize>()
                .map_err(|_| invalid("expected an integer"))?;
            Ok(PageRange::span(page, page))
        }
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRange::Unspecified => write!(f, "all"),
            PageRange::Span { first, last } if first == last => write!(f, "{}", first),
            PageRange::Span { first, last } => write!(f, "{}-{}", first, last),
        }
    }
}

/// Byte ranges of every frame in the document, in order of appearance
pub fn find_frame_positions(tex: &str) -> Vec<Range<usize>> {
    RE_FRAME.find_iter(tex).map(|m| m.range()).collect()
}

/// Concatenate frames `first..=last` (1-based), joined by a blank line.
///
/// Out-of-range ordinals are clamped to the available frames. An empty
/// string means nothing was selected and the caller should build the
/// whole document instead.
pub fn extract_frames(tex: &str, first: usize, last: usize) -> String {
    let positions = find_frame_positions(tex);
    if positions.is_empty() {
        return String::new();
    }

    let first = first.max(1);
    let last = last.min(positions.len());
    if first > last {
        return String::new();
    }

    positions[first - 1..last]
        .iter()
        .map(|r| &tex[r.clone()])
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Apply a page range to a document. `Unspecified` returns the text unchanged.
pub fn select_frames(tex: &str, range: PageRange) -> String {
    match range {
        PageRange::Unspecified => tex.to_string(),
        PageRange::Span { first, last } => extract_frames(tex, first, last),
    }
}
