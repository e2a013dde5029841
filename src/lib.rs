// ABOUTME: Library module for the slide-build program.
// ABOUTME: Contains core functionality for assembling, compiling and publishing Beamer decks.

// Reexport modules
pub mod config;
pub mod document;
pub mod errors;
pub mod frames;
pub mod pipeline;
pub mod publish;
pub mod store;
pub mod theme;
pub mod toolchain;
pub mod utils;

// Reexport common types and functions
pub use config::Config;
pub use document::{TemplateVars, assemble_document};
pub use errors::{BuildError, Result};
pub use frames::{PageRange, extract_frames, find_frame_positions};
pub use pipeline::{BuildOutcome, BuildRequest, build};
pub use publish::{OutputSuffix, output_file_name};
pub use store::{JsonSlideStore, MemoryStore, SlideStore};
pub use theme::{Theme, theme_from_first_line};
pub use toolchain::{CompileState, Compiler, PassOutcome, ProcessCompiler};
