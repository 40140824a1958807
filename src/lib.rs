//! # CommitCraft
//!
//! AI-assisted commit and release messages in your terminal.
//!
//! CommitCraft walks you through a short wizard (commit type, scope, a one
//! line summary), sends your staged diff through a three-stage language model
//! pipeline and keeps every message it produced in a per-repository history.
//! A second wizard turns a selection of commits into release notes.
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a commit message for the staged changes
//! git commit -m "$(commitcraft)"
//!
//! # Build release notes from past commits
//! commitcraft --release
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod ai;
pub mod app;
pub mod core;
pub mod git;
pub mod tui;

// Re-export commonly used types
pub use app::{App, AppMode, WizardState};
pub use core::{Config, Event};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "commitcraft";
