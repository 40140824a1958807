//! Core types and functionality for CommitCraft.
//!
//! This module contains the building blocks the workflow engine is made
//! of: configuration, persistence, events, and the small stateful widgets
//! (lists, text areas, modals) the views render.

mod background;
mod config;
mod editor;
mod event;
mod list;
mod modal;
mod scope;
mod selection;
mod status;
mod store;

pub use background::{run_commit_build, TaskRunner};
pub use config::{
    default_commit_types, resolve_commit_types, AiConfig, CommitFormatConfig, CommitType,
    CommitTypesConfig, Config, ConfigError, ConfigPaths, CredentialStore, MergeBehavior,
    PromptConfig, ReleaseConfig, UiConfig, API_KEY_VAR, LOCAL_CONFIG_FILE,
};
pub use editor::TextArea;
pub use event::{
    Action, AsyncResult, CommitBuildOutput, CommitBuildRequest, DiffSource, Event,
    HistoryRequest, ReleaseBuildRequest, Task,
};
pub use list::{ListEntry, SelectList};
pub use modal::{ModalKind, ModalOutcome, ModalOverlay, ModalRequest};
pub use scope::{FileEntry, ScopeBrowser, ScopeError};
pub use selection::SelectedCommitSet;
pub use status::{StatusBar, StatusLevel};
pub use store::{CommitRecord, RecordStore, ReleaseRecord, SqliteStore, StoreError};
