//! Events consumed by the workflow engine and tasks it hands back.
//!
//! Terminal keys are translated into [`Action`]s by the TUI layer before
//! they reach the engine, so the engine never sees raw key codes.

use crate::ai::{AiStageError, BuildError, ReleaseText};
use crate::core::modal::ModalOutcome;
use crate::git::{WorkspaceCommit, WorkspaceHistory};

/// A semantic key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// Confirm / select
    Enter,
    /// Cancel / go back
    Esc,
    /// Insert a line break in a text area
    Newline,
    Char(char),
    Backspace,
    Delete,
    DeleteLine,
    NextField,
    PrevField,
    /// Start a new commit or release
    New,
    /// Edit the highlighted record or the AI response
    Edit,
    /// Delete the highlighted record
    Remove,
    /// Toggle the highlighted commit in a multi-selection
    Toggle,
    /// Start fuzzy filtering of the current list
    Filter,
    /// Run the AI pipeline
    BuildWithAi,
    Help,
    /// Quit from a list view
    Quit,
    /// Quit from anywhere, modal or not
    ForceQuit,
}

/// Result of a background run, tagged with its generation.
#[derive(Debug, Clone)]
pub enum AsyncResult {
    CommitBuilt { generation: u64, result: Result<CommitBuildOutput, BuildError> },
    ReleaseBuilt { generation: u64, result: Result<ReleaseText, AiStageError> },
    /// Commit history for the release picker; the error is git's message
    HistoryLoaded { generation: u64, result: Result<WorkspaceHistory, String> },
}

impl AsyncResult {
    pub fn generation(&self) -> u64 {
        match self {
            Self::CommitBuilt { generation, .. }
            | Self::ReleaseBuilt { generation, .. }
            | Self::HistoryLoaded { generation, .. } => *generation,
        }
    }
}

/// Successful commit build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitBuildOutput {
    /// Title the user typed
    pub original: String,
    /// Final message from the format stage
    pub translated: String,
    /// Diff the run was built from, when it was freshly collected
    pub diff_snapshot: Option<String>,
}

/// Everything the engine reacts to.
#[derive(Debug, Clone)]
pub enum Event {
    Key(Action),
    Resize { width: u16, height: u16 },
    Tick,
    AsyncResult(AsyncResult),
    /// A modal closed with this outcome
    Modal(ModalOutcome),
}

/// Where the commit pipeline gets its diff context from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSource {
    /// Use the diff saved with a previously persisted commit
    Stored(String),
    /// Collect the staged diff, capped at `max_chars`
    Staged { max_chars: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitBuildRequest {
    pub generation: u64,
    pub api_key: String,
    pub title: String,
    pub commit_type: String,
    pub scope: String,
    pub diff: DiffSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBuildRequest {
    pub generation: u64,
    pub api_key: String,
    pub commits: Vec<WorkspaceCommit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest {
    pub generation: u64,
    pub max_commits: usize,
}

/// Work the engine asks the runtime to perform off the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    BuildCommit(CommitBuildRequest),
    BuildRelease(ReleaseBuildRequest),
    LoadHistory(HistoryRequest),
}

impl Task {
    pub fn generation(&self) -> u64 {
        match self {
            Self::BuildCommit(req) => req.generation,
            Self::BuildRelease(req) => req.generation,
            Self::LoadHistory(req) => req.generation,
        }
    }
}
