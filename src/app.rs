//! Application state and the workflow engine.
//!
//! [`App`] owns every piece of wizard state and advances it one [`Event`]
//! at a time through [`App::dispatch`]. Work that must not block the UI is
//! returned as [`Task`]s for the runtime to execute; their results come back
//! later as [`Event::AsyncResult`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use crate::core::{
    Action, AsyncResult, CommitBuildRequest, CommitRecord, CommitType, Config, CredentialStore,
    DiffSource, Event, HistoryRequest, ListEntry, ModalOutcome, ModalOverlay, ModalRequest,
    RecordStore, ReleaseBuildRequest, ReleaseRecord, ScopeBrowser, ScopeError, SelectList, SelectedCommitSet,
    StatusBar, StatusLevel, StoreError, Task, TextArea,
};
use crate::git::{GitResolver, WorkspaceCommit, WorkspaceHistory};
use crate::tui::Theme;

/// Label of the release action that prints the release and quits.
pub const PRINT_RELEASE: &str = "Print release";
/// Label of the release action that deletes the release.
pub const DELETE_RELEASE: &str = "Delete release";

const PAGE: usize = 10;

/// Every state the wizard can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardState {
    SettingCredential,
    ChoosingCommit,
    ChoosingType,
    ChoosingScope,
    WritingMessage,
    EditingMessage,
    ReleaseMainMenu,
    ReleaseChoosingCommits,
    ReleaseBuildingText,
    Confirming,
}

impl WizardState {
    pub const ALL: [Self; 10] = [
        Self::SettingCredential,
        Self::ChoosingCommit,
        Self::ChoosingType,
        Self::ChoosingScope,
        Self::WritingMessage,
        Self::EditingMessage,
        Self::ReleaseMainMenu,
        Self::ReleaseChoosingCommits,
        Self::ReleaseBuildingText,
        Self::Confirming,
    ];

    /// Heading shown above the state's view.
    pub fn title(self) -> &'static str {
        match self {
            Self::SettingCredential => "API key",
            Self::ChoosingCommit => "Commit history",
            Self::ChoosingType => "Commit type",
            Self::ChoosingScope => "Commit scope",
            Self::WritingMessage => "Commit message",
            Self::EditingMessage => "Edit AI response",
            Self::ReleaseMainMenu => "Release history",
            Self::ReleaseChoosingCommits => "Release commits",
            Self::ReleaseBuildingText => "Building release",
            Self::Confirming => "Confirm release",
        }
    }
}

/// Which wizard the session runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Commit,
    Release,
}

impl AppMode {
    /// The state the mode's menu lives in.
    pub fn menu_state(self) -> WizardState {
        match self {
            Self::Commit => WizardState::ChoosingCommit,
            Self::Release => WizardState::ReleaseMainMenu,
        }
    }
}

/// Focused pane of the message view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Message,
    AiResponse,
}

/// The commit under construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftCommit {
    pub commit_type: String,
    pub scope: String,
    pub message_original: String,
    pub message_translated: String,
    pub diff_snapshot: String,
    /// Set when the draft was loaded from a saved commit
    pub editing_id: Option<i64>,
}

impl DraftCommit {
    fn from_record(record: &CommitRecord) -> Self {
        Self {
            commit_type: record.commit_type.clone(),
            scope: record.scope.clone(),
            message_original: record.message_original.clone(),
            message_translated: record.message_translated.clone(),
            diff_snapshot: record.diff_snapshot.clone(),
            editing_id: Some(record.id),
        }
    }
}

/// A built release waiting for a release type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseDraft {
    pub title: String,
    pub body: String,
    pub branch: String,
    pub version: String,
    pub commits: Vec<WorkspaceCommit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingKind {
    Commit,
    Release,
    /// Loading the commit history for a new release
    History,
}

/// The one outstanding background run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    pub generation: u64,
    pub kind: PendingKind,
    /// State the result is applied in
    pub issued_in: WizardState,
}

/// Branch and tag captured when a release pass starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseContext {
    pub branch: String,
    pub version: String,
}

/// Main application state.
pub struct App {
    pub state: WizardState,
    pub mode: AppMode,
    /// Absolute repository root; scopes every stored record
    pub workspace: PathBuf,
    pub config: Config,
    pub theme: Theme,
    pub status: StatusBar,
    pub modal: ModalOverlay,

    pub api_key_input: TextArea,
    pub commits: SelectList<CommitRecord>,
    pub commit_types: SelectList<CommitType>,
    pub scope: Option<ScopeBrowser>,
    pub draft: DraftCommit,
    pub focus: Focus,
    pub message_input: TextArea,
    pub edit_input: TextArea,
    pub ai_scroll: u16,

    pub releases: SelectList<ReleaseRecord>,
    pub release_commits: SelectList<WorkspaceCommit>,
    pub selection: SelectedCommitSet,
    pub release_context: ReleaseContext,
    pub release_draft: Option<ReleaseDraft>,
    pub preview_scroll: u16,

    pub pending: Option<PendingRequest>,
    next_generation: u64,

    pub show_help: bool,
    pub size: (u16, u16),
    pub should_quit: bool,
    /// Printed to stdout after the terminal is restored
    pub final_message: Option<String>,

    store: Box<dyn RecordStore>,
    resolver: Arc<GitResolver>,
    credentials: CredentialStore,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("workspace", &self.workspace)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

/// Consume list filter input. Returns `true` when the action was handled.
fn filter_input<T: ListEntry>(list: &mut SelectList<T>, action: Action) -> bool {
    if !list.is_filtering() {
        return match action {
            Action::Filter => {
                list.start_filter();
                true
            }
            Action::Esc if !list.filter().is_empty() => {
                list.clear_filter();
                true
            }
            _ => false,
        };
    }

    match action {
        Action::Char(c) => list.push_filter_char(c),
        Action::Backspace => list.pop_filter_char(),
        Action::Esc => list.clear_filter(),
        Action::Enter | Action::Filter => list.accept_filter(),
        Action::Up => list.select_previous(),
        Action::Down => list.select_next(),
        _ => return false,
    }
    true
}

/// Move the highlight. Returns `true` when the action was handled.
fn navigate<T: ListEntry>(list: &mut SelectList<T>, action: Action) -> bool {
    match action {
        Action::Up => list.select_previous(),
        Action::Down => list.select_next(),
        Action::Home => list.select_first(),
        Action::End => list.select_last(),
        Action::PageUp => list.page_up(PAGE),
        Action::PageDown => list.page_down(PAGE),
        _ => return false,
    }
    true
}

fn edit_text(area: &mut TextArea, action: Action) {
    match action {
        Action::Char(c) => area.insert_char(c),
        Action::Newline => area.insert_newline(),
        Action::Backspace => area.backspace(),
        Action::Delete => area.delete(),
        Action::DeleteLine => area.delete_line(),
        Action::Left => area.move_left(),
        Action::Right => area.move_right(),
        Action::Up => area.move_up(),
        Action::Down => area.move_down(),
        Action::Home => area.move_home(),
        Action::End => area.move_end(),
        _ => {}
    }
}

fn scroll(offset: &mut u16, action: Action) {
    match action {
        Action::Up => *offset = offset.saturating_sub(1),
        Action::Down => *offset = offset.saturating_add(1),
        Action::PageUp => *offset = offset.saturating_sub(PAGE as u16),
        Action::PageDown => *offset = offset.saturating_add(PAGE as u16),
        Action::Home => *offset = 0,
        _ => {}
    }
}

impl App {
    /// Create the engine. Starts in `SettingCredential` when no API key is
    /// configured, otherwise in the mode's menu.
    pub fn new(
        config: Config,
        mode: AppMode,
        workspace: PathBuf,
        store: Box<dyn RecordStore>,
        resolver: Arc<GitResolver>,
        credentials: CredentialStore,
    ) -> Result<Self, StoreError> {
        let theme = Theme::by_name(&config.ui.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.ui.theme, "unknown theme, using default");
            Theme::default()
        });
        let commit_types = SelectList::new(config.commit_types().to_vec());

        let mut app = Self {
            state: WizardState::SettingCredential,
            mode,
            workspace,
            config,
            theme,
            status: StatusBar::default(),
            modal: ModalOverlay::default(),
            api_key_input: TextArea::single_line(),
            commits: SelectList::default(),
            commit_types,
            scope: None,
            draft: DraftCommit::default(),
            focus: Focus::Message,
            message_input: TextArea::new(),
            edit_input: TextArea::new(),
            ai_scroll: 0,
            releases: SelectList::default(),
            release_commits: SelectList::default(),
            selection: SelectedCommitSet::new(),
            release_context: ReleaseContext::default(),
            release_draft: None,
            preview_scroll: 0,
            pending: None,
            next_generation: 0,
            show_help: false,
            size: (0, 0),
            should_quit: false,
            final_message: None,
            store,
            resolver,
            credentials,
        };

        app.reload_commits()?;
        app.reload_releases()?;

        if app.config.ai.api_key.is_some() {
            app.enter(mode.menu_state());
        } else {
            app.enter(WizardState::SettingCredential);
        }

        Ok(app)
    }

    /// Shared git resolver (the task runner uses it for diffs).
    pub fn resolver(&self) -> Arc<GitResolver> {
        Arc::clone(&self.resolver)
    }

    fn workspace_key(&self) -> String {
        self.workspace.to_string_lossy().into_owned()
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Whether plain characters are text input in the current view.
    pub fn accepts_text(&self) -> bool {
        match self.state {
            WizardState::SettingCredential | WizardState::EditingMessage => true,
            WizardState::WritingMessage => self.focus == Focus::Message,
            WizardState::ChoosingCommit => self.commits.is_filtering(),
            WizardState::ChoosingType => self.commit_types.is_filtering(),
            WizardState::ChoosingScope => {
                self.scope.as_ref().is_some_and(|s| s.entries.is_filtering())
            }
            WizardState::ReleaseMainMenu => self.releases.is_filtering(),
            WizardState::ReleaseChoosingCommits => self.release_commits.is_filtering(),
            WizardState::ReleaseBuildingText | WizardState::Confirming => false,
        }
    }

    /// Switch state and show its default status. Leaving the state a
    /// pending request was issued in abandons that request.
    fn enter(&mut self, state: WizardState) {
        if let Some(pending) = self.pending {
            if pending.issued_in != state {
                tracing::debug!(generation = pending.generation, ?state, "abandoning pending request");
                self.pending = None;
                self.status.stop_spinner();
            }
        }

        tracing::debug!(from = ?self.state, to = ?state, "state transition");
        self.state = state;

        let (level, message) = match state {
            WizardState::SettingCredential => {
                (StatusLevel::Warning, "Enter your Groq API key to continue".to_string())
            }
            WizardState::ChoosingCommit => {
                (StatusLevel::Info, "n: new commit, e: edit, d: delete, enter: use message".to_string())
            }
            WizardState::ChoosingType => {
                (StatusLevel::Info, "Select a prefix for the commit".to_string())
            }
            WizardState::ChoosingScope => (StatusLevel::Info, self.scope_status()),
            WizardState::WritingMessage => {
                (StatusLevel::Info, "Write your summary of the changes".to_string())
            }
            WizardState::EditingMessage => (
                StatusLevel::Warning,
                "You are making modifications to the AI's response".to_string(),
            ),
            WizardState::ReleaseMainMenu => {
                (StatusLevel::Info, "n: new release, d: delete, enter: actions".to_string())
            }
            WizardState::ReleaseChoosingCommits => (
                StatusLevel::Info,
                "space: toggle a commit, enter: build the release notes".to_string(),
            ),
            WizardState::ReleaseBuildingText => {
                (StatusLevel::Warning, "Making a request to the AI. Please wait ...".to_string())
            }
            WizardState::Confirming => {
                (StatusLevel::Info, "enter: choose a release type, esc: back".to_string())
            }
        };
        self.status.set(level, message);
    }

    fn scope_status(&self) -> String {
        let relative = self.scope.as_ref().map(ScopeBrowser::relative_pwd).unwrap_or_default();
        format!("Choose a file or folder for your commit ::: /{}", relative.display())
    }

    fn issue(&mut self, kind: PendingKind, issued_in: WizardState) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.pending = Some(PendingRequest { generation, kind, issued_in });
        self.status.start_spinner();
        tracing::info!(generation, ?kind, "background request issued");
        generation
    }

    fn reload_commits(&mut self) -> Result<(), StoreError> {
        let records = self.store.list_commits(&self.workspace_key())?;
        self.commits.set_items(records);
        Ok(())
    }

    fn reload_releases(&mut self) -> Result<(), StoreError> {
        let records = self.store.list_releases(&self.workspace_key())?;
        self.releases.set_items(records);
        Ok(())
    }

    /// Advance the engine by one event.
    pub fn dispatch(&mut self, event: Event) -> Vec<Task> {
        match event {
            Event::Key(Action::ForceQuit) => {
                self.quit();
                Vec::new()
            }
            Event::Key(action) if self.modal.is_open() => match self.modal.handle(action) {
                Some(outcome) => self.dispatch(Event::Modal(outcome)),
                None => Vec::new(),
            },
            Event::Key(action) => self.on_key(action),
            Event::Modal(outcome) => self.on_modal_outcome(outcome),
            Event::AsyncResult(result) => {
                self.on_async_result(result);
                Vec::new()
            }
            Event::Resize { width, height } => {
                self.size = (width, height);
                Vec::new()
            }
            Event::Tick => {
                self.status.tick();
                Vec::new()
            }
        }
    }

    fn on_key(&mut self, action: Action) -> Vec<Task> {
        if self.show_help {
            if matches!(action, Action::Esc | Action::Help | Action::Quit) {
                self.show_help = false;
            }
            return Vec::new();
        }
        if action == Action::Help && !self.accepts_text() {
            self.show_help = !self.show_help;
            return Vec::new();
        }

        match self.state {
            WizardState::SettingCredential => self.on_setting_credential(action),
            WizardState::ChoosingCommit => self.on_choosing_commit(action),
            WizardState::ChoosingType => self.on_choosing_type(action),
            WizardState::ChoosingScope => self.on_choosing_scope(action),
            WizardState::WritingMessage => return self.on_writing_message(action),
            WizardState::EditingMessage => self.on_editing_message(action),
            WizardState::ReleaseMainMenu => return self.on_release_main_menu(action),
            WizardState::ReleaseChoosingCommits => return self.on_release_choosing_commits(action),
            WizardState::ReleaseBuildingText => self.on_release_building_text(action),
            WizardState::Confirming => self.on_confirming(action),
        }
        Vec::new()
    }

    // ========================================================================
    // Commit wizard
    // ========================================================================

    fn on_setting_credential(&mut self, action: Action) {
        match action {
            Action::Enter => self.save_api_key(),
            Action::Esc => self.api_key_input.clear(),
            other => edit_text(&mut self.api_key_input, other),
        }
    }

    fn save_api_key(&mut self) {
        let key = self.api_key_input.value().trim().to_string();
        if key.is_empty() {
            self.status.error("The API key cannot be empty");
            return;
        }

        if let Err(err) = self.credentials.save(&key) {
            tracing::error!(error = %err, "failed to save API key");
            self.status.error(format!("Could not save the API key: {err}"));
            return;
        }

        self.config.ai.api_key = Some(key);
        self.api_key_input.clear();
        self.enter(self.mode.menu_state());
        self.status.success(format!("API key saved to {}", self.credentials.path().display()));
    }

    fn on_choosing_commit(&mut self, action: Action) {
        if filter_input(&mut self.commits, action) || navigate(&mut self.commits, action) {
            return;
        }

        match action {
            Action::Quit => self.quit(),
            Action::New => self.start_commit_wizard(),
            Action::Edit => self.edit_selected_commit(),
            Action::Remove => {
                let Some(record) = self.commits.selected() else {
                    self.status.warning("There is no commit to delete");
                    return;
                };
                let request = ModalRequest::confirmation(
                    format!("Are you sure you want to delete the Item with the Id={}?", record.id),
                    Some(record.id),
                );
                self.modal.open(request);
            }
            Action::Enter => {
                let Some(record) = self.commits.selected() else {
                    self.status.warning("There is no commit to use");
                    return;
                };
                self.final_message = Some(self.config.final_commit_message(
                    &record.commit_type,
                    &record.scope,
                    &record.message_translated,
                ));
                self.quit();
            }
            _ => {}
        }
    }

    fn start_commit_wizard(&mut self) {
        self.draft = DraftCommit::default();
        self.message_input.clear();
        self.edit_input.clear();
        self.scope = None;
        self.focus = Focus::Message;
        self.commit_types.clear_filter();
        self.commit_types.select_first();
        self.enter(WizardState::ChoosingType);
    }

    fn edit_selected_commit(&mut self) {
        let Some(record) = self.commits.selected() else {
            self.status.warning("There is no commit to edit");
            return;
        };

        self.draft = DraftCommit::from_record(record);
        self.message_input.set_value(&self.draft.message_original);
        self.scope = None;
        self.focus = Focus::Message;
        self.ai_scroll = 0;
        let id = record.id;
        self.enter(WizardState::WritingMessage);
        self.status.info(format!("Editing commit #{id}; ctrl+b rebuilds it from the saved diff"));
    }

    fn on_choosing_type(&mut self, action: Action) {
        if filter_input(&mut self.commit_types, action) || navigate(&mut self.commit_types, action) {
            return;
        }

        match action {
            Action::Esc => {
                self.draft = DraftCommit::default();
                self.enter(WizardState::ChoosingCommit);
            }
            Action::Enter => self.choose_type(),
            _ => {}
        }
    }

    fn choose_type(&mut self) {
        let Some(tag) = self.commit_types.selected().map(|t| t.tag.clone()) else {
            self.status.warning("No commit type matches the filter");
            return;
        };

        let snapshot = match self.resolver.status_snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!(error = %err, "failed to read repository status");
                self.status.error(err.to_string());
                return;
            }
        };
        let has_changes = snapshot.has_staged_changes();

        match ScopeBrowser::open(snapshot) {
            Ok(browser) => {
                self.draft.commit_type = tag;
                self.scope = Some(browser);
                self.enter(WizardState::ChoosingScope);
                if !has_changes {
                    self.status.warning("No staged changes found. Stage files with `git add` first");
                }
            }
            Err(err) => self.status.error(err.to_string()),
        }
    }

    fn on_choosing_scope(&mut self, action: Action) {
        let Some(browser) = self.scope.as_mut() else {
            self.enter(WizardState::ChoosingType);
            return;
        };
        if filter_input(&mut browser.entries, action) || navigate(&mut browser.entries, action) {
            return;
        }

        let moved = match action {
            Action::Left => browser.ascend(),
            Action::Right => browser.descend(),
            Action::Esc => {
                self.draft.commit_type.clear();
                self.draft.scope.clear();
                self.scope = None;
                self.enter(WizardState::ChoosingType);
                return;
            }
            Action::Enter => {
                let Some(scope) = browser.selected_scope() else {
                    self.status.warning("Nothing to select here");
                    return;
                };
                self.draft.scope = scope;
                self.focus = Focus::Message;
                self.enter(WizardState::WritingMessage);
                return;
            }
            _ => return,
        };

        match moved {
            Ok(()) => {
                let message = self.scope_status();
                self.status.info(message);
            }
            Err(err @ (ScopeError::OutsideWorkspace | ScopeError::NotADirectory(_))) => {
                self.status.warning(err.to_string());
            }
            Err(err) => self.status.error(err.to_string()),
        }
    }

    fn on_writing_message(&mut self, action: Action) -> Vec<Task> {
        match action {
            Action::Esc => self.cancel_message(),
            Action::NextField | Action::PrevField => {
                self.focus = match self.focus {
                    Focus::Message => Focus::AiResponse,
                    Focus::AiResponse => Focus::Message,
                };
            }
            Action::BuildWithAi => return self.request_commit_build(),
            Action::Edit => self.start_editing(),
            Action::Enter => self.confirm_commit(),
            other => match self.focus {
                Focus::Message => edit_text(&mut self.message_input, other),
                Focus::AiResponse => scroll(&mut self.ai_scroll, other),
            },
        }
        Vec::new()
    }

    fn cancel_message(&mut self) {
        if self.draft.editing_id.is_some() || self.scope.is_none() {
            self.draft = DraftCommit::default();
            self.message_input.clear();
            self.enter(WizardState::ChoosingCommit);
        } else {
            self.draft.scope.clear();
            self.enter(WizardState::ChoosingScope);
        }
    }

    fn request_commit_build(&mut self) -> Vec<Task> {
        if self.pending.is_some() {
            self.status.warning("An AI request is already running. Please wait ...");
            return Vec::new();
        }

        let title = self.message_input.value().trim().to_string();
        if title.is_empty() {
            self.status.error("Write your summary of the changes before asking the AI");
            return Vec::new();
        }
        let Some(api_key) = self.config.ai.api_key.clone() else {
            self.status.error("No API key configured");
            return Vec::new();
        };

        let diff = if self.draft.editing_id.is_some() {
            DiffSource::Stored(self.draft.diff_snapshot.clone())
        } else {
            DiffSource::Staged { max_chars: self.config.prompts.summary_prompt_max_diff_size }
        };

        let generation = self.issue(PendingKind::Commit, WizardState::WritingMessage);
        self.status.warning("Making a request to the AI. Please wait ...");

        vec![Task::BuildCommit(CommitBuildRequest {
            generation,
            api_key,
            title,
            commit_type: self.draft.commit_type.clone(),
            scope: self.draft.scope.clone(),
            diff,
        })]
    }

    fn start_editing(&mut self) {
        if self.pending.is_some() {
            self.status.warning("Wait for the AI request to finish before editing");
            return;
        }
        if self.draft.message_translated.is_empty() {
            self.status.error("You need to first make a request to the AI to continue!!");
            return;
        }

        self.edit_input.set_value(&self.draft.message_translated);
        self.enter(WizardState::EditingMessage);
    }

    fn confirm_commit(&mut self) {
        if self.draft.message_translated.trim().is_empty() {
            self.status.error("You need to first make a request to the AI to continue!!");
            return;
        }
        if self.pending.is_some() {
            self.status.warning("Wait for the AI request to finish before saving");
            return;
        }

        let record = CommitRecord {
            id: self.draft.editing_id.unwrap_or_default(),
            commit_type: self.draft.commit_type.clone(),
            scope: self.draft.scope.clone(),
            message_original: self.draft.message_original.clone(),
            message_translated: self.draft.message_translated.clone(),
            diff_snapshot: self.draft.diff_snapshot.clone(),
            workspace: self.workspace_key(),
            created_at: Utc::now(),
        };

        let saved = match self.draft.editing_id {
            Some(_) => self.store.update_commit(&record),
            None => self.store.create_commit(&record).map(|_| ()),
        };
        if let Err(err) = saved {
            tracing::error!(error = %err, "failed to save commit");
            self.status.error(format!("Could not save the commit: {err}"));
            return;
        }

        self.draft = DraftCommit::default();
        self.message_input.clear();
        self.scope = None;
        self.enter(WizardState::ChoosingCommit);
        match self.reload_commits() {
            Ok(()) => self.status.success("Record created in the db successfully"),
            Err(err) => self.status.fatal(format!("Saved, but the history could not be reloaded: {err}")),
        }
    }

    fn on_editing_message(&mut self, action: Action) {
        match action {
            Action::Esc => {
                self.edit_input.clear();
                self.enter(WizardState::WritingMessage);
                self.status.info("No change was applied");
            }
            Action::Enter => {
                self.draft.message_translated = self.edit_input.value();
                self.edit_input.clear();
                self.enter(WizardState::WritingMessage);
                self.status.success("Changes applied");
            }
            other => edit_text(&mut self.edit_input, other),
        }
    }

    // ========================================================================
    // Release wizard
    // ========================================================================

    fn on_release_main_menu(&mut self, action: Action) -> Vec<Task> {
        if filter_input(&mut self.releases, action) || navigate(&mut self.releases, action) {
            return Vec::new();
        }

        match action {
            Action::Quit => self.quit(),
            Action::New => return self.start_release(),
            Action::Remove => {
                if let Some(id) = self.releases.selected().map(|r| r.id) {
                    self.confirm_release_delete(id);
                } else {
                    self.status.warning("There is no release to delete");
                }
            }
            Action::Enter => {
                let Some(id) = self.releases.selected().map(|r| r.id) else {
                    self.status.warning("There is no release selected");
                    return Vec::new();
                };
                let choices = vec![PRINT_RELEASE.to_string(), DELETE_RELEASE.to_string()];
                self.modal.open(ModalRequest::list_choice("Select an action", choices, Some(id)));
            }
            _ => {}
        }
        Vec::new()
    }

    fn confirm_release_delete(&mut self, id: i64) {
        self.modal.open(ModalRequest::confirmation(
            format!("Are you sure you want to delete the Item with the Id={id}?"),
            Some(id),
        ));
    }

    /// Ask the runtime for the recent commit history. The picker opens
    /// once it arrives.
    fn start_release(&mut self) -> Vec<Task> {
        if self.pending.is_some() {
            self.status.warning("Still loading the commit history. Please wait ...");
            return Vec::new();
        }

        let generation = self.issue(PendingKind::History, WizardState::ReleaseMainMenu);
        self.status.info("Loading the commit history ...");

        vec![Task::LoadHistory(HistoryRequest {
            generation,
            max_commits: self.config.release.max_commits,
        })]
    }

    fn open_commit_picker(&mut self, history: WorkspaceHistory) {
        if history.commits.is_empty() {
            self.status.warning("This workspace has no commits yet");
            return;
        }

        self.release_context = ReleaseContext { branch: history.branch, version: history.version };
        self.release_commits.clear_filter();
        self.release_commits.set_items(history.commits);
        self.release_commits.select_first();
        self.selection.clear();
        self.enter(WizardState::ReleaseChoosingCommits);
    }

    fn on_release_choosing_commits(&mut self, action: Action) -> Vec<Task> {
        if filter_input(&mut self.release_commits, action)
            || navigate(&mut self.release_commits, action)
        {
            return Vec::new();
        }

        match action {
            Action::Toggle => {
                if let Some(commit) = self.release_commits.selected().cloned() {
                    self.selection.toggle(&commit);
                    self.status.info(format!("{} commit(s) selected", self.selection.len()));
                }
            }
            Action::Esc => {
                self.selection.clear();
                self.enter(WizardState::ReleaseMainMenu);
            }
            Action::Enter => return self.request_release_build(),
            _ => {}
        }
        Vec::new()
    }

    fn request_release_build(&mut self) -> Vec<Task> {
        if self.selection.is_empty() {
            self.status.error("Select at least one commit to build a release");
            return Vec::new();
        }
        let Some(api_key) = self.config.ai.api_key.clone() else {
            self.status.error("No API key configured");
            return Vec::new();
        };

        self.preview_scroll = 0;
        self.enter(WizardState::ReleaseBuildingText);
        let generation = self.issue(PendingKind::Release, WizardState::ReleaseBuildingText);

        vec![Task::BuildRelease(ReleaseBuildRequest {
            generation,
            api_key,
            commits: self.selection.ordered().to_vec(),
        })]
    }

    fn on_release_building_text(&mut self, action: Action) {
        match action {
            Action::Esc => {
                self.enter(WizardState::ReleaseChoosingCommits);
                self.status.info("Release build abandoned");
            }
            other => scroll(&mut self.preview_scroll, other),
        }
    }

    fn on_confirming(&mut self, action: Action) {
        match action {
            Action::Enter => {
                if self.config.release.types.is_empty() {
                    self.status.error("No release types configured");
                    return;
                }
                let types = self.config.release.types.clone();
                self.modal.open(ModalRequest::list_choice("Select the release type", types, None));
            }
            Action::Esc => {
                self.release_draft = None;
                self.enter(WizardState::ReleaseChoosingCommits);
            }
            other => scroll(&mut self.preview_scroll, other),
        }
    }

    fn save_release(&mut self, release_type: String) {
        let Some(draft) = self.release_draft.clone() else {
            self.status.error("There is no release to save");
            return;
        };

        let record = ReleaseRecord {
            id: 0,
            release_type,
            title: draft.title,
            body: draft.body,
            branch: draft.branch,
            commit_hashes: draft.commits.iter().map(|c| c.hash.clone()).collect(),
            version: draft.version,
            workspace: self.workspace_key(),
            created_at: Utc::now(),
        };

        if let Err(err) = self.store.create_release(&record) {
            tracing::error!(error = %err, "failed to save release");
            self.status.error(format!("Could not save the release: {err}"));
            return;
        }

        self.release_draft = None;
        self.selection.clear();
        self.enter(WizardState::ReleaseMainMenu);
        match self.reload_releases() {
            Ok(()) => self.status.success("Record created in the db successfully"),
            Err(err) => self.status.fatal(format!("Saved, but the history could not be reloaded: {err}")),
        }
    }

    // ========================================================================
    // Modal outcomes and async results
    // ========================================================================

    fn on_modal_outcome(&mut self, outcome: ModalOutcome) -> Vec<Task> {
        match (self.state, outcome) {
            (_, ModalOutcome::Cancelled) => self.status.info("No change was applied"),

            (WizardState::ChoosingCommit, ModalOutcome::Confirmed { target_id: Some(id) }) => {
                let deleted = self.store.delete_commit(id).and_then(|()| self.reload_commits());
                match deleted {
                    Ok(()) => self.status.success(format!("Commit {id} deleted")),
                    Err(err) => self.status.error(format!("Could not delete the commit: {err}")),
                }
            }

            (WizardState::ReleaseMainMenu, ModalOutcome::Confirmed { target_id: Some(id) }) => {
                let deleted = self.store.delete_release(id).and_then(|()| self.reload_releases());
                match deleted {
                    Ok(()) => self.status.success(format!("Release {id} deleted")),
                    Err(err) => self.status.error(format!("Could not delete the release: {err}")),
                }
            }

            (WizardState::ReleaseMainMenu, ModalOutcome::Chosen { target_id: Some(id), label }) => {
                match label.as_str() {
                    PRINT_RELEASE => {
                        if let Some(release) = self.releases.items().iter().find(|r| r.id == id) {
                            self.final_message = Some(format!("{}\n\n{}", release.title, release.body));
                            self.quit();
                        }
                    }
                    DELETE_RELEASE => self.confirm_release_delete(id),
                    other => tracing::debug!(label = other, "unknown release action"),
                }
            }

            (WizardState::Confirming, ModalOutcome::Chosen { label, .. }) => self.save_release(label),

            (state, outcome) => {
                tracing::debug!(?state, ?outcome, "modal outcome ignored");
            }
        }
        Vec::new()
    }

    fn on_async_result(&mut self, result: AsyncResult) {
        let generation = result.generation();
        let kind = match result {
            AsyncResult::CommitBuilt { .. } => PendingKind::Commit,
            AsyncResult::ReleaseBuilt { .. } => PendingKind::Release,
            AsyncResult::HistoryLoaded { .. } => PendingKind::History,
        };
        let live = self.pending.is_some_and(|p| {
            p.generation == generation && p.kind == kind && p.issued_in == self.state
        });
        if !live {
            tracing::debug!(generation, state = ?self.state, "dropping stale result");
            return;
        }

        self.pending = None;
        self.status.stop_spinner();

        match result {
            AsyncResult::CommitBuilt { result: Ok(output), .. } => {
                self.draft.message_original = output.original;
                self.draft.message_translated = output.translated;
                if let Some(diff) = output.diff_snapshot {
                    self.draft.diff_snapshot = diff;
                }
                self.ai_scroll = 0;
                self.status.success("AI commit message ready!");
            }
            AsyncResult::CommitBuilt { result: Err(err), .. } => {
                tracing::warn!(error = %err, "commit build failed");
                self.status.error(err.to_string());
            }
            AsyncResult::ReleaseBuilt { result: Ok(text), .. } => {
                self.release_draft = Some(ReleaseDraft {
                    title: text.title,
                    body: text.body,
                    branch: self.release_context.branch.clone(),
                    version: self.release_context.version.clone(),
                    commits: self.selection.ordered().to_vec(),
                });
                self.preview_scroll = 0;
                self.enter(WizardState::Confirming);
                self.status.success("Release notes ready! Press enter to choose a release type");
            }
            AsyncResult::ReleaseBuilt { result: Err(err), .. } => {
                tracing::warn!(error = %err, "release build failed");
                self.enter(WizardState::ReleaseChoosingCommits);
                self.status.error(err.to_string());
            }
            AsyncResult::HistoryLoaded { result: Ok(history), .. } => {
                self.open_commit_picker(history);
            }
            AsyncResult::HistoryLoaded { result: Err(err), .. } => {
                tracing::error!(error = %err, "failed to read commit history");
                self.status.error(err);
            }
        }
    }

    /// Root of the repository the session works in.
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SqliteStore;
    use crate::git::testing::ScriptedGit;
    use crate::git::GitOutput;

    fn app_with(api_key: Option<&str>, mode: AppMode) -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.ai.api_key = api_key.map(str::to_string);
        let resolver = GitResolver::new(Box::new(ScriptedGit::default().with(
            "rev-parse --show-toplevel",
            GitOutput::ok(dir.path().display().to_string()),
        )));

        let app = App::new(
            config,
            mode,
            dir.path().to_path_buf(),
            Box::new(SqliteStore::open_in_memory().unwrap()),
            Arc::new(resolver),
            CredentialStore::new(dir.path().join("cfg").join(".env")),
        )
        .unwrap();
        (app, dir)
    }

    #[test]
    fn test_initial_state_depends_on_credentials() {
        let (app, _dir) = app_with(None, AppMode::Commit);
        assert_eq!(app.state, WizardState::SettingCredential);

        let (app, _dir) = app_with(Some("key"), AppMode::Commit);
        assert_eq!(app.state, WizardState::ChoosingCommit);

        let (app, _dir) = app_with(Some("key"), AppMode::Release);
        assert_eq!(app.state, WizardState::ReleaseMainMenu);
    }

    #[test]
    fn test_saving_credential_enters_menu() {
        let (mut app, dir) = app_with(None, AppMode::Release);
        for c in "gsk_123".chars() {
            app.dispatch(Event::Key(Action::Char(c)));
        }
        app.dispatch(Event::Key(Action::Enter));

        assert_eq!(app.state, WizardState::ReleaseMainMenu);
        assert_eq!(app.config.ai.api_key.as_deref(), Some("gsk_123"));
        let saved = std::fs::read_to_string(dir.path().join("cfg").join(".env")).unwrap();
        assert_eq!(saved, "GROQ_API_KEY=gsk_123\n");
    }

    #[test]
    fn test_empty_credential_is_rejected() {
        let (mut app, _dir) = app_with(None, AppMode::Commit);
        app.dispatch(Event::Key(Action::Enter));
        assert_eq!(app.state, WizardState::SettingCredential);
        assert_eq!(app.status.level(), StatusLevel::Error);
    }

    #[test]
    fn test_every_event_keeps_state_in_enum() {
        let actions = [
            Action::Up,
            Action::Down,
            Action::Left,
            Action::Right,
            Action::Enter,
            Action::Esc,
            Action::Char('x'),
            Action::Toggle,
            Action::New,
            Action::Edit,
            Action::Remove,
            Action::Filter,
            Action::BuildWithAi,
            Action::NextField,
        ];

        for action in actions {
            let (mut app, _dir) = app_with(Some("key"), AppMode::Commit);
            app.dispatch(Event::Key(action));
            app.dispatch(Event::Tick);
            assert!(WizardState::ALL.contains(&app.state));
        }
    }

    #[test]
    fn test_ticks_do_not_change_state() {
        let (mut app, _dir) = app_with(Some("key"), AppMode::Release);
        for _ in 0..5 {
            app.dispatch(Event::Tick);
        }
        app.dispatch(Event::Resize { width: 120, height: 40 });
        assert_eq!(app.state, WizardState::ReleaseMainMenu);
        assert_eq!(app.size, (120, 40));
    }

    #[test]
    fn test_force_quit_with_modal_open() {
        let (mut app, _dir) = app_with(Some("key"), AppMode::Commit);
        app.modal.open(ModalRequest::confirmation("sure?", None));
        app.dispatch(Event::Key(Action::ForceQuit));
        assert!(app.should_quit);
    }

    /// Accepts writes, then fails every listing.
    struct UnreadableAfterWrite {
        inner: SqliteStore,
        written: bool,
    }

    impl UnreadableAfterWrite {
        fn check(&self) -> Result<(), StoreError> {
            if self.written {
                return Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery));
            }
            Ok(())
        }
    }

    impl RecordStore for UnreadableAfterWrite {
        fn create_commit(&mut self, record: &CommitRecord) -> Result<i64, StoreError> {
            self.written = true;
            self.inner.create_commit(record)
        }

        fn update_commit(&mut self, record: &CommitRecord) -> Result<(), StoreError> {
            self.written = true;
            self.inner.update_commit(record)
        }

        fn list_commits(&self, workspace: &str) -> Result<Vec<CommitRecord>, StoreError> {
            self.check()?;
            self.inner.list_commits(workspace)
        }

        fn delete_commit(&mut self, id: i64) -> Result<(), StoreError> {
            self.inner.delete_commit(id)
        }

        fn create_release(&mut self, record: &ReleaseRecord) -> Result<i64, StoreError> {
            self.written = true;
            self.inner.create_release(record)
        }

        fn list_releases(&self, workspace: &str) -> Result<Vec<ReleaseRecord>, StoreError> {
            self.check()?;
            self.inner.list_releases(workspace)
        }

        fn delete_release(&mut self, id: i64) -> Result<(), StoreError> {
            self.inner.delete_release(id)
        }
    }

    #[test]
    fn test_unreadable_history_after_save_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.ai.api_key = Some("key".to_string());
        let store = UnreadableAfterWrite { inner: SqliteStore::open_in_memory().unwrap(), written: false };

        let mut app = App::new(
            config,
            AppMode::Commit,
            dir.path().to_path_buf(),
            Box::new(store),
            Arc::new(GitResolver::new(Box::new(ScriptedGit::default()))),
            CredentialStore::new(dir.path().join(".env")),
        )
        .unwrap();

        app.state = WizardState::WritingMessage;
        app.draft.commit_type = "FIX".to_string();
        app.draft.scope = "main.rs".to_string();
        app.draft.message_translated = "Fix the crash".to_string();
        app.dispatch(Event::Key(Action::Enter));

        assert_eq!(app.state, WizardState::ChoosingCommit);
        assert_eq!(app.status.level(), StatusLevel::Fatal);
        assert!(app.status.content().starts_with("Saved, but"));
    }

    #[test]
    fn test_new_release_waits_for_history() {
        let (mut app, _dir) = app_with(Some("key"), AppMode::Release);

        let tasks = app.dispatch(Event::Key(Action::New));
        let generation = match tasks.as_slice() {
            [Task::LoadHistory(request)] => {
                assert_eq!(request.max_commits, 100);
                request.generation
            }
            other => panic!("unexpected tasks: {other:?}"),
        };
        assert_eq!(app.state, WizardState::ReleaseMainMenu);
        assert!(app.status.is_spinning());

        assert!(app.dispatch(Event::Key(Action::New)).is_empty());
        assert_eq!(app.status.level(), StatusLevel::Warning);

        app.dispatch(Event::AsyncResult(AsyncResult::HistoryLoaded {
            generation,
            result: Err("`git log` failed".to_string()),
        }));
        assert_eq!(app.state, WizardState::ReleaseMainMenu);
        assert_eq!(app.status.level(), StatusLevel::Error);
        assert!(!app.status.is_spinning());
        assert!(app.pending.is_none());
    }
}
