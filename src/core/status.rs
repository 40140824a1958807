//! Status bar state: the single line of feedback shown under every view.

/// Severity of a status message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusLevel {
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
    Success,
}

impl StatusLevel {
    /// Short label rendered in front of the message.
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::Success => "OK",
        }
    }
}

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Current status message plus an optional busy spinner.
#[derive(Debug, Clone, Default)]
pub struct StatusBar {
    content: String,
    level: StatusLevel,
    spinner: Option<usize>,
}

impl StatusBar {
    pub fn new(level: StatusLevel, content: impl Into<String>) -> Self {
        Self { content: content.into(), level, spinner: None }
    }

    pub fn set(&mut self, level: StatusLevel, content: impl Into<String>) {
        self.level = level;
        self.content = content.into();
    }

    pub fn info(&mut self, content: impl Into<String>) {
        self.set(StatusLevel::Info, content);
    }

    pub fn warning(&mut self, content: impl Into<String>) {
        self.set(StatusLevel::Warning, content);
    }

    pub fn error(&mut self, content: impl Into<String>) {
        self.set(StatusLevel::Error, content);
    }

    /// The session can no longer trust what it shows.
    pub fn fatal(&mut self, content: impl Into<String>) {
        self.set(StatusLevel::Fatal, content);
    }

    pub fn success(&mut self, content: impl Into<String>) {
        self.set(StatusLevel::Success, content);
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn level(&self) -> StatusLevel {
        self.level
    }

    pub fn start_spinner(&mut self) {
        self.spinner = Some(0);
    }

    pub fn stop_spinner(&mut self) {
        self.spinner = None;
    }

    pub fn is_spinning(&self) -> bool {
        self.spinner.is_some()
    }

    /// Advance the spinner by one frame.
    pub fn tick(&mut self) {
        if let Some(frame) = self.spinner.as_mut() {
            *frame = (*frame + 1) % SPINNER_FRAMES.len();
        }
    }

    pub fn spinner_glyph(&self) -> Option<&'static str> {
        self.spinner.map(|frame| SPINNER_FRAMES[frame])
    }
}
