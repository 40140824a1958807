//! Single-slot modal overlay.
//!
//! While a modal is open it captures every key action; closing it yields a
//! [`ModalOutcome`] that the engine handles like any other event.

use super::event::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// Yes/no question
    Confirmation,
    /// Pick one label from a list
    ListChoice,
}

/// What to show and which record it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalRequest {
    pub kind: ModalKind,
    pub title: String,
    pub message: String,
    pub target_id: Option<i64>,
    pub choices: Vec<String>,
}

impl ModalRequest {
    pub fn confirmation(message: impl Into<String>, target_id: Option<i64>) -> Self {
        Self {
            kind: ModalKind::Confirmation,
            title: "Confirm".to_string(),
            message: message.into(),
            target_id,
            choices: Vec::new(),
        }
    }

    pub fn list_choice(
        title: impl Into<String>,
        choices: Vec<String>,
        target_id: Option<i64>,
    ) -> Self {
        Self {
            kind: ModalKind::ListChoice,
            title: title.into(),
            message: String::new(),
            target_id,
            choices,
        }
    }
}

/// How a modal was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    Cancelled,
    Confirmed { target_id: Option<i64> },
    Chosen { target_id: Option<i64>, label: String },
}

#[derive(Debug, Clone)]
struct ActiveModal {
    request: ModalRequest,
    selected: usize,
}

/// Holds at most one open modal.
#[derive(Debug, Clone, Default)]
pub struct ModalOverlay {
    slot: Option<ActiveModal>,
}

impl ModalOverlay {
    /// Open `request`. Returns `false` and leaves the current modal in place
    /// when one is already open.
    pub fn open(&mut self, request: ModalRequest) -> bool {
        if self.slot.is_some() {
            tracing::warn!(title = %request.title, "modal already open, request ignored");
            return false;
        }
        self.slot = Some(ActiveModal { request, selected: 0 });
        true
    }

    pub fn is_open(&self) -> bool {
        self.slot.is_some()
    }

    pub fn request(&self) -> Option<&ModalRequest> {
        self.slot.as_ref().map(|m| &m.request)
    }

    pub fn selected(&self) -> usize {
        self.slot.as_ref().map_or(0, |m| m.selected)
    }

    fn close(&mut self, outcome: ModalOutcome) -> Option<ModalOutcome> {
        self.slot = None;
        Some(outcome)
    }

    /// Feed a key action to the open modal. Returns the outcome when the
    /// action closed it.
    pub fn handle(&mut self, action: Action) -> Option<ModalOutcome> {
        let active = self.slot.as_mut()?;
        let target_id = active.request.target_id;

        match (active.request.kind, action) {
            (_, Action::Esc) => self.close(ModalOutcome::Cancelled),

            (ModalKind::Confirmation, Action::Enter | Action::Char('y' | 'Y')) => {
                self.close(ModalOutcome::Confirmed { target_id })
            }
            (ModalKind::Confirmation, Action::Char('n' | 'N')) => {
                self.close(ModalOutcome::Cancelled)
            }

            (ModalKind::ListChoice, Action::Up | Action::Char('k')) => {
                active.selected = active.selected.saturating_sub(1);
                None
            }
            (ModalKind::ListChoice, Action::Down | Action::Char('j')) => {
                if active.selected + 1 < active.request.choices.len() {
                    active.selected += 1;
                }
                None
            }
            (ModalKind::ListChoice, Action::Enter) => {
                match active.request.choices.get(active.selected).cloned() {
                    Some(label) => self.close(ModalOutcome::Chosen { target_id, label }),
                    None => self.close(ModalOutcome::Cancelled),
                }
            }

            _ => None,
        }
    }
}
