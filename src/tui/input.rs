//! Input handling for the TUI.
//!
//! Translates crossterm key events into engine [`Action`]s. The mapping
//! depends on whether the current view takes text input: `j` moves the
//! highlight in a list but is a plain character in the message editor.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::WizardState;
use crate::core::{Action, Event, Task};
use crate::App;

/// Feed a key event to the engine and return the tasks it produced.
pub fn handle_key(key: KeyEvent, app: &mut App) -> Vec<Task> {
    match map_key(key, app) {
        Some(action) => app.dispatch(Event::Key(action)),
        None => Vec::new(),
    }
}

/// Map a key event to an action for the current view.
pub fn map_key(key: KeyEvent, app: &App) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Action::ForceQuit);
    }
    if app.modal.is_open() {
        return map_modal_key(key);
    }
    if app.accepts_text() {
        return map_text_key(key);
    }
    map_list_key(key, app)
}

fn map_modal_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::Esc),
        KeyCode::Enter => Some(Action::Enter),
        KeyCode::Up => Some(Action::Up),
        KeyCode::Down => Some(Action::Down),
        KeyCode::Char(c) => Some(Action::Char(c)),
        _ => None,
    }
}

fn map_text_key(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let newline_modifier = key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);

    let action = match key.code {
        KeyCode::Enter if newline_modifier => Action::Newline,
        KeyCode::Enter => Action::Enter,
        KeyCode::Esc => Action::Esc,
        KeyCode::Tab => Action::NextField,
        KeyCode::BackTab => Action::PrevField,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Char('b') if ctrl => Action::BuildWithAi,
        KeyCode::Char('e') if ctrl => Action::Edit,
        KeyCode::Char('k') if ctrl => Action::DeleteLine,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(c) => Action::Char(c),
        _ => return None,
    };
    Some(action)
}

fn map_list_key(key: KeyEvent, app: &App) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    let action = match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Home | KeyCode::Char('g') => Action::Home,
        KeyCode::End | KeyCode::Char('G') => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Enter => Action::Enter,
        KeyCode::Esc => Action::Esc,
        KeyCode::Tab => Action::NextField,
        KeyCode::BackTab => Action::PrevField,
        KeyCode::Char('b') if ctrl => Action::BuildWithAi,
        KeyCode::Char('e') if ctrl => Action::Edit,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char('/') => Action::Filter,
        KeyCode::Char('?') => Action::Help,
        KeyCode::Char(' ') => Action::Toggle,
        KeyCode::Char('n') => Action::New,
        KeyCode::Char('e') => Action::Edit,
        KeyCode::Char('d') => Action::Remove,
        KeyCode::Char('q') if is_menu(app.state) => Action::Quit,
        KeyCode::Char(c) => Action::Char(c),
        _ => return None,
    };
    Some(action)
}

fn is_menu(state: WizardState) -> bool {
    matches!(state, WizardState::ChoosingCommit | WizardState::ReleaseMainMenu)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::{AppMode, Focus};
    use crate::core::{Config, CredentialStore, ModalRequest, SqliteStore};
    use crate::git::testing::ScriptedGit;
    use crate::git::GitResolver;

    fn create_key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn new_app(api_key: Option<&str>) -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.ai.api_key = api_key.map(str::to_string);
        let app = App::new(
            config,
            AppMode::Commit,
            dir.path().to_path_buf(),
            Box::new(SqliteStore::open_in_memory().unwrap()),
            Arc::new(GitResolver::new(Box::new(ScriptedGit::default()))),
            CredentialStore::new(dir.path().join(".env")),
        )
        .unwrap();
        (app, dir)
    }

    #[test]
    fn test_ctrl_c_is_force_quit_everywhere() {
        let (mut app, _dir) = new_app(Some("key"));
        let ctrl_c = create_key_event(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c, &app), Some(Action::ForceQuit));

        app.modal.open(ModalRequest::confirmation("sure?", None));
        assert_eq!(map_key(ctrl_c, &app), Some(Action::ForceQuit));

        handle_key(ctrl_c, &mut app);
        assert!(app.should_quit);
    }

    #[test]
    fn test_list_keys() {
        let (app, _dir) = new_app(Some("key"));
        let key = |c| map_key(create_key_event(KeyCode::Char(c), KeyModifiers::NONE), &app);

        assert_eq!(key('j'), Some(Action::Down));
        assert_eq!(key('k'), Some(Action::Up));
        assert_eq!(key('n'), Some(Action::New));
        assert_eq!(key('d'), Some(Action::Remove));
        assert_eq!(key('q'), Some(Action::Quit));
        assert_eq!(key('/'), Some(Action::Filter));
        assert_eq!(key(' '), Some(Action::Toggle));
    }

    #[test]
    fn test_text_keys() {
        let (mut app, _dir) = new_app(Some("key"));
        app.state = WizardState::WritingMessage;
        app.focus = Focus::Message;

        let plain = |c| create_key_event(KeyCode::Char(c), KeyModifiers::NONE);
        assert_eq!(map_key(plain('j'), &app), Some(Action::Char('j')));
        assert_eq!(map_key(plain('q'), &app), Some(Action::Char('q')));
        assert_eq!(
            map_key(create_key_event(KeyCode::Char('b'), KeyModifiers::CONTROL), &app),
            Some(Action::BuildWithAi)
        );
        assert_eq!(
            map_key(create_key_event(KeyCode::Enter, KeyModifiers::SHIFT), &app),
            Some(Action::Newline)
        );
        assert_eq!(map_key(create_key_event(KeyCode::Enter, KeyModifiers::NONE), &app), Some(Action::Enter));
    }

    #[test]
    fn test_typing_api_key() {
        let (mut app, _dir) = new_app(None);
        assert_eq!(app.state, WizardState::SettingCredential);

        for c in "abc".chars() {
            handle_key(create_key_event(KeyCode::Char(c), KeyModifiers::NONE), &mut app);
        }
        handle_key(create_key_event(KeyCode::Backspace, KeyModifiers::NONE), &mut app);
        assert_eq!(app.api_key_input.value(), "ab");
    }

    #[test]
    fn test_help_toggle() {
        let (mut app, _dir) = new_app(Some("key"));
        handle_key(create_key_event(KeyCode::Char('?'), KeyModifiers::NONE), &mut app);
        assert!(app.show_help);

        handle_key(create_key_event(KeyCode::Esc, KeyModifiers::NONE), &mut app);
        assert!(!app.show_help);
    }
}
