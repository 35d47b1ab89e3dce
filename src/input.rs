//! Key bindings: arrows plus vim-style hjkl.

use crate::game::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Piece(Command),
    Start,
    /// Pause when running, resume when paused.
    TogglePause,
    Restart,
    Quit,
    None,
}

/// Map key event to an action. Only presses count; releases and OS repeats are ignored.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = key;
    if kind != KeyEventKind::Press {
        return Action::None;
    }
    if modifiers == KeyModifiers::CONTROL {
        return match code {
            KeyCode::Char('c') => Action::Quit,
            _ => Action::None,
        };
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Left | KeyCode::Char('h') => Action::Piece(Command::MoveLeft),
        KeyCode::Right | KeyCode::Char('l') => Action::Piece(Command::MoveRight),
        KeyCode::Down | KeyCode::Char('j') => Action::Piece(Command::SoftDrop),
        KeyCode::Up | KeyCode::Char('k') => Action::Piece(Command::Rotate),
        KeyCode::Enter | KeyCode::Char('s' | 'S') => Action::Start,
        KeyCode::Char('p' | 'P') => Action::TogglePause,
        KeyCode::Char('r' | 'R') => Action::Restart,
        _ => Action::None,
    }
}
