//! Key classification for typewriter input
//!
//! Converts crossterm key events into the session controller's key alphabet.
//! Alt+char combinations arrive from crossterm as a single event and are
//! classified as `Key::Meta`; a lone Escape starts the controller's two-key
//! look-ahead instead.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::session::Key;

/// Maps terminal key events to classified typewriter keys.
pub struct KeyMapper;

impl KeyMapper {
    /// Classify a key event. Returns `None` for repeats/releases and for
    /// keys the typewriter has no use for (function keys, Ctrl chords, ...).
    pub fn classify(event: &KeyEvent) -> Option<Key> {
        if event.kind != KeyEventKind::Press {
            return None;
        }

        if event.modifiers.contains(KeyModifiers::ALT) {
            if let KeyCode::Char(c) = event.code {
                return Some(Key::Meta(c));
            }
            return None;
        }

        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }

        match event.code {
            // The printable typewriter range
            KeyCode::Char(c) if (' '..='~').contains(&c) => Some(Key::Char(c)),
            KeyCode::Backspace | KeyCode::Delete => Some(Key::Backspace),
            KeyCode::Enter => Some(Key::Enter),
            KeyCode::Esc => Some(Key::Escape),
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down => Some(Key::Arrow),
            _ => None,
        }
    }
}
