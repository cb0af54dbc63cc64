//! Keyboard input abstracted from the terminal backend.
//!
//! The navigation state machine only sees [`KeyInput`], so it can be driven
//! from tests or from any front end. [`map_termion_key`] adapts termion keys.

use termion::event::{Event, Key as TermKey};

/// Keys the tree navigation distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Tab,
    Enter,
    F2,
    Insert,
    Delete,
    Backspace,
    Escape,
    Space,
    Char(char),
}

/// A key press with its shift state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

impl From<Key> for KeyInput {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}

/// Maps a termion event to a [`KeyInput`]. Returns `None` for events the
/// tree does not handle (mouse events, unmapped keys).
///
/// # Example
///
/// ```
/// use termion::event::{Event, Key as TermKey};
/// use treeaccess::input::keys::{map_termion_key, Key, KeyInput};
///
/// assert_eq!(
///     map_termion_key(&Event::Key(TermKey::BackTab)),
///     Some(KeyInput::shifted(Key::Tab))
/// );
/// assert_eq!(map_termion_key(&Event::Key(TermKey::Char('\n'))), Some(Key::Enter.into()));
/// ```
pub fn map_termion_key(event: &Event) -> Option<KeyInput> {
    let key = match event {
        Event::Key(k) => *k,
        _ => return None,
    };

    let input = match key {
        TermKey::Up => Key::Up.into(),
        TermKey::Down => Key::Down.into(),
        TermKey::Left => Key::Left.into(),
        TermKey::Right => Key::Right.into(),
        TermKey::Char('\t') => Key::Tab.into(),
        TermKey::BackTab => KeyInput::shifted(Key::Tab),
        TermKey::Char('\n') => Key::Enter.into(),
        TermKey::F(2) => Key::F2.into(),
        TermKey::Insert => Key::Insert.into(),
        TermKey::Delete => Key::Delete.into(),
        TermKey::Backspace => Key::Backspace.into(),
        TermKey::Esc => Key::Escape.into(),
        TermKey::Char(' ') => Key::Space.into(),
        TermKey::Char(c) => KeyInput {
            key: Key::Char(c),
            shift: c.is_uppercase(),
        },
        _ => return None,
    };
    Some(input)
}
