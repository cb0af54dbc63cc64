//! Keyboard navigation modes.
//!
//! # Example
//!
//! ```
//! use treeaccess::editor::mode::NavMode;
//!
//! let mode = NavMode::default();
//! assert_eq!(mode, NavMode::TreeNav);
//! assert_eq!(format!("{}", mode), "TREE_NAV");
//! assert_eq!(format!("{}", NavMode::EditName), "EDIT_NAME");
//! ```

use std::fmt;

/// Who owns the keyboard.
///
/// - `TreeNav`: arrow keys move the active node.
/// - `EditName`: an inline text editor has focus and navigation ignores keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavMode {
    #[default]
    TreeNav,
    EditName,
}

impl fmt::Display for NavMode {
    /// Formats the mode as an uppercase string suitable for the status bar.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavMode::TreeNav => write!(f, "TREE_NAV"),
            NavMode::EditName => write!(f, "EDIT_NAME"),
        }
    }
}
