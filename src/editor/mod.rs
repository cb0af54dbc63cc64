//! The accessor engine, view state and keyboard navigation.
//!
//! # Modules
//!
//! - `tree_state`: id-keyed UI flags and the active node
//! - `navigator`: visible order, parent and child lookups
//! - `accessor`: identity-stable node accessors and their views
//! - `tree`: the owner handle tying model, state and cache together
//! - `mode` / `keyboard`: the navigation state machine
//! - `clipboard`: targets for the Copy menu
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use serde_json::json;
//! use treeaccess::document::value_tree::ValueTree;
//! use treeaccess::editor::keyboard::KeyboardNavigation;
//! use treeaccess::editor::mode::NavMode;
//! use treeaccess::editor::tree::EditorTree;
//! use treeaccess::input::keys::Key;
//! use treeaccess::input::pointer::PointerEvents;
//! use treeaccess::scheduler::ManualScheduler;
//!
//! let tree = EditorTree::with_defaults(ValueTree::from_json(&json!({"a": 1, "b": 2})));
//! let nav = KeyboardNavigation::new(
//!     tree.clone(),
//!     Rc::new(ManualScheduler::new()),
//!     Rc::new(PointerEvents::new()),
//! );
//!
//! nav.handle_key(Key::Down.into());
//! nav.handle_key(Key::Down.into());
//! let active = tree.state().active_node_id().unwrap();
//! assert_eq!(tree.get(&active).unwrap().name(), "a");
//!
//! nav.handle_key(Key::Enter.into());
//! tree.state().set_focused(&active, true);
//! assert_eq!(nav.mode(), NavMode::EditName);
//! ```

pub mod accessor;
pub mod clipboard;
pub mod keyboard;
pub mod mode;
pub mod navigator;
pub mod tree;
pub mod tree_state;
