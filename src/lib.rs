//! treeaccess: identity-stable node accessors, view state and keyboard
//! navigation for editing schema-defined trees, plus a terminal editor
//! built on them.

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod file;
pub mod input;
pub mod reactive;
pub mod scheduler;
pub mod ui;
