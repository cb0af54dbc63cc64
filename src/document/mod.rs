//! Tree models the editor operates on.
//!
//! - `model`: the [`TreeModel`](model::TreeModel) capability trait and shared types
//! - `value_tree`: row values loaded from JSON/YAML
//! - `schema_tree`: table schemas with formulas and diagnostics
//! - `formula`: formula syntax checking

pub mod formula;
pub mod model;
pub mod schema_tree;
pub mod value_tree;
