//! The capability interface between the editor core and a tree model.
//!
//! The editor never stores a copy of the data it edits. It reads and mutates
//! the tree through [`TreeModel`], which both the row model
//! ([`ValueTree`](super::value_tree::ValueTree)) and the schema model
//! ([`SchemaTree`](super::schema_tree::SchemaTree)) implement.
//!
//! # Example
//!
//! ```
//! use treeaccess::document::model::{NodeKind, Scalar, TreeModel};
//! use treeaccess::document::value_tree::ValueTree;
//! use serde_json::json;
//!
//! let tree = ValueTree::from_json(&json!({"name": "Ada", "tags": ["a", "b"]}));
//! let root = tree.root_id();
//! let children = tree.child_ids(&root);
//! assert_eq!(children.len(), 2);
//! assert_eq!(tree.kind(&children[1]), Some(NodeKind::Array));
//! assert_eq!(tree.scalar(&children[0]), Some(Scalar::Text("Ada".into())));
//! ```

use std::fmt;

use crate::error::TreeError;

/// Stable identifier of a node within one tree.
///
/// Ids survive in-place edits (value changes, renames, array moves) and only
/// change when a node is structurally replaced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Hands out sequential ids (`n1`, `n2`, ...).
#[derive(Debug, Clone, Default)]
pub(crate) struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub(crate) fn next_id(&mut self) -> NodeId {
        self.next += 1;
        NodeId(format!("n{}", self.next))
    }
}

/// Closed set of node shapes the editor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Object,
    Array,
    Primitive,
    ForeignKey,
    Ref,
}

impl NodeKind {
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Object | NodeKind::Array)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Object => "object",
            NodeKind::Array => "array",
            NodeKind::Primitive => "primitive",
            NodeKind::ForeignKey => "foreignKey",
            NodeKind::Ref => "ref",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive value as it currently sits in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Parses user input, detecting the type.
    ///
    /// - `"true"`/`"false"` become booleans
    /// - `"null"` becomes null
    /// - anything that parses as a number becomes a number
    /// - everything else is kept verbatim as text
    ///
    /// ```
    /// use treeaccess::document::model::Scalar;
    ///
    /// assert_eq!(Scalar::parse("42"), Scalar::Number(42.0));
    /// assert_eq!(Scalar::parse(" true "), Scalar::Bool(true));
    /// assert_eq!(Scalar::parse("hi there"), Scalar::Text("hi there".into()));
    /// ```
    pub fn parse(input: &str) -> Scalar {
        let trimmed = input.trim();
        match trimmed {
            "true" => return Scalar::Bool(true),
            "false" => return Scalar::Bool(false),
            "null" => return Scalar::Null,
            _ => {}
        }
        if let Ok(num) = trimmed.parse::<f64>() {
            if num.is_finite() {
                return Scalar::Number(num);
            }
        }
        Scalar::Text(input.to_string())
    }

    pub fn from_json(value: &serde_json::Value) -> Option<Scalar> {
        match value {
            serde_json::Value::Null => Some(Scalar::Null),
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => n.as_f64().map(Scalar::Number),
            serde_json::Value::String(s) => Some(Scalar::Text(s.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Number(n) => number_to_json(*n),
            Scalar::Text(s) => serde_json::Value::String(s.clone()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "boolean",
            Scalar::Number(_) => "number",
            Scalar::Text(_) => "string",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", format_number(*n)),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        serde_json::Value::Number(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

/// Formats whole numbers without a trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A structural or value change requested by the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Append a new item built from `value` to the end of an array.
    PushItem {
        array: NodeId,
        value: serde_json::Value,
    },
    /// Remove the item at `index`.
    RemoveAt { array: NodeId, index: usize },
    /// Move the item at `from` to `to`, keeping its id.
    Move {
        array: NodeId,
        from: usize,
        to: usize,
    },
    /// Insert a new field named `name` at `index` of an object.
    InsertField {
        object: NodeId,
        index: usize,
        name: String,
    },
    /// Remove a node from whatever container holds it.
    Remove { id: NodeId },
    /// Rename an object field.
    Rename { id: NodeId, name: String },
    /// Replace the value of a primitive (or the default of a schema field).
    SetValue { id: NodeId, value: Scalar },
    /// Replace the node by a fresh node of another kind. The replacement gets
    /// a new id.
    ChangeKind { id: NodeId, kind: NodeKind },
}

/// Read and mutate access to a tree of nodes.
///
/// Read methods take unknown ids without complaint and answer `None`, an
/// empty list or `false`. Only [`TreeModel::apply`] returns errors.
pub trait TreeModel {
    /// Editor-specific state kept on every accessor of this model.
    type Extension: Default;

    fn root_id(&self) -> NodeId;

    fn contains(&self, id: &NodeId) -> bool;

    fn kind(&self, id: &NodeId) -> Option<NodeKind>;

    /// Display name: object key, array index, or schema field name.
    fn name(&self, id: &NodeId) -> Option<String>;

    fn parent_id(&self, id: &NodeId) -> Option<NodeId>;

    /// Current children, re-derived on every call.
    fn child_ids(&self, id: &NodeId) -> Vec<NodeId>;

    /// Runtime value of a primitive (or foreign key) node.
    fn scalar(&self, id: &NodeId) -> Option<Scalar>;

    /// Human readable path from the root, empty for the root itself.
    fn path_of(&self, id: &NodeId) -> String;

    /// Plain JSON rendering of the subtree.
    fn plain_value(&self, id: &NodeId) -> Option<serde_json::Value>;

    fn is_dirty(&self, id: &NodeId) -> bool;

    /// Whether the editor may offer to delete this node.
    fn can_remove(&self, id: &NodeId) -> bool;

    /// Whether array children are a user-editable list (rows) rather than a
    /// single item definition (schemas).
    fn is_item_list(&self, id: &NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Array)
    }

    /// Applies a mutation. Returns the id of a node the mutation created, if
    /// any.
    fn apply(&mut self, mutation: Mutation) -> Result<Option<NodeId>, TreeError>;

    fn child_count(&self, id: &NodeId) -> usize {
        self.child_ids(id).len()
    }

    /// Position of `id` among its parent's children.
    fn index_in_parent(&self, id: &NodeId) -> Option<usize> {
        let parent = self.parent_id(id)?;
        self.child_ids(&parent).iter().position(|c| c == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_values() {
        assert_eq!(Scalar::parse("false"), Scalar::Bool(false));
        assert_eq!(Scalar::parse("null"), Scalar::Null);
        assert_eq!(Scalar::parse("-3.5"), Scalar::Number(-3.5));
        assert_eq!(Scalar::parse("  padded "), Scalar::Text("  padded ".into()));
        assert_eq!(Scalar::parse("inf"), Scalar::Text("inf".into()));
    }

    #[test]
    fn test_number_json_roundtrip_keeps_integers() {
        assert_eq!(Scalar::Number(3.0).to_json(), serde_json::json!(3));
        assert_eq!(Scalar::Number(2.5).to_json(), serde_json::json!(2.5));
        assert_eq!(Scalar::Number(7.0).to_string(), "7");
    }

    #[test]
    fn test_id_generator_is_sequential() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.next_id(), NodeId::from("n1"));
        assert_eq!(ids.next_id(), NodeId::from("n2"));
    }

    #[test]
    fn test_node_kind_container() {
        assert!(NodeKind::Object.is_container());
        assert!(NodeKind::Array.is_container());
        assert!(!NodeKind::ForeignKey.is_container());
        assert_eq!(NodeKind::ForeignKey.to_string(), "foreignKey");
    }
}
