//! Row values as an id-addressed tree.
//!
//! `ValueTree` stores every node in an arena keyed by [`NodeId`], with parent
//! links, so that nodes keep their identity while the tree around them is
//! reshaped. Array items are named by their current index; moving an item
//! changes its name but never its id.
//!
//! # Example
//!
//! ```
//! use treeaccess::document::model::{Mutation, TreeModel};
//! use treeaccess::document::value_tree::ValueTree;
//! use serde_json::json;
//!
//! let mut tree = ValueTree::from_json(&json!({"tags": ["a", "b", "c"]}));
//! let tags = tree.resolve_path("tags").unwrap();
//! let first = tree.resolve_path("tags[0]").unwrap();
//!
//! tree.apply(Mutation::Move { array: tags.clone(), from: 0, to: 2 }).unwrap();
//! assert_eq!(tree.name(&first).as_deref(), Some("2"));
//! assert_eq!(tree.plain_value(&tags), Some(json!(["b", "c", "a"])));
//! ```

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::Value;

use super::model::{IdGenerator, Mutation, NodeId, NodeKind, Scalar, TreeModel};
use crate::error::TreeError;

#[derive(Debug, Clone, PartialEq)]
enum Content {
    Object(IndexMap<String, NodeId>),
    Array(Vec<NodeId>),
    Primitive(Scalar),
    ForeignKey { table: String, value: Scalar },
    Ref { reference: String, value: Value },
}

impl Content {
    fn kind(&self) -> NodeKind {
        match self {
            Content::Object(_) => NodeKind::Object,
            Content::Array(_) => NodeKind::Array,
            Content::Primitive(_) => NodeKind::Primitive,
            Content::ForeignKey { .. } => NodeKind::ForeignKey,
            Content::Ref { .. } => NodeKind::Ref,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ValueNode {
    parent: Option<NodeId>,
    content: Content,
}

/// A tree of row values with stable node ids and dirty tracking.
#[derive(Debug, Clone)]
pub struct ValueTree {
    nodes: HashMap<NodeId, ValueNode>,
    root: NodeId,
    ids: IdGenerator,
    dirty: HashSet<NodeId>,
}

impl ValueTree {
    /// Builds a tree from a JSON document. Nothing is marked dirty.
    pub fn from_json(value: &Value) -> Self {
        let mut tree = Self {
            nodes: HashMap::new(),
            root: NodeId::from(""),
            ids: IdGenerator::default(),
            dirty: HashSet::new(),
        };
        tree.root = tree.build(value, None);
        tree
    }

    /// An empty object root.
    pub fn new() -> Self {
        Self::from_json(&Value::Object(serde_json::Map::new()))
    }

    fn build(&mut self, value: &Value, parent: Option<NodeId>) -> NodeId {
        let id = self.ids.next_id();
        let content = match value {
            Value::Object(map) => {
                let mut fields = IndexMap::new();
                for (key, child) in map {
                    let child_id = self.build(child, Some(id.clone()));
                    fields.insert(key.clone(), child_id);
                }
                Content::Object(fields)
            }
            Value::Array(items) => {
                let ids = items
                    .iter()
                    .map(|item| self.build(item, Some(id.clone())))
                    .collect();
                Content::Array(ids)
            }
            other => Content::Primitive(Scalar::from_json(other).unwrap_or(Scalar::Null)),
        };
        self.nodes.insert(id.clone(), ValueNode { parent, content });
        id
    }

    fn node(&self, id: &NodeId) -> Result<&ValueNode, TreeError> {
        self.nodes
            .get(id)
            .ok_or_else(|| TreeError::UnknownNode(id.clone()))
    }

    fn content_mut(&mut self, id: &NodeId) -> Result<&mut Content, TreeError> {
        self.nodes
            .get_mut(id)
            .map(|n| &mut n.content)
            .ok_or_else(|| TreeError::UnknownNode(id.clone()))
    }

    fn array_mut(&mut self, id: &NodeId) -> Result<&mut Vec<NodeId>, TreeError> {
        match self.content_mut(id)? {
            Content::Array(items) => Ok(items),
            _ => Err(TreeError::NotAnArray(id.clone())),
        }
    }

    fn object_mut(&mut self, id: &NodeId) -> Result<&mut IndexMap<String, NodeId>, TreeError> {
        match self.content_mut(id)? {
            Content::Object(fields) => Ok(fields),
            _ => Err(TreeError::NotAnObject(id.clone())),
        }
    }

    fn mark_dirty(&mut self, id: &NodeId) {
        let mut current = Some(id.clone());
        while let Some(node_id) = current {
            current = self.nodes.get(&node_id).and_then(|n| n.parent.clone());
            self.dirty.insert(node_id);
        }
    }

    fn remove_subtree(&mut self, id: &NodeId) {
        if let Some(node) = self.nodes.remove(id) {
            self.dirty.remove(id);
            match node.content {
                Content::Object(fields) => {
                    for child in fields.values() {
                        self.remove_subtree(child);
                    }
                }
                Content::Array(items) => {
                    for child in &items {
                        self.remove_subtree(child);
                    }
                }
                _ => {}
            }
        }
    }

    /// Forgets all dirty marks, e.g. after the row was saved.
    pub fn commit(&mut self) {
        self.dirty.clear();
    }

    /// Turns a primitive into a foreign key pointing at `table`, keeping its
    /// id and value.
    pub fn mark_foreign_key(&mut self, id: &NodeId, table: &str) -> Result<(), TreeError> {
        let content = self.content_mut(id)?;
        let value = match content {
            Content::Primitive(value) => value.clone(),
            Content::ForeignKey { value, .. } => value.clone(),
            _ => return Err(TreeError::NotAPrimitive(id.clone())),
        };
        *content = Content::ForeignKey {
            table: table.to_string(),
            value,
        };
        Ok(())
    }

    /// Turns a node into an opaque reference. Its subtree collapses into the
    /// plain value the reference carries.
    pub fn mark_ref(&mut self, id: &NodeId, reference: &str) -> Result<(), TreeError> {
        let value = self
            .plain_value(id)
            .ok_or_else(|| TreeError::UnknownNode(id.clone()))?;
        for child in self.child_ids(id) {
            self.remove_subtree(&child);
        }
        *self.content_mut(id)? = Content::Ref {
            reference: reference.to_string(),
            value,
        };
        Ok(())
    }

    pub fn foreign_key_table(&self, id: &NodeId) -> Option<&str> {
        match &self.nodes.get(id)?.content {
            Content::ForeignKey { table, .. } => Some(table),
            _ => None,
        }
    }

    pub fn reference(&self, id: &NodeId) -> Option<&str> {
        match &self.nodes.get(id)?.content {
            Content::Ref { reference, .. } => Some(reference),
            _ => None,
        }
    }

    /// Looks up an object field by name.
    pub fn child(&self, id: &NodeId, name: &str) -> Option<NodeId> {
        match &self.nodes.get(id)?.content {
            Content::Object(fields) => fields.get(name).cloned(),
            _ => None,
        }
    }

    /// Array item at `index`.
    pub fn at(&self, id: &NodeId, index: usize) -> Option<NodeId> {
        match &self.nodes.get(id)?.content {
            Content::Array(items) => items.get(index).cloned(),
            _ => None,
        }
    }

    /// Array length, `None` for non-arrays.
    pub fn len(&self, id: &NodeId) -> Option<usize> {
        match &self.nodes.get(id)?.content {
            Content::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    /// Resolves a path such as `address.tags[1]` from the root.
    pub fn resolve_path(&self, path: &str) -> Option<NodeId> {
        let mut current = self.root.clone();
        for segment in path_segments(path)? {
            current = match segment {
                PathSegment::Key(key) => self.child(&current, &key)?,
                PathSegment::Index(index) => self.at(&current, index)?,
            };
        }
        Some(current)
    }

    /// Number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for ValueTree {
    fn default() -> Self {
        Self::new()
    }
}

enum PathSegment {
    Key(String),
    Index(usize),
}

fn path_segments(path: &str) -> Option<Vec<PathSegment>> {
    let mut segments = Vec::new();
    for part in path.split('.').filter(|p| !p.is_empty()) {
        let (key, mut rest) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };
        if !key.is_empty() {
            segments.push(PathSegment::Key(key.to_string()));
        }
        while let Some(stripped) = rest.strip_prefix('[') {
            let end = stripped.find(']')?;
            segments.push(PathSegment::Index(stripped[..end].parse().ok()?));
            rest = &stripped[end + 1..];
        }
        if !rest.is_empty() {
            return None;
        }
    }
    Some(segments)
}

impl TreeModel for ValueTree {
    type Extension = ();

    fn root_id(&self) -> NodeId {
        self.root.clone()
    }

    fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    fn kind(&self, id: &NodeId) -> Option<NodeKind> {
        self.nodes.get(id).map(|n| n.content.kind())
    }

    fn name(&self, id: &NodeId) -> Option<String> {
        let node = self.nodes.get(id)?;
        let Some(parent) = &node.parent else {
            return Some(String::new());
        };
        match &self.nodes.get(parent)?.content {
            Content::Object(fields) => fields
                .iter()
                .find(|(_, child)| *child == id)
                .map(|(key, _)| key.clone()),
            Content::Array(items) => items.iter().position(|c| c == id).map(|i| i.to_string()),
            _ => None,
        }
    }

    fn parent_id(&self, id: &NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent.clone()
    }

    fn child_ids(&self, id: &NodeId) -> Vec<NodeId> {
        match self.nodes.get(id).map(|n| &n.content) {
            Some(Content::Object(fields)) => fields.values().cloned().collect(),
            Some(Content::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    fn scalar(&self, id: &NodeId) -> Option<Scalar> {
        match &self.nodes.get(id)?.content {
            Content::Primitive(value) | Content::ForeignKey { value, .. } => Some(value.clone()),
            _ => None,
        }
    }

    fn path_of(&self, id: &NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = id.clone();
        while let Some(parent) = self.parent_id(&current) {
            let is_array = matches!(
                self.nodes.get(&parent).map(|n| &n.content),
                Some(Content::Array(_))
            );
            let name = self.name(&current).unwrap_or_default();
            segments.push((is_array, name));
            current = parent;
        }
        let mut path = String::new();
        for (is_array, name) in segments.into_iter().rev() {
            if is_array {
                path.push('[');
                path.push_str(&name);
                path.push(']');
            } else {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(&name);
            }
        }
        path
    }

    fn plain_value(&self, id: &NodeId) -> Option<Value> {
        let node = self.nodes.get(id)?;
        Some(match &node.content {
            Content::Object(fields) => {
                let mut map = serde_json::Map::new();
                for (key, child) in fields {
                    map.insert(key.clone(), self.plain_value(child).unwrap_or(Value::Null));
                }
                Value::Object(map)
            }
            Content::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|c| self.plain_value(c).unwrap_or(Value::Null))
                    .collect(),
            ),
            Content::Primitive(value) | Content::ForeignKey { value, .. } => value.to_json(),
            Content::Ref { value, .. } => value.clone(),
        })
    }

    fn is_dirty(&self, id: &NodeId) -> bool {
        self.dirty.contains(id)
    }

    fn can_remove(&self, id: &NodeId) -> bool {
        *id != self.root && self.nodes.contains_key(id)
    }

    fn apply(&mut self, mutation: Mutation) -> Result<Option<NodeId>, TreeError> {
        match mutation {
            Mutation::PushItem { array, value } => {
                self.array_mut(&array)?;
                let item = self.build(&value, Some(array.clone()));
                self.array_mut(&array)?.push(item.clone());
                self.mark_dirty(&array);
                Ok(Some(item))
            }
            Mutation::RemoveAt { array, index } => {
                let items = self.array_mut(&array)?;
                if index >= items.len() {
                    return Err(TreeError::out_of_bounds(index, items.len()));
                }
                let removed = items.remove(index);
                self.remove_subtree(&removed);
                self.mark_dirty(&array);
                Ok(None)
            }
            Mutation::Move { array, from, to } => {
                let items = self.array_mut(&array)?;
                let len = items.len();
                if from >= len {
                    return Err(TreeError::out_of_bounds(from, len));
                }
                if to >= len {
                    return Err(TreeError::out_of_bounds(to, len));
                }
                let moved = items.remove(from);
                items.insert(to, moved);
                self.mark_dirty(&array);
                Ok(None)
            }
            Mutation::InsertField {
                object,
                index,
                name,
            } => {
                let fields = self.object_mut(&object)?;
                if index > fields.len() {
                    return Err(TreeError::out_of_bounds(index, fields.len()));
                }
                if fields.contains_key(&name) {
                    return Err(TreeError::DuplicateName(name));
                }
                let field = self.build(&Value::Null, Some(object.clone()));
                self.object_mut(&object)?.shift_insert(index, name, field.clone());
                self.mark_dirty(&object);
                Ok(Some(field))
            }
            Mutation::Remove { id } => {
                if id == self.root {
                    return Err(TreeError::CannotRemoveRoot);
                }
                let parent = self
                    .node(&id)?
                    .parent
                    .clone()
                    .ok_or(TreeError::CannotRemoveRoot)?;
                match self.content_mut(&parent)? {
                    Content::Object(fields) => fields.retain(|_, child| *child != id),
                    Content::Array(items) => items.retain(|child| *child != id),
                    _ => return Err(TreeError::CannotRemove(id)),
                }
                self.remove_subtree(&id);
                self.mark_dirty(&parent);
                Ok(None)
            }
            Mutation::Rename { id, name } => {
                let parent = self
                    .node(&id)?
                    .parent
                    .clone()
                    .ok_or(TreeError::Unsupported("renaming the root"))?;
                let current = self.name(&id).unwrap_or_default();
                if current == name {
                    return Ok(None);
                }
                let fields = self.object_mut(&parent)?;
                if fields.contains_key(&name) {
                    return Err(TreeError::DuplicateName(name));
                }
                if let Some((index, _, child)) = fields.shift_remove_full(&current) {
                    fields.shift_insert(index, name, child);
                }
                self.mark_dirty(&id);
                Ok(None)
            }
            Mutation::SetValue { id, value } => {
                match self.content_mut(&id)? {
                    Content::Primitive(current) => *current = value,
                    Content::ForeignKey { value: current, .. } => *current = value,
                    _ => return Err(TreeError::NotAPrimitive(id)),
                }
                self.mark_dirty(&id);
                Ok(None)
            }
            Mutation::ChangeKind { id, kind } => {
                if id == self.root {
                    return Err(TreeError::Unsupported("changing the kind of the root"));
                }
                let template = match kind {
                    NodeKind::Object => Value::Object(serde_json::Map::new()),
                    NodeKind::Array => Value::Array(Vec::new()),
                    NodeKind::Primitive => Value::Null,
                    NodeKind::ForeignKey | NodeKind::Ref => {
                        return Err(TreeError::Unsupported(
                            "foreign keys and refs are marked, not created",
                        ))
                    }
                };
                let parent = self
                    .node(&id)?
                    .parent
                    .clone()
                    .ok_or(TreeError::CannotRemoveRoot)?;
                let replacement = self.build(&template, Some(parent.clone()));
                match self.content_mut(&parent)? {
                    Content::Object(fields) => {
                        for child in fields.values_mut() {
                            if *child == id {
                                *child = replacement.clone();
                            }
                        }
                    }
                    Content::Array(items) => {
                        for child in items.iter_mut() {
                            if *child == id {
                                *child = replacement.clone();
                            }
                        }
                    }
                    _ => return Err(TreeError::CannotRemove(id)),
                }
                self.remove_subtree(&id);
                self.mark_dirty(&replacement);
                Ok(Some(replacement))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_is_clean() {
        let tree = ValueTree::from_json(&json!({"a": 1, "b": [true]}));
        assert!(!tree.is_dirty(&tree.root_id()));
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_path_of_mixes_keys_and_indices() {
        let tree = ValueTree::from_json(&json!({"a": {"b": [0, {"c": 1}]}}));
        let c = tree.resolve_path("a.b[1].c").unwrap();
        assert_eq!(tree.path_of(&c), "a.b[1].c");
        assert_eq!(tree.path_of(&tree.root_id()), "");
    }

    #[test]
    fn test_resolve_path_rejects_garbage() {
        let tree = ValueTree::from_json(&json!({"a": [1]}));
        assert!(tree.resolve_path("a[x]").is_none());
        assert!(tree.resolve_path("a[3]").is_none());
        assert!(tree.resolve_path("a[0]").is_some());
    }

    #[test]
    fn test_mutation_marks_ancestors_dirty() {
        let mut tree = ValueTree::from_json(&json!({"a": {"b": 1}, "z": 2}));
        let b = tree.resolve_path("a.b").unwrap();
        let z = tree.resolve_path("z").unwrap();
        tree.apply(Mutation::SetValue {
            id: b.clone(),
            value: Scalar::Number(5.0),
        })
        .unwrap();

        assert!(tree.is_dirty(&b));
        assert!(tree.is_dirty(&tree.resolve_path("a").unwrap()));
        assert!(tree.is_dirty(&tree.root_id()));
        assert!(!tree.is_dirty(&z));

        tree.commit();
        assert!(!tree.is_dirty(&b));
    }

    #[test]
    fn test_rename_keeps_position_and_id() {
        let mut tree = ValueTree::from_json(&json!({"a": 1, "b": 2, "c": 3}));
        let b = tree.resolve_path("b").unwrap();
        tree.apply(Mutation::Rename {
            id: b.clone(),
            name: "beta".into(),
        })
        .unwrap();
        assert_eq!(tree.name(&b).as_deref(), Some("beta"));
        assert_eq!(tree.index_in_parent(&b), Some(1));
    }

    #[test]
    fn test_rename_to_existing_name_fails() {
        let mut tree = ValueTree::from_json(&json!({"a": 1, "b": 2}));
        let b = tree.resolve_path("b").unwrap();
        let err = tree
            .apply(Mutation::Rename {
                id: b,
                name: "a".into(),
            })
            .unwrap_err();
        assert_eq!(err, TreeError::DuplicateName("a".into()));
    }

    #[test]
    fn test_remove_drops_descendants() {
        let mut tree = ValueTree::from_json(&json!({"a": {"b": {"c": 1}}}));
        let a = tree.resolve_path("a").unwrap();
        let c = tree.resolve_path("a.b.c").unwrap();
        tree.apply(Mutation::Remove { id: a }).unwrap();
        assert!(!tree.contains(&c));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_array_ops_on_object_fail() {
        let mut tree = ValueTree::from_json(&json!({"a": 1}));
        let root = tree.root_id();
        let err = tree
            .apply(Mutation::PushItem {
                array: root.clone(),
                value: Value::Null,
            })
            .unwrap_err();
        assert_eq!(err, TreeError::NotAnArray(root));
    }

    #[test]
    fn test_change_kind_replaces_id_in_place() {
        let mut tree = ValueTree::from_json(&json!({"a": 1, "b": 2}));
        let a = tree.resolve_path("a").unwrap();
        let new_id = tree
            .apply(Mutation::ChangeKind {
                id: a.clone(),
                kind: NodeKind::Array,
            })
            .unwrap()
            .unwrap();
        assert_ne!(new_id, a);
        assert!(!tree.contains(&a));
        assert_eq!(tree.name(&new_id).as_deref(), Some("a"));
        assert_eq!(tree.plain_value(&tree.root_id()), Some(json!({"a": [], "b": 2})));
    }

    #[test]
    fn test_foreign_key_keeps_value() {
        let mut tree = ValueTree::from_json(&json!({"owner": "user-1"}));
        let owner = tree.resolve_path("owner").unwrap();
        tree.mark_foreign_key(&owner, "users").unwrap();
        assert_eq!(tree.kind(&owner), Some(NodeKind::ForeignKey));
        assert_eq!(tree.foreign_key_table(&owner), Some("users"));
        assert_eq!(tree.scalar(&owner), Some(Scalar::Text("user-1".into())));
    }

    #[test]
    fn test_mark_ref_collapses_subtree() {
        let mut tree = ValueTree::from_json(&json!({"file": {"name": "a.png", "size": 3}}));
        let file = tree.resolve_path("file").unwrap();
        tree.mark_ref(&file, "File").unwrap();
        assert_eq!(tree.kind(&file), Some(NodeKind::Ref));
        assert!(tree.child_ids(&file).is_empty());
        assert_eq!(
            tree.plain_value(&file),
            Some(json!({"name": "a.png", "size": 3}))
        );
    }
}
