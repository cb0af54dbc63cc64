//! Table schemas as an id-addressed tree.
//!
//! A `SchemaTree` describes the shape of a table's rows: objects with named
//! properties, arrays with a single item definition, typed primitive fields,
//! foreign keys and references. Fields may carry a formula, which is checked
//! with [`formula::parse`](super::formula::parse) before it is accepted.
//!
//! Schemas load from a JSON-Schema-like document:
//!
//! ```
//! use treeaccess::document::model::TreeModel;
//! use treeaccess::document::schema_tree::SchemaTree;
//! use serde_json::json;
//!
//! let schema = SchemaTree::from_json_schema("orders", &json!({
//!     "type": "object",
//!     "properties": {
//!         "price": {"type": "number", "default": 0},
//!         "quantity": {"type": "number", "default": 1},
//!         "total": {"type": "number", "x-formula": "price * quantity"},
//!         "customer": {"type": "string", "foreignKey": "customers"},
//!         "lines": {"type": "array", "items": {"type": "string"}}
//!     }
//! })).unwrap();
//!
//! let total = schema.resolve_path("total").unwrap();
//! assert_eq!(schema.formula(&total), Some("price * quantity"));
//! assert_eq!(schema.path_of(&schema.resolve_path("lines[*]").unwrap()), "lines[*]");
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Value};

use super::formula;
use super::model::{IdGenerator, Mutation, NodeId, NodeKind, Scalar, TreeModel};
use crate::error::TreeError;

/// Declared type of a primitive schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Number,
    Boolean,
}

impl PrimitiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
        }
    }

    fn default_value(&self) -> Scalar {
        match self {
            PrimitiveType::String => Scalar::Text(String::new()),
            PrimitiveType::Number => Scalar::Number(0.0),
            PrimitiveType::Boolean => Scalar::Bool(false),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SchemaContent {
    Object(Vec<NodeId>),
    Array(Option<NodeId>),
    Primitive { ty: PrimitiveType, default: Scalar },
    ForeignKey { table: String },
    Ref { reference: String },
}

impl SchemaContent {
    fn kind(&self) -> NodeKind {
        match self {
            SchemaContent::Object(_) => NodeKind::Object,
            SchemaContent::Array(_) => NodeKind::Array,
            SchemaContent::Primitive { .. } => NodeKind::Primitive,
            SchemaContent::ForeignKey { .. } => NodeKind::ForeignKey,
            SchemaContent::Ref { .. } => NodeKind::Ref,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct SchemaNode {
    parent: Option<NodeId>,
    name: String,
    content: SchemaContent,
    formula: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    EmptyName,
    InvalidName,
    DuplicateName,
    FormulaOnContainer,
    InvalidFormula,
}

/// A problem found in a schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl Diagnostic {
    fn error(kind: DiagnosticKind, path: String, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            path,
            params: BTreeMap::new(),
        }
    }

    fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("Invalid regex pattern"));

/// A table schema with stable node ids.
#[derive(Debug, Clone)]
pub struct SchemaTree {
    nodes: HashMap<NodeId, SchemaNode>,
    root: NodeId,
    ids: IdGenerator,
    table_id: String,
    dirty: HashSet<NodeId>,
}

const ITEMS_NAME: &str = "items";

impl SchemaTree {
    /// An empty object schema for `table_id`.
    pub fn new(table_id: &str) -> Self {
        let mut ids = IdGenerator::default();
        let root = ids.next_id();
        let mut nodes = HashMap::new();
        nodes.insert(
            root.clone(),
            SchemaNode {
                parent: None,
                name: String::new(),
                content: SchemaContent::Object(Vec::new()),
                formula: None,
                description: None,
            },
        );
        Self {
            nodes,
            root,
            ids,
            table_id: table_id.to_string(),
            dirty: HashSet::new(),
        }
    }

    /// Builds a schema from a JSON-Schema-like document. The root must be an
    /// object schema.
    pub fn from_json_schema(table_id: &str, document: &Value) -> Result<Self, TreeError> {
        let mut tree = Self {
            nodes: HashMap::new(),
            root: NodeId::from(""),
            ids: IdGenerator::default(),
            table_id: table_id.to_string(),
            dirty: HashSet::new(),
        };
        let root = tree.build(document, None, String::new())?;
        if tree.kind(&root) != Some(NodeKind::Object) {
            return Err(TreeError::InvalidSchema("root schema must be an object".into()));
        }
        tree.root = root;
        Ok(tree)
    }

    fn build(
        &mut self,
        schema: &Value,
        parent: Option<NodeId>,
        name: String,
    ) -> Result<NodeId, TreeError> {
        let map = schema
            .as_object()
            .ok_or_else(|| TreeError::InvalidSchema(format!("schema for '{}' is not an object", name)))?;
        let id = self.ids.next_id();

        let content = if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            SchemaContent::Ref {
                reference: reference.to_string(),
            }
        } else if let Some(table) = map.get("foreignKey").and_then(Value::as_str) {
            SchemaContent::ForeignKey {
                table: table.to_string(),
            }
        } else {
            match map.get("type").and_then(Value::as_str) {
                Some("object") => {
                    let mut children = Vec::new();
                    if let Some(props) = map.get("properties").and_then(Value::as_object) {
                        for (key, child) in props {
                            children.push(self.build(child, Some(id.clone()), key.clone())?);
                        }
                    }
                    SchemaContent::Object(children)
                }
                Some("array") => {
                    let items = match map.get("items") {
                        Some(items) => {
                            Some(self.build(items, Some(id.clone()), ITEMS_NAME.to_string())?)
                        }
                        None => None,
                    };
                    SchemaContent::Array(items)
                }
                Some(ty) => {
                    let ty = match ty {
                        "string" => PrimitiveType::String,
                        "number" | "integer" => PrimitiveType::Number,
                        "boolean" => PrimitiveType::Boolean,
                        other => {
                            return Err(TreeError::InvalidSchema(format!(
                                "unknown type '{}' for '{}'",
                                other, name
                            )))
                        }
                    };
                    let default = map
                        .get("default")
                        .and_then(Scalar::from_json)
                        .unwrap_or_else(|| ty.default_value());
                    SchemaContent::Primitive { ty, default }
                }
                None => {
                    return Err(TreeError::InvalidSchema(format!(
                        "missing type for '{}'",
                        name
                    )))
                }
            }
        };

        self.nodes.insert(
            id.clone(),
            SchemaNode {
                parent,
                name,
                content,
                formula: map
                    .get("x-formula")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                description: map
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
        );
        Ok(id)
    }

    /// Renders the subtree back into a JSON-Schema-like document.
    pub fn to_json_schema(&self, id: &NodeId) -> Option<Value> {
        let node = self.nodes.get(id)?;
        let mut out = match &node.content {
            SchemaContent::Object(children) => {
                let mut props = serde_json::Map::new();
                for child in children {
                    if let Some(c) = self.nodes.get(child) {
                        props.insert(c.name.clone(), self.to_json_schema(child).unwrap_or(Value::Null));
                    }
                }
                json!({"type": "object", "properties": props})
            }
            SchemaContent::Array(items) => {
                let mut out = json!({"type": "array"});
                if let Some(items) = items.as_ref().and_then(|i| self.to_json_schema(i)) {
                    out["items"] = items;
                }
                out
            }
            SchemaContent::Primitive { ty, default } => {
                json!({"type": ty.as_str(), "default": default.to_json()})
            }
            SchemaContent::ForeignKey { table } => json!({"type": "string", "foreignKey": table}),
            SchemaContent::Ref { reference } => json!({"$ref": reference}),
        };
        if let Some(formula) = &node.formula {
            out["x-formula"] = Value::String(formula.clone());
        }
        if let Some(description) = &node.description {
            out["description"] = Value::String(description.clone());
        }
        Some(out)
    }

    fn node(&self, id: &NodeId) -> Result<&SchemaNode, TreeError> {
        self.nodes
            .get(id)
            .ok_or_else(|| TreeError::UnknownNode(id.clone()))
    }

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut SchemaNode, TreeError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::UnknownNode(id.clone()))
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
                SchemaContent::Object(children) => {
                    for child in &children {
                        self.remove_subtree(child);
                    }
                }
                SchemaContent::Array(Some(items)) => self.remove_subtree(&items),
                _ => {}
            }
        }
    }

    fn new_node(&mut self, parent: &NodeId, name: String, content: SchemaContent) -> NodeId {
        let id = self.ids.next_id();
        self.nodes.insert(
            id.clone(),
            SchemaNode {
                parent: Some(parent.clone()),
                name,
                content,
                formula: None,
                description: None,
            },
        );
        id
    }

    pub fn commit(&mut self) {
        self.dirty.clear();
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn set_table_id(&mut self, table_id: &str) {
        if self.table_id != table_id {
            self.table_id = table_id.to_string();
            let root = self.root.clone();
            self.mark_dirty(&root);
        }
    }

    /// Problem with the table id, if any.
    pub fn table_id_error(&self) -> Option<String> {
        if self.table_id.is_empty() {
            Some("Table id is required".to_string())
        } else if !IDENTIFIER.is_match(&self.table_id) {
            Some("Table id may only contain letters, digits, '_' and '-'".to_string())
        } else {
            None
        }
    }

    pub fn formula(&self, id: &NodeId) -> Option<&str> {
        self.nodes.get(id)?.formula.as_deref()
    }

    pub fn description(&self, id: &NodeId) -> Option<&str> {
        self.nodes.get(id)?.description.as_deref()
    }

    pub fn set_description(&mut self, id: &NodeId, text: &str) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        node.description = if text.trim().is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        self.mark_dirty(id);
        Ok(())
    }

    pub fn primitive_type(&self, id: &NodeId) -> Option<PrimitiveType> {
        match &self.nodes.get(id)?.content {
            SchemaContent::Primitive { ty, .. } => Some(*ty),
            _ => None,
        }
    }

    pub fn foreign_key_table(&self, id: &NodeId) -> Option<&str> {
        match &self.nodes.get(id)?.content {
            SchemaContent::ForeignKey { table } => Some(table),
            _ => None,
        }
    }

    pub fn reference(&self, id: &NodeId) -> Option<&str> {
        match &self.nodes.get(id)?.content {
            SchemaContent::Ref { reference } => Some(reference),
            _ => None,
        }
    }

    /// Item definition of an array schema.
    pub fn items(&self, id: &NodeId) -> Option<NodeId> {
        match &self.nodes.get(id)?.content {
            SchemaContent::Array(items) => items.clone(),
            _ => None,
        }
    }

    /// Object property by name.
    pub fn property(&self, id: &NodeId, name: &str) -> Option<NodeId> {
        match &self.nodes.get(id)?.content {
            SchemaContent::Object(children) => children
                .iter()
                .find(|c| self.nodes.get(*c).map(|n| n.name == name).unwrap_or(false))
                .cloned(),
            _ => None,
        }
    }

    /// Resolves `a.b`, `list[*]` or `list[*].field` from the root.
    pub fn resolve_path(&self, path: &str) -> Option<NodeId> {
        self.resolve_from(&self.root, path)
    }

    fn resolve_from(&self, start: &NodeId, path: &str) -> Option<NodeId> {
        let mut current = start.clone();
        for part in path.split('.').filter(|p| !p.is_empty()) {
            let mut rest = part;
            let key_end = rest.find('[').unwrap_or(rest.len());
            if key_end > 0 {
                current = self.property(&current, &rest[..key_end])?;
            }
            rest = &rest[key_end..];
            while let Some(stripped) = rest.strip_prefix("[*]") {
                current = self.items(&current)?;
                rest = stripped;
            }
            if !rest.is_empty() {
                return None;
            }
        }
        Some(current)
    }

    /// The object whose fields a formula on `id` can see by bare name.
    fn formula_scope(&self, id: &NodeId) -> NodeId {
        let mut current = self.parent_id(id);
        while let Some(candidate) = current {
            if self.kind(&candidate) == Some(NodeKind::Object) {
                return candidate;
            }
            current = self.parent_id(&candidate);
        }
        self.root.clone()
    }

    fn check_formula(&self, id: &NodeId, text: &str) -> Result<(), String> {
        let node = self.nodes.get(id).ok_or_else(|| format!("Unknown node '{}'", id))?;
        if !matches!(node.content, SchemaContent::Primitive { .. }) {
            return Err("Formulas are only allowed on primitive fields".to_string());
        }
        let expr = formula::parse(text).map_err(|e| e.to_string())?;
        let scope = self.formula_scope(id);
        for reference in expr.references() {
            let target = self
                .resolve_from(&scope, &reference)
                .or_else(|| self.resolve_from(&self.root, &reference))
                .ok_or_else(|| format!("Unknown field '{}'", reference))?;
            if target == *id {
                return Err("A formula cannot reference its own field".to_string());
            }
            if self.kind(&target).map(|k| k.is_container()).unwrap_or(false) {
                return Err(format!("Field '{}' is not a value", reference));
            }
        }
        Ok(())
    }

    /// Sets or clears (empty text) the formula of a field.
    ///
    /// On rejection the schema is left untouched and the error carries a
    /// message suitable for display.
    pub fn set_formula(&mut self, id: &NodeId, text: &str) -> Result<(), TreeError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            let node = self.node_mut(id)?;
            if node.formula.take().is_some() {
                self.mark_dirty(id);
            }
            return Ok(());
        }
        self.node(id)?;
        self.check_formula(id, trimmed).map_err(TreeError::Formula)?;
        self.node_mut(id)?.formula = Some(trimmed.to_string());
        self.mark_dirty(id);
        Ok(())
    }

    /// Schema-level problems of a single node.
    pub fn diagnostics(&self, id: &NodeId) -> Vec<Diagnostic> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        let path = self.path_of(id);
        let mut out = Vec::new();

        let parent_is_object = node
            .parent
            .as_ref()
            .map(|p| self.kind(p) == Some(NodeKind::Object))
            .unwrap_or(false);
        if parent_is_object {
            if node.name.is_empty() {
                out.push(Diagnostic::error(
                    DiagnosticKind::EmptyName,
                    path.clone(),
                    "Field name is required",
                ));
            } else if !IDENTIFIER.is_match(&node.name) {
                out.push(
                    Diagnostic::error(
                        DiagnosticKind::InvalidName,
                        path.clone(),
                        format!("Field name '{}' contains invalid characters", node.name),
                    )
                    .with_param("name", node.name.clone()),
                );
            }
            if !node.name.is_empty() {
                let duplicates = node
                    .parent
                    .as_ref()
                    .map(|p| {
                        self.child_ids(p)
                            .iter()
                            .filter(|c| self.nodes.get(*c).map(|n| n.name == node.name).unwrap_or(false))
                            .count()
                    })
                    .unwrap_or(0);
                if duplicates > 1 {
                    out.push(
                        Diagnostic::error(
                            DiagnosticKind::DuplicateName,
                            path.clone(),
                            format!("Field name '{}' is used more than once", node.name),
                        )
                        .with_param("name", node.name.clone()),
                    );
                }
            }
        }

        if let Some(text) = &node.formula {
            if node.content.kind().is_container() {
                out.push(Diagnostic::error(
                    DiagnosticKind::FormulaOnContainer,
                    path.clone(),
                    "Formulas are only allowed on primitive fields",
                ));
            } else if let Err(message) = self.check_formula(id, text) {
                out.push(
                    Diagnostic::error(DiagnosticKind::InvalidFormula, path.clone(), message)
                        .with_param("formula", text.clone()),
                );
            }
        }
        out
    }

    /// Diagnostics for every node, in depth-first order.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        let mut stack = vec![self.root.clone()];
        while let Some(id) = stack.pop() {
            out.extend(self.diagnostics(&id));
            let mut children = self.child_ids(&id);
            children.reverse();
            stack.extend(children);
        }
        out
    }
}

impl TreeModel for SchemaTree {
    type Extension = crate::editor::accessor::schema::FormulaBuffer;

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
        self.nodes.get(id).map(|n| n.name.clone())
    }

    fn parent_id(&self, id: &NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent.clone()
    }

    fn child_ids(&self, id: &NodeId) -> Vec<NodeId> {
        match self.nodes.get(id).map(|n| &n.content) {
            Some(SchemaContent::Object(children)) => children.clone(),
            Some(SchemaContent::Array(Some(items))) => vec![items.clone()],
            _ => Vec::new(),
        }
    }

    fn scalar(&self, id: &NodeId) -> Option<Scalar> {
        match &self.nodes.get(id)?.content {
            SchemaContent::Primitive { default, .. } => Some(default.clone()),
            _ => None,
        }
    }

    fn path_of(&self, id: &NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = id.clone();
        while let Some(parent) = self.parent_id(&current) {
            let in_array = self.kind(&parent) == Some(NodeKind::Array);
            segments.push((in_array, self.name(&current).unwrap_or_default()));
            current = parent;
        }
        let mut path = String::new();
        for (in_array, name) in segments.into_iter().rev() {
            if in_array {
                path.push_str("[*]");
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
        self.to_json_schema(id)
    }

    fn is_dirty(&self, id: &NodeId) -> bool {
        self.dirty.contains(id)
    }

    fn can_remove(&self, id: &NodeId) -> bool {
        match self.parent_id(id) {
            Some(parent) => self.kind(&parent) == Some(NodeKind::Object),
            None => false,
        }
    }

    fn is_item_list(&self, _id: &NodeId) -> bool {
        false
    }

    fn apply(&mut self, mutation: Mutation) -> Result<Option<NodeId>, TreeError> {
        match mutation {
            Mutation::PushItem { .. } | Mutation::RemoveAt { .. } | Mutation::Move { .. } => Err(
                TreeError::Unsupported("schema arrays hold a single item definition"),
            ),
            Mutation::InsertField {
                object,
                index,
                name,
            } => {
                let len = match &self.node(&object)?.content {
                    SchemaContent::Object(children) => children.len(),
                    _ => return Err(TreeError::NotAnObject(object)),
                };
                if index > len {
                    return Err(TreeError::out_of_bounds(index, len));
                }
                let field = self.new_node(
                    &object,
                    name,
                    SchemaContent::Primitive {
                        ty: PrimitiveType::String,
                        default: PrimitiveType::String.default_value(),
                    },
                );
                if let SchemaContent::Object(children) = &mut self.node_mut(&object)?.content {
                    children.insert(index, field.clone());
                }
                self.mark_dirty(&object);
                Ok(Some(field))
            }
            Mutation::Remove { id } => {
                let parent = self
                    .node(&id)?
                    .parent
                    .clone()
                    .ok_or(TreeError::CannotRemoveRoot)?;
                match &mut self.node_mut(&parent)?.content {
                    SchemaContent::Object(children) => children.retain(|c| *c != id),
                    _ => return Err(TreeError::CannotRemove(id)),
                }
                self.remove_subtree(&id);
                self.mark_dirty(&parent);
                Ok(None)
            }
            Mutation::Rename { id, name } => {
                if !self.can_remove(&id) {
                    self.node(&id)?;
                    return Err(TreeError::Unsupported("only object fields can be renamed"));
                }
                let node = self.node_mut(&id)?;
                if node.name != name {
                    node.name = name;
                    self.mark_dirty(&id);
                }
                Ok(None)
            }
            Mutation::SetValue { id, value } => {
                match &mut self.node_mut(&id)?.content {
                    SchemaContent::Primitive { default, .. } => *default = value,
                    _ => return Err(TreeError::NotAPrimitive(id)),
                }
                self.mark_dirty(&id);
                Ok(None)
            }
            Mutation::ChangeKind { id, kind } => {
                let parent = self
                    .node(&id)?
                    .parent
                    .clone()
                    .ok_or(TreeError::Unsupported("changing the kind of the root"))?;
                let name = self.node(&id)?.name.clone();
                let content = match kind {
                    NodeKind::Object => SchemaContent::Object(Vec::new()),
                    NodeKind::Array => SchemaContent::Array(None),
                    NodeKind::Primitive => SchemaContent::Primitive {
                        ty: PrimitiveType::String,
                        default: PrimitiveType::String.default_value(),
                    },
                    NodeKind::ForeignKey => SchemaContent::ForeignKey {
                        table: String::new(),
                    },
                    NodeKind::Ref => SchemaContent::Ref {
                        reference: String::new(),
                    },
                };
                let replacement = self.new_node(&parent, name, content);
                if kind == NodeKind::Array {
                    let items = self.new_node(
                        &replacement,
                        ITEMS_NAME.to_string(),
                        SchemaContent::Primitive {
                            ty: PrimitiveType::String,
                            default: PrimitiveType::String.default_value(),
                        },
                    );
                    self.node_mut(&replacement)?.content = SchemaContent::Array(Some(items));
                }
                match &mut self.node_mut(&parent)?.content {
                    SchemaContent::Object(children) => {
                        for child in children.iter_mut() {
                            if *child == id {
                                *child = replacement.clone();
                            }
                        }
                    }
                    SchemaContent::Array(items) => *items = Some(replacement.clone()),
                    _ => return Err(TreeError::CannotRemove(id)),
                }
                self.remove_subtree(&id);
                self.mark_dirty(&replacement);
                Ok(Some(replacement))
            }
        }
    }
}

impl SchemaTree {
    /// Changes the declared type of a primitive field in place (same id).
    pub fn set_primitive_type(&mut self, id: &NodeId, ty: PrimitiveType) -> Result<(), TreeError> {
        match &mut self.node_mut(id)?.content {
            SchemaContent::Primitive { ty: current, default } => {
                if *current != ty {
                    *current = ty;
                    *default = ty.default_value();
                }
            }
            _ => return Err(TreeError::NotAPrimitive(id.clone())),
        }
        self.mark_dirty(id);
        Ok(())
    }
}
