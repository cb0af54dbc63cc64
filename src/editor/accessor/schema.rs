//! Views that only exist on schema accessors.
//!
//! The formula view keeps an uncommitted input next to the committed
//! formula. A rejected input stays in the buffer with its error message and
//! never reaches the schema, so a half-typed formula cannot corrupt it.

use std::cell::RefCell;

use log::warn;

use super::NodeAccessor;
use crate::document::model::{NodeKind, TreeModel};
use crate::document::schema_tree::SchemaTree;

/// Per-accessor formula editing state.
#[derive(Debug, Default)]
pub struct FormulaBuffer {
    input: RefCell<Option<String>>,
    error: RefCell<Option<String>>,
}

impl NodeAccessor<SchemaTree> {
    pub fn label(&self) -> LabelView<'_> {
        LabelView { node: self }
    }

    pub fn formula(&self) -> FormulaView<'_> {
        FormulaView { node: self }
    }

    pub fn validation(&self) -> ValidationView<'_> {
        ValidationView { node: self }
    }
}

pub struct LabelView<'a> {
    node: &'a NodeAccessor<SchemaTree>,
}

impl LabelView<'_> {
    /// Field name, or a placeholder for unnamed fields.
    pub fn name_label(&self) -> String {
        if self.node.is_root() {
            return self
                .node
                .read(|m| m.table_id().to_string())
                .unwrap_or_default();
        }
        let name = self.node.name();
        if name.is_empty() {
            "<unnamed>".to_string()
        } else {
            name
        }
    }

    /// Short type description, e.g. `number`, `array<string>`,
    /// `foreignKey(customers)`.
    pub fn type_label(&self) -> String {
        self.node
            .read(|m| type_label(m, self.node.id()))
            .unwrap_or_default()
    }

    pub fn has_formula(&self) -> bool {
        self.node
            .read(|m| m.formula(self.node.id()).is_some())
            .unwrap_or(false)
    }
}

fn type_label(model: &SchemaTree, id: &crate::document::model::NodeId) -> String {
    match model.kind(id) {
        Some(NodeKind::Object) => "object".to_string(),
        Some(NodeKind::Array) => match model.items(id) {
            Some(items) => format!("array<{}>", type_label(model, &items)),
            None => "array".to_string(),
        },
        Some(NodeKind::Primitive) => model
            .primitive_type(id)
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
        Some(NodeKind::ForeignKey) => {
            format!("foreignKey({})", model.foreign_key_table(id).unwrap_or(""))
        }
        Some(NodeKind::Ref) => format!("ref({})", model.reference(id).unwrap_or("")),
        None => String::new(),
    }
}

pub struct FormulaView<'a> {
    node: &'a NodeAccessor<SchemaTree>,
}

impl FormulaView<'_> {
    fn buffer(&self) -> &FormulaBuffer {
        self.node.extension()
    }

    /// The formula stored in the schema.
    pub fn committed(&self) -> Option<String> {
        self.node
            .read(|m| m.formula(self.node.id()).map(str::to_string))
            .flatten()
    }

    /// The uncommitted input, if any.
    pub fn input(&self) -> Option<String> {
        self.buffer().input.borrow().clone()
    }

    /// Replaces the uncommitted input and clears the last error.
    pub fn set_input(&self, text: &str) {
        *self.buffer().input.borrow_mut() = Some(text.to_string());
        *self.buffer().error.borrow_mut() = None;
    }

    /// Drops the uncommitted input.
    pub fn discard(&self) {
        *self.buffer().input.borrow_mut() = None;
        *self.buffer().error.borrow_mut() = None;
    }

    /// What the formula field shows: the input while editing, otherwise the
    /// committed formula.
    pub fn display_value(&self) -> String {
        self.input()
            .or_else(|| self.committed())
            .unwrap_or_default()
    }

    /// Commits the input. On rejection the schema is untouched, the error is
    /// kept for display and `false` is returned.
    pub fn apply(&self) -> bool {
        let Some(input) = self.input() else {
            return true;
        };
        let Some(ctx) = self.node.context() else {
            return false;
        };
        let result = ctx
            .model
            .borrow_mut()
            .set_formula(self.node.id(), input.trim());
        match result {
            Ok(()) => {
                self.discard();
                true
            }
            Err(e) => {
                warn!("Formula rejected for {}: {}", self.node.path(), e);
                *self.buffer().error.borrow_mut() = Some(e.to_string());
                false
            }
        }
    }

    pub fn error(&self) -> Option<String> {
        self.buffer().error.borrow().clone()
    }
}

pub struct ValidationView<'a> {
    node: &'a NodeAccessor<SchemaTree>,
}

impl ValidationView<'_> {
    /// First schema diagnostic of this node.
    pub fn schema_error(&self) -> Option<String> {
        self.node
            .read(|m| {
                m.diagnostics(self.node.id())
                    .into_iter()
                    .next()
                    .map(|d| d.message)
            })
            .flatten()
    }

    /// Table id problem, reported on the root only.
    pub fn table_id_error(&self) -> Option<String> {
        if !self.node.is_root() {
            return None;
        }
        self.node.read(|m| m.table_id_error()).flatten()
    }

    pub fn formula_error(&self) -> Option<String> {
        self.node.formula().error()
    }

    pub fn has_error(&self) -> bool {
        self.error_message().is_some()
    }

    /// The most important error: schema, then table id, then formula input.
    pub fn error_message(&self) -> Option<String> {
        self.schema_error()
            .or_else(|| self.table_id_error())
            .or_else(|| self.formula_error())
    }
}
