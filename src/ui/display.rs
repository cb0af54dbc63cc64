//! What a row shows, independent of how it is drawn.
//!
//! [`TreeDisplay`] lets each model decide its labels. [`build_rows`] walks the
//! visible nodes once and produces plain [`TreeRow`] values that both the
//! terminal renderer and the `--dump` text output consume.

use crate::document::model::{NodeId, Scalar, TreeModel};
use crate::document::schema_tree::SchemaTree;
use crate::document::value_tree::ValueTree;
use crate::editor::accessor::layout::RendererType;
use crate::editor::accessor::NodeAccessor;
use crate::editor::tree::EditorTree;

/// Per-model labels for tree rows.
pub trait TreeDisplay: TreeModel + Sized + 'static {
    fn name_label(node: &NodeAccessor<Self>) -> String {
        if node.is_root() {
            return "(root)".to_string();
        }
        if node.is_list_item() {
            return format!("[{}]", node.index().unwrap_or(0));
        }
        node.name()
    }

    /// Text shown after the name of an expanded or leaf row.
    fn value_label(tree: &EditorTree<Self>, node: &NodeAccessor<Self>) -> Option<String>;

    fn error_label(_node: &NodeAccessor<Self>) -> Option<String> {
        None
    }

    /// Current formula text, for models that have formulas.
    fn formula_text(_node: &NodeAccessor<Self>) -> Option<String> {
        None
    }

    /// Stores a formula. The error string is shown to the user.
    fn commit_formula(_node: &NodeAccessor<Self>, _text: &str) -> Result<(), String> {
        Err("Formulas are only available in schemas".to_string())
    }

    /// Forgets formula input that was never committed.
    fn discard_formula(_node: &NodeAccessor<Self>) {}
}

impl TreeDisplay for ValueTree {
    fn value_label(tree: &EditorTree<Self>, node: &NodeAccessor<Self>) -> Option<String> {
        if node.is_foreign_key() {
            let table = tree.with_model(|m| m.foreign_key_table(node.id()).map(str::to_string));
            let value = node.value().map(|v| v.to_string()).unwrap_or_default();
            return Some(format!("{} -> {}", value, table.unwrap_or_default()));
        }
        if node.is_ref() {
            let reference = tree.with_model(|m| m.reference(node.id()).map(str::to_string));
            return Some(format!("ref({})", reference.unwrap_or_default()));
        }
        node.value().map(|v| match v {
            Scalar::Text(text) => format!("\"{}\"", text),
            other => other.to_string(),
        })
    }
}

impl TreeDisplay for SchemaTree {
    fn name_label(node: &NodeAccessor<Self>) -> String {
        node.label().name_label()
    }

    fn value_label(_tree: &EditorTree<Self>, node: &NodeAccessor<Self>) -> Option<String> {
        let mut label = node.label().type_label();
        let formula = node.formula().display_value();
        if !formula.is_empty() {
            label.push_str(" = ");
            label.push_str(&formula);
        }
        Some(label)
    }

    fn error_label(node: &NodeAccessor<Self>) -> Option<String> {
        node.validation().error_message()
    }

    fn formula_text(node: &NodeAccessor<Self>) -> Option<String> {
        if node.is_primitive() {
            Some(node.formula().display_value())
        } else {
            None
        }
    }

    fn commit_formula(node: &NodeAccessor<Self>, text: &str) -> Result<(), String> {
        let formula = node.formula();
        formula.set_input(text);
        if formula.apply() {
            Ok(())
        } else {
            Err(formula.error().unwrap_or_else(|| "Invalid formula".to_string()))
        }
    }

    fn discard_formula(node: &NodeAccessor<Self>) {
        node.formula().discard();
    }
}

/// One visible line of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow {
    pub id: NodeId,
    pub depth: usize,
    pub guides: Vec<bool>,
    pub is_root: bool,
    pub is_last: bool,
    pub expandable: bool,
    pub expanded: bool,
    pub active: bool,
    pub name: String,
    pub value: Option<String>,
    pub renderer: RendererType,
    pub error: Option<String>,
}

pub fn build_rows<M: TreeDisplay>(tree: &EditorTree<M>) -> Vec<TreeRow> {
    tree.visible_node_ids()
        .iter()
        .filter_map(|id| tree.get(id))
        .map(|node| {
            let layout = node.layout();
            let state = node.state();
            let expandable = layout.is_collapsible();
            let expanded = state.is_expanded();
            let value = if expandable && !expanded {
                layout.collapsed_label()
            } else if node.is_primitive() || node.is_foreign_key() || node.is_ref() {
                M::value_label(tree, &node)
            } else {
                None
            };
            TreeRow {
                id: node.id().clone(),
                depth: layout.depth(),
                guides: layout.guides(),
                is_root: node.is_root(),
                is_last: layout.is_last(),
                expandable,
                expanded,
                active: state.is_active(),
                name: M::name_label(&node),
                value,
                renderer: layout.renderer_type(),
                error: M::error_label(&node),
            }
        })
        .collect()
}

/// Leading connector text for a row: one column group per non-root
/// ancestor, then the row's own branch.
pub fn guide_prefix(row: &TreeRow, indent: usize, show_guides: bool) -> String {
    if row.is_root {
        return String::new();
    }
    let width = indent.max(1);
    let mut out = String::new();
    for continues in &row.guides {
        if show_guides && *continues {
            out.push('│');
            out.push_str(&" ".repeat(width - 1));
        } else {
            out.push_str(&" ".repeat(width));
        }
    }
    if show_guides {
        out.push(if row.is_last { '└' } else { '├' });
        out.push_str(&"─".repeat(width - 1));
    } else {
        out.push_str(&" ".repeat(width));
    }
    out
}

/// Plain text rendering of the visible rows, used by `--dump`.
pub fn render_text(rows: &[TreeRow], indent: usize, show_guides: bool) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&guide_prefix(row, indent, show_guides));
        if row.expandable {
            out.push_str(if row.expanded { "▼ " } else { "▶ " });
        }
        out.push_str(&row.name);
        if let Some(value) = &row.value {
            out.push_str(": ");
            out.push_str(value);
        }
        if let Some(error) = &row.error {
            out.push_str("  ! ");
            out.push_str(error);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_follow_visible_order() {
        let tree = EditorTree::with_defaults(ValueTree::from_json(&json!({
            "a": 1,
            "b": {"c": "x"}
        })));
        let rows = build_rows(&tree);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["(root)", "a", "b", "c"]);
        assert_eq!(rows[1].value.as_deref(), Some("1"));
        assert_eq!(rows[3].value.as_deref(), Some("\"x\""));
        assert_eq!(rows[3].guides, vec![false]);
    }

    #[test]
    fn test_collapsed_row_shows_summary() {
        let tree = EditorTree::with_defaults(ValueTree::from_json(&json!({"list": [1, 2, 3]})));
        let list = tree.root().child_at(0).unwrap();
        list.state().collapse();
        let rows = build_rows(&tree);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].value.as_deref(), Some("<3 items>"));
    }

    #[test]
    fn test_render_text_draws_guides() {
        let tree = EditorTree::with_defaults(ValueTree::from_json(&json!({
            "a": {"x": 1},
            "b": 2
        })));
        let text = render_text(&build_rows(&tree), 2, true);
        let expected = "▼ (root)\n├─▼ a\n│ └─x: 1\n└─b: 2\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_schema_rows_show_types_and_errors() {
        let schema = SchemaTree::from_json_schema(
            "orders",
            &json!({
                "type": "object",
                "properties": {
                    "price": {"type": "number"},
                    "": {"type": "string"}
                }
            }),
        )
        .unwrap();
        let tree = EditorTree::with_defaults(schema);
        let rows = build_rows(&tree);
        assert_eq!(rows[0].name, "orders");
        assert_eq!(rows[1].value.as_deref(), Some("number"));
        assert_eq!(rows[2].name, "<unnamed>");
        assert!(rows[2].error.is_some());
    }
}
