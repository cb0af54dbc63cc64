use std::rc::Rc;

use serde_json::json;
use treeaccess::document::schema_tree::SchemaTree;
use treeaccess::document::value_tree::ValueTree;
use treeaccess::editor::accessor::layout::RendererType;
use treeaccess::editor::accessor::NodeAccessor;
use treeaccess::editor::tree::EditorTree;

fn rows() -> EditorTree<ValueTree> {
    EditorTree::with_defaults(ValueTree::from_json(&json!({
        "flag": true,
        "count": 3,
        "name": "Ada Lovelace  King",
        "blank": "   ",
        "tags": ["a", "b"],
        "nested": {"inner": {"x": 1}},
        "empty": {}
    })))
}

fn field(tree: &EditorTree<ValueTree>, path: &str) -> Rc<NodeAccessor<ValueTree>> {
    let id = tree.with_model(|m| m.resolve_path(path)).unwrap();
    tree.get(&id).unwrap()
}

#[test]
fn test_renderer_follows_value() {
    let tree = rows();
    assert_eq!(field(&tree, "flag").layout().renderer_type(), RendererType::Boolean);
    assert_eq!(field(&tree, "count").layout().renderer_type(), RendererType::Number);
    assert_eq!(field(&tree, "name").layout().renderer_type(), RendererType::String);
    assert_eq!(field(&tree, "tags").layout().renderer_type(), RendererType::Container);
    assert_eq!(field(&tree, "empty").layout().renderer_type(), RendererType::Container);
    assert_eq!(tree.root().layout().renderer_type().as_str(), "container");
}

#[test]
fn test_schema_renderer_ignores_declared_type() {
    let schema = SchemaTree::from_json_schema(
        "flags",
        &json!({
            "type": "object",
            "properties": {
                "active": {"type": "string", "default": true},
                "label": {"type": "number", "default": "n/a"},
                "score": {"type": "number"}
            }
        }),
    )
    .unwrap();
    let tree = EditorTree::with_defaults(schema);
    let active = tree.root().child_at(0).unwrap();
    let label = tree.root().child_at(1).unwrap();
    let score = tree.root().child_at(2).unwrap();

    assert_eq!(active.label().type_label(), "string");
    assert_eq!(active.layout().renderer_type(), RendererType::Boolean);
    assert_eq!(label.layout().renderer_type(), RendererType::String);
    assert_eq!(score.layout().renderer_type(), RendererType::Number);
}

#[test]
fn test_collapsed_labels() {
    let tree = rows();
    assert_eq!(field(&tree, "tags").layout().collapsed_label().as_deref(), Some("<2 items>"));
    assert_eq!(field(&tree, "nested").layout().collapsed_label().as_deref(), Some("<1 keys>"));
    assert_eq!(field(&tree, "empty").layout().collapsed_label().as_deref(), Some("<0 keys>"));
    assert_eq!(
        field(&tree, "name").layout().collapsed_label().as_deref(),
        Some("<text: 3 words>")
    );
    assert_eq!(
        field(&tree, "blank").layout().collapsed_label().as_deref(),
        Some("<empty text>")
    );
    assert_eq!(field(&tree, "count").layout().collapsed_label(), None);
    assert_eq!(field(&tree, "flag").layout().collapsed_label(), None);
}

#[test]
fn test_depth_counts_parents() {
    let tree = rows();
    assert_eq!(tree.root().layout().depth(), 0);
    assert_eq!(field(&tree, "nested").layout().depth(), 1);
    assert_eq!(field(&tree, "nested.inner.x").layout().depth(), 3);
}

#[test]
fn test_collapsible_tree() {
    let tree = rows();
    assert!(tree.root().layout().is_collapsible_tree());
    assert!(field(&tree, "nested").layout().is_collapsible_tree());
    assert!(!field(&tree, "count").layout().is_collapsible_tree());
    assert!(!field(&tree, "empty").layout().is_collapsible_tree());
    assert!(!field(&tree, "empty").layout().is_collapsible());
}

#[test]
fn test_guides_track_following_siblings() {
    let tree = rows();
    let x = field(&tree, "nested.inner.x");
    // `nested` has a sibling after it, `inner` does not.
    assert_eq!(x.layout().guides(), vec![true, false]);
    assert!(x.layout().is_last());
    assert!(!field(&tree, "flag").layout().is_last());
}
