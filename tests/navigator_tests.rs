use serde_json::json;
use treeaccess::document::model::{NodeId, TreeModel};
use treeaccess::document::value_tree::ValueTree;
use treeaccess::editor::navigator::TreeNavigator;
use treeaccess::editor::tree_state::TreeState;

fn sample() -> ValueTree {
    ValueTree::from_json(&json!({
        "a": 1,
        "b": {"c": 2, "d": 3}
    }))
}

fn ids(model: &ValueTree) -> (NodeId, NodeId, NodeId, NodeId, NodeId) {
    let root = model.root_id();
    let a = model.child(&root, "a").unwrap();
    let b = model.child(&root, "b").unwrap();
    let c = model.child(&b, "c").unwrap();
    let d = model.child(&b, "d").unwrap();
    (root, a, b, c, d)
}

#[test]
fn test_collapsed_branch_hides_children() {
    let model = sample();
    let state = TreeState::new();
    let (root, a, b, c, d) = ids(&model);

    state.set_expanded(&b, false);
    let nav = TreeNavigator::new(&model, &state);
    assert_eq!(nav.visible_node_ids(), vec![root.clone(), a.clone(), b.clone()]);

    state.set_expanded(&b, true);
    let nav = TreeNavigator::new(&model, &state);
    assert_eq!(nav.visible_node_ids(), vec![root, a, b, c, d]);
}

#[test]
fn test_parent_and_first_child_lookup() {
    let model = sample();
    let state = TreeState::new();
    let (root, a, b, c, _) = ids(&model);
    let nav = TreeNavigator::new(&model, &state);

    assert_eq!(nav.find_parent_id(&c), Some(b.clone()));
    assert_eq!(nav.find_parent_id(&a), Some(root.clone()));
    assert_eq!(nav.find_parent_id(&root), None);
    assert_eq!(nav.first_child_id(&b), Some(c));
    assert_eq!(nav.first_child_id(&a), None);
    assert!(nav.node_has_children(&b));
    assert!(!nav.node_has_children(&a));
}

#[test]
fn test_steps_follow_visible_order() {
    let model = sample();
    let state = TreeState::new();
    let (_, a, b, c, d) = ids(&model);
    let nav = TreeNavigator::new(&model, &state);

    assert_eq!(nav.next_visible(&a), Some(b.clone()));
    assert_eq!(nav.next_visible(&b), Some(c.clone()));
    assert_eq!(nav.previous_visible(&c), Some(b));
    assert_eq!(nav.next_visible(&d), Some(d));
}
