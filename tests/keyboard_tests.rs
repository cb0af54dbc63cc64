use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::json;
use treeaccess::document::model::{NodeId, NodeKind};
use treeaccess::document::value_tree::ValueTree;
use treeaccess::editor::keyboard::KeyboardNavigation;
use treeaccess::editor::mode::NavMode;
use treeaccess::editor::tree::EditorTree;
use treeaccess::input::keys::{Key, KeyInput};
use treeaccess::input::pointer::{FocusHost, PointerDown, PointerEvents};
use treeaccess::scheduler::ManualScheduler;

#[derive(Default)]
struct RecordingHost {
    focused: Cell<usize>,
    scrolled: RefCell<Vec<NodeId>>,
}

impl FocusHost for RecordingHost {
    fn focus_container(&self) {
        self.focused.set(self.focused.get() + 1);
    }

    fn scroll_into_view(&self, id: &NodeId) {
        self.scrolled.borrow_mut().push(id.clone());
    }
}

struct Fixture {
    tree: EditorTree<ValueTree>,
    nav: KeyboardNavigation<ValueTree>,
    scheduler: Rc<ManualScheduler>,
    pointer: Rc<PointerEvents>,
    host: Rc<RecordingHost>,
}

fn fixture(document: serde_json::Value) -> Fixture {
    let tree = EditorTree::with_defaults(ValueTree::from_json(&document));
    let scheduler = Rc::new(ManualScheduler::new());
    let pointer = Rc::new(PointerEvents::new());
    let host = Rc::new(RecordingHost::default());
    let nav = KeyboardNavigation::new(tree.clone(), scheduler.clone(), pointer.clone());
    nav.set_container(Some(host.clone()));
    Fixture {
        tree,
        nav,
        scheduler,
        pointer,
        host,
    }
}

impl Fixture {
    fn id(&self, path: &str) -> NodeId {
        self.tree.with_model(|m| m.resolve_path(path)).unwrap()
    }

    fn select(&self, path: &str) {
        self.tree.state().set_active_node_id(Some(self.id(path)));
    }

    fn active(&self) -> Option<NodeId> {
        self.tree.state().active_node_id()
    }

    fn press(&self, key: Key) -> bool {
        self.nav.handle_key(KeyInput::new(key))
    }
}

#[test]
fn test_first_key_selects_first_row() {
    let f = fixture(json!({"a": 1}));
    assert!(f.press(Key::Down));
    assert_eq!(f.active(), Some(f.tree.root().id().clone()));
    assert_eq!(*f.host.scrolled.borrow(), vec![f.tree.root().id().clone()]);
}

#[test]
fn test_tab_and_shift_tab_walk_rows() {
    let f = fixture(json!({"a": 1, "b": 2}));
    f.select("a");
    f.press(Key::Tab);
    assert_eq!(f.active(), Some(f.id("b")));
    f.nav.handle_key(KeyInput::shifted(Key::Tab));
    assert_eq!(f.active(), Some(f.id("a")));
}

#[test]
fn test_right_expands_then_descends() {
    let f = fixture(json!({"obj": {"x": 1}}));
    let obj = f.id("obj");
    f.tree.state().set_expanded(&obj, false);
    f.select("obj");

    f.press(Key::Right);
    assert!(f.tree.state().is_expanded(&obj));
    assert_eq!(f.active(), Some(obj.clone()));

    f.press(Key::Right);
    assert_eq!(f.active(), Some(f.id("obj.x")));

    f.press(Key::Left);
    assert_eq!(f.active(), Some(obj.clone()));
    f.press(Key::Left);
    assert!(!f.tree.state().is_expanded(&obj));
}

#[test]
fn test_arrows_collapse_and_expand_empty_object() {
    let f = fixture(json!({"a": 1, "empty": {}}));
    let empty = f.id("empty");
    f.select("empty");

    f.press(Key::Left);
    assert_eq!(f.active(), Some(empty.clone()));
    assert!(!f.tree.state().is_expanded(&empty));

    f.press(Key::Right);
    assert_eq!(f.active(), Some(empty.clone()));
    assert!(f.tree.state().is_expanded(&empty));

    // Nothing to descend into.
    f.press(Key::Right);
    assert_eq!(f.active(), Some(empty.clone()));

    f.press(Key::Space);
    assert!(!f.tree.state().is_expanded(&empty));
}

#[test]
fn test_arrows_on_leaf_move_to_parent() {
    let f = fixture(json!({"obj": {"x": 1}}));
    f.select("obj.x");
    f.press(Key::Right);
    assert_eq!(f.active(), Some(f.id("obj.x")));
    f.press(Key::Left);
    assert_eq!(f.active(), Some(f.id("obj")));
}

#[test]
fn test_delete_selects_neighbour() {
    let f = fixture(json!({"a": 1, "b": 2, "c": 3}));
    f.select("b");
    f.press(Key::Delete);
    assert_eq!(f.active(), Some(f.id("c")));

    f.press(Key::Backspace);
    assert_eq!(f.active(), Some(f.id("a")));
    assert_eq!(f.tree.root().plain_value(), Some(json!({"a": 1})));
}

#[test]
fn test_delete_on_root_does_nothing() {
    let f = fixture(json!({"a": 1}));
    f.select("");
    assert!(f.press(Key::Delete));
    assert_eq!(f.tree.root().child_count(), 1);
}

#[test]
fn test_insert_adds_field_after_active() {
    let f = fixture(json!({"a": 1, "b": 2}));
    f.select("a");
    f.press(Key::Insert);

    let created = f.active().unwrap();
    let node = f.tree.get(&created).unwrap();
    assert_eq!(node.name(), "");
    assert_eq!(node.index(), Some(1));
    assert_eq!(f.tree.state().focus_request_count(&created), 1);
}

#[test]
fn test_insert_with_pending_unnamed_field_reselects_it() {
    let f = fixture(json!({"a": 1, "b": 2}));
    f.select("a");
    f.press(Key::Insert);
    let pending = f.active().unwrap();

    f.select("b");
    f.press(Key::Insert);

    assert_eq!(f.active(), Some(pending.clone()));
    assert_eq!(f.tree.state().focus_request_count(&pending), 2);
    assert_eq!(f.tree.root().child_count(), 3);
}

#[test]
fn test_insert_on_object_adds_first_field() {
    let f = fixture(json!({"obj": {"x": 1}}));
    let obj = f.id("obj");
    f.tree.state().set_expanded(&obj, false);
    f.select("obj");
    f.press(Key::Insert);

    assert!(f.tree.state().is_expanded(&obj));
    let created = f.tree.get(&f.active().unwrap()).unwrap();
    assert_eq!(created.parent_id(), Some(obj));
    assert_eq!(created.index(), Some(0));
}

#[test]
fn test_escape_drops_unnamed_field_then_clears_selection() {
    let f = fixture(json!({"a": 1}));
    f.select("a");
    f.press(Key::Insert);
    assert_eq!(f.tree.root().child_count(), 2);

    f.press(Key::Escape);
    assert_eq!(f.tree.root().child_count(), 1);

    f.select("a");
    f.press(Key::Escape);
    assert_eq!(f.active(), None);
    assert_eq!(f.tree.root().child_count(), 1);
}

#[test]
fn test_escape_after_pointer_press_is_ignored_once() {
    let f = fixture(json!({"a": 1}));
    f.select("a");
    f.pointer.dispatch(PointerDown::on_node(f.id("a")));

    f.press(Key::Escape);
    assert_eq!(f.active(), Some(f.id("a")));

    f.press(Key::Escape);
    assert_eq!(f.active(), None);
}

#[test]
fn test_pointer_flags_reset_on_next_tick() {
    let f = fixture(json!({"a": 1}));
    f.select("a");
    f.pointer.dispatch(PointerDown::on_node(f.id("a")));
    f.scheduler.run_until_idle();

    f.press(Key::Escape);
    assert_eq!(f.active(), None);
}

#[test]
fn test_pointer_on_empty_space_clears_selection() {
    let f = fixture(json!({"a": 1}));
    f.select("a");
    f.pointer.dispatch(PointerDown::on_empty_space());
    assert_eq!(f.active(), None);

    f.select("a");
    f.pointer.dispatch(PointerDown::outside());
    assert_eq!(f.active(), Some(f.id("a")));
}

#[test]
fn test_edit_mode_follows_focus_and_refocuses_tree() {
    let f = fixture(json!({"a": 1}));
    let a = f.id("a");
    f.select("a");
    f.press(Key::Enter);
    assert_eq!(f.tree.state().focus_request_count(&a), 1);

    f.tree.state().set_focused(&a, true);
    assert_eq!(f.nav.mode(), NavMode::EditName);
    assert!(!f.press(Key::Down));

    f.tree.state().set_focused(&a, false);
    assert_eq!(f.nav.mode(), NavMode::TreeNav);
    assert_eq!(f.host.focused.get(), 0);
    f.scheduler.run_until_idle();
    assert_eq!(f.host.focused.get(), 1);
}

#[test]
fn test_pointer_press_suppresses_refocus() {
    let f = fixture(json!({"a": 1, "b": 2}));
    let a = f.id("a");
    f.select("a");
    f.tree.state().set_focused(&a, true);

    f.pointer.dispatch(PointerDown::on_node(f.id("b")));
    f.tree.state().set_focused(&a, false);
    f.scheduler.run_until_idle();

    assert_eq!(f.nav.mode(), NavMode::TreeNav);
    assert_eq!(f.host.focused.get(), 0);
}

#[test]
fn test_replaced_node_stays_active() {
    let f = fixture(json!({"a": 1}));
    let a = f.tree.get(&f.id("a")).unwrap();
    f.select("a");

    let replacement = a.change_kind(NodeKind::Array).unwrap();
    f.nav.handle_node_replaced(a.id(), replacement.id());

    assert_eq!(f.active(), Some(replacement.id().clone()));
}

#[test]
fn test_dispose_detaches_listeners() {
    let f = fixture(json!({"a": 1}));
    assert_eq!(f.pointer.listener_count(), 1);

    f.nav.dispose();
    f.nav.dispose();

    assert!(f.nav.is_disposed());
    assert_eq!(f.pointer.listener_count(), 0);
    assert!(!f.press(Key::Down));
    assert_eq!(f.scheduler.pending(), 0);
}

#[test]
fn test_detaching_container_stops_pointer_handling() {
    let f = fixture(json!({"a": 1}));
    f.nav.set_container(None);
    f.select("a");
    f.pointer.dispatch(PointerDown::on_empty_space());
    assert_eq!(f.active(), Some(f.id("a")));
}
