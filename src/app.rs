//! The interactive editor: glue between terminal events and the tree engine.
//!
//! [`App`] owns an [`EditorTree`], the [`KeyboardNavigation`] state machine
//! and the pieces a terminal front end adds around them: an inline prompt
//! that answers focus requests, a context menu popup, a status message that
//! clears itself, and a viewport that follows the active node. Time only
//! passes when the event loop calls [`App::tick`], which keeps the whole
//! thing testable without a terminal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use log::info;
use termion::event::{Event, Key as TermKey, MouseButton, MouseEvent};

use crate::config::Config;
use crate::document::model::NodeId;
use crate::editor::accessor::menu::MenuAction;
use crate::editor::keyboard::KeyboardNavigation;
use crate::editor::mode::NavMode;
use crate::editor::tree::EditorTree;
use crate::input::keys::{map_termion_key, Key, KeyInput};
use crate::input::pointer::{FocusHost, PointerDown, PointerEvents};
use crate::reactive::Subscription;
use crate::scheduler::{Debounce, ManualScheduler};
use crate::ui::display::{build_rows, TreeDisplay, TreeRow};
use crate::ui::menu_popup::MenuPopup;

/// A status message shown below the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub level: MessageLevel,
}

/// Message severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// What the inline prompt is editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    Rename(NodeId),
    Formula(NodeId),
}

/// The inline single-line editor. `cursor` is a byte offset into `buffer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub buffer: String,
    pub cursor: usize,
}

impl Prompt {
    fn new(kind: PromptKind, text: String) -> Self {
        let cursor = text.len();
        Self {
            kind,
            buffer: text,
            cursor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.kind {
            PromptKind::Rename(_) => "Name: ",
            PromptKind::Formula(_) => "Formula: ",
        }
    }

    pub fn node_id(&self) -> &NodeId {
        match &self.kind {
            PromptKind::Rename(id) | PromptKind::Formula(id) => id,
        }
    }

    fn insert(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            let start = self.buffer[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.buffer.remove(start);
            self.cursor = start;
        }
    }

    fn left(&mut self) {
        self.cursor = self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0);
    }

    fn right(&mut self) {
        if let Some(ch) = self.buffer[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    /// Cursor position counted in characters, for rendering.
    pub fn cursor_chars(&self) -> usize {
        self.buffer[..self.cursor].chars().count()
    }
}

/// Scroll position of the tree area. The navigation talks to it through
/// [`FocusHost`].
#[derive(Debug, Default)]
pub struct Viewport {
    offset: Cell<usize>,
    height: Cell<usize>,
    focus_count: Cell<u64>,
    target: RefCell<Option<NodeId>>,
}

impl Viewport {
    pub fn offset(&self) -> usize {
        self.offset.get()
    }

    pub fn height(&self) -> usize {
        self.height.get()
    }

    pub fn set_height(&self, height: usize) {
        self.height.set(height);
    }

    /// How many times the tree container took keyboard focus back.
    pub fn focus_count(&self) -> u64 {
        self.focus_count.get()
    }

    /// Applies a pending scroll request against the current row order and
    /// keeps the offset within bounds.
    pub fn reveal(&self, ids: &[NodeId]) {
        let height = self.height.get().max(1);
        if let Some(target) = self.target.borrow_mut().take() {
            if let Some(index) = ids.iter().position(|id| *id == target) {
                let offset = self.offset.get();
                if index < offset {
                    self.offset.set(index);
                } else if index >= offset + height {
                    self.offset.set(index + 1 - height);
                }
            }
        }
        let max_offset = ids.len().saturating_sub(height);
        if self.offset.get() > max_offset {
            self.offset.set(max_offset);
        }
    }
}

impl FocusHost for Viewport {
    fn focus_container(&self) {
        self.focus_count.set(self.focus_count.get() + 1);
    }

    fn scroll_into_view(&self, id: &NodeId) {
        *self.target.borrow_mut() = Some(id.clone());
    }
}

pub struct App<M: TreeDisplay> {
    tree: EditorTree<M>,
    nav: KeyboardNavigation<M>,
    scheduler: Rc<ManualScheduler>,
    pointer: Rc<PointerEvents>,
    viewport: Rc<Viewport>,
    config: Config,
    filename: Option<String>,
    message: Rc<RefCell<Option<Message>>>,
    message_clear: Debounce,
    menu: Option<MenuPopup>,
    prompt: Option<Prompt>,
    focus_requests: Rc<RefCell<Vec<NodeId>>>,
    _focus_subscription: Subscription,
    should_quit: bool,
}

impl<M: TreeDisplay> App<M> {
    pub fn new(tree: EditorTree<M>, config: Config) -> Self {
        let scheduler = Rc::new(ManualScheduler::new());
        let pointer = Rc::new(PointerEvents::new());
        let viewport = Rc::new(Viewport::default());
        let nav = KeyboardNavigation::new(tree.clone(), scheduler.clone(), pointer.clone());
        nav.set_container(Some(viewport.clone()));

        let focus_requests = Rc::new(RefCell::new(Vec::new()));
        let requests = Rc::clone(&focus_requests);
        let focus_subscription = tree
            .state()
            .on_focus_request(move |id| requests.borrow_mut().push(id.clone()));

        let message_clear = Debounce::new(scheduler.clone(), config.message_timeout());

        if !config.expand_on_load {
            tree.root().layout().collapse_all();
        }

        Self {
            tree,
            nav,
            scheduler,
            pointer,
            viewport,
            config,
            filename: None,
            message: Rc::new(RefCell::new(None)),
            message_clear,
            menu: None,
            prompt: None,
            focus_requests,
            _focus_subscription: focus_subscription,
            should_quit: false,
        }
    }

    pub fn set_filename(&mut self, name: impl Into<String>) {
        self.filename = Some(name.into());
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn tree(&self) -> &EditorTree<M> {
        &self.tree
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> NavMode {
        self.nav.mode()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scheduler(&self) -> &ManualScheduler {
        &self.scheduler
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn menu(&self) -> Option<&MenuPopup> {
        self.menu.as_ref()
    }

    pub fn message(&self) -> Option<Message> {
        self.message.borrow().clone()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_dirty(&self) -> bool {
        self.tree.root().is_dirty()
    }

    /// Path of the active node, empty at the root or with nothing selected.
    pub fn active_path(&self) -> String {
        self.tree
            .state()
            .active_node_id()
            .and_then(|id| self.tree.get(&id))
            .map(|node| node.path())
            .unwrap_or_default()
    }

    /// Visible rows, with the viewport brought in line with them.
    pub fn rows(&self) -> Vec<TreeRow> {
        let rows = build_rows(&self.tree);
        let ids: Vec<NodeId> = rows.iter().map(|r| r.id.clone()).collect();
        self.viewport.reveal(&ids);
        rows
    }

    pub fn set_message(&self, text: impl Into<String>, level: MessageLevel) {
        *self.message.borrow_mut() = Some(Message {
            text: text.into(),
            level,
        });
        let message = Rc::clone(&self.message);
        self.message_clear.schedule(move || {
            message.borrow_mut().take();
        });
    }

    /// Lets `elapsed` pass on the scheduler clock.
    pub fn tick(&self, elapsed: Duration) {
        self.scheduler.advance(elapsed);
    }

    /// Handles one terminal event. Deferred work queued by the event runs
    /// before this returns.
    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Key(TermKey::Ctrl('c')) => self.should_quit = true,
            _ => {
                if let Some(input) = map_termion_key(event) {
                    self.handle_input(input);
                }
            }
        }
        self.open_requested_prompt();
        self.scheduler.run_until_idle();
    }

    fn handle_input(&mut self, input: KeyInput) {
        if self.prompt.is_some() {
            self.handle_prompt_key(input);
            return;
        }
        if self.menu.is_some() {
            self.handle_menu_key(input);
            return;
        }
        match input.key {
            Key::Char('q') => self.should_quit = true,
            Key::Char('m') => self.open_menu(),
            Key::Char('=') => self.open_formula_prompt(),
            _ => {
                self.nav.handle_key(input);
            }
        }
    }

    fn active_node(&self) -> Option<NodeId> {
        self.tree
            .state()
            .active_node_id()
            .filter(|id| self.tree.get(id).is_some())
    }

    // Focus requests

    fn open_requested_prompt(&mut self) {
        let requested = self.focus_requests.borrow_mut().drain(..).last();
        let Some(id) = requested else {
            return;
        };
        if self.prompt.is_some() {
            return;
        }
        let Some(node) = self.tree.get(&id) else {
            return;
        };
        if node.is_root() || node.is_list_item() {
            self.set_message("Only named fields can be renamed", MessageLevel::Warning);
            return;
        }
        self.prompt = Some(Prompt::new(PromptKind::Rename(id.clone()), node.name()));
        node.state().set_focused(true);
    }

    fn open_formula_prompt(&mut self) {
        let Some(node) = self.active_node().and_then(|id| self.tree.get(&id)) else {
            self.set_message("Select a node first", MessageLevel::Warning);
            return;
        };
        match M::formula_text(&node) {
            Some(text) => {
                self.prompt = Some(Prompt::new(PromptKind::Formula(node.id().clone()), text));
                node.state().set_focused(true);
            }
            None => self.set_message("This node has no formula", MessageLevel::Warning),
        }
    }

    fn handle_prompt_key(&mut self, input: KeyInput) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match input.key {
            Key::Char(ch) => prompt.insert(ch),
            Key::Space => prompt.insert(' '),
            Key::Backspace => prompt.backspace(),
            Key::Left => prompt.left(),
            Key::Right => prompt.right(),
            Key::Enter => self.commit_prompt(),
            Key::Escape => self.cancel_prompt(),
            _ => {}
        }
    }

    fn commit_prompt(&mut self) {
        let Some(prompt) = self.prompt.clone() else {
            return;
        };
        let Some(node) = self.tree.get(prompt.node_id()) else {
            self.prompt = None;
            return;
        };
        let outcome = match &prompt.kind {
            PromptKind::Rename(_) => node.rename(prompt.buffer.trim()).map_err(|e| e.to_string()),
            PromptKind::Formula(_) => M::commit_formula(&node, &prompt.buffer),
        };
        match outcome {
            Ok(()) => {
                self.prompt = None;
                node.state().set_focused(false);
                if matches!(prompt.kind, PromptKind::Formula(_)) {
                    self.set_message("Formula updated", MessageLevel::Info);
                }
            }
            Err(e) => self.set_message(e, MessageLevel::Error),
        }
    }

    /// Closes the prompt without saving. An abandoned unnamed field is
    /// dropped by handing the Escape on to the navigation.
    fn cancel_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let Some(node) = self.tree.get(prompt.node_id()) else {
            return;
        };
        node.state().set_focused(false);
        match prompt.kind {
            PromptKind::Rename(_) if node.name().is_empty() => {
                self.nav.handle_key(Key::Escape.into());
            }
            PromptKind::Rename(_) => {}
            PromptKind::Formula(_) => M::discard_formula(&node),
        }
    }

    // Menu

    fn open_menu(&mut self) {
        let Some(node) = self.active_node().and_then(|id| self.tree.get(&id)) else {
            self.set_message("Select a node first", MessageLevel::Warning);
            return;
        };
        let popup = MenuPopup::new(node.id().clone(), &node.menu().items());
        if popup.is_empty() {
            self.set_message("No actions for this node", MessageLevel::Info);
            return;
        }
        node.state().set_menu_open(true);
        self.menu = Some(popup);
    }

    fn close_menu(&mut self) {
        if let Some(menu) = self.menu.take() {
            if let Some(node) = self.tree.get(menu.node_id()) {
                node.state().set_menu_open(false);
            }
        }
    }

    fn handle_menu_key(&mut self, input: KeyInput) {
        let Some(menu) = self.menu.as_mut() else {
            return;
        };
        match input.key {
            Key::Up => menu.select_previous(),
            Key::Down | Key::Tab => menu.select_next(),
            Key::Enter => {
                let action = menu.selected_action();
                let node_id = menu.node_id().clone();
                self.close_menu();
                if let Some(action) = action {
                    self.run_menu_action(&node_id, action);
                }
            }
            Key::Escape | Key::Char('m') => self.close_menu(),
            _ => {}
        }
    }

    fn run_menu_action(&mut self, id: &NodeId, action: MenuAction) {
        let Some(node) = self.tree.get(id) else {
            return;
        };
        match node.menu().perform(action) {
            Ok(Some(created)) => self.nav.handle_node_added(&created),
            Ok(None) => match action {
                MenuAction::CopyJson => self.set_message("Copied JSON", MessageLevel::Info),
                MenuAction::CopyPath => self.set_message("Copied path", MessageLevel::Info),
                MenuAction::Delete => self.set_message("Deleted", MessageLevel::Info),
                _ => {}
            },
            Err(e) => self.set_message(e.to_string(), MessageLevel::Error),
        }
    }

    // Pointer

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        if !self.config.enable_mouse {
            return;
        }
        let MouseEvent::Press(MouseButton::Left, _x, y) = *mouse else {
            return;
        };
        // Termion rows are 1-based.
        let row = (y as usize).saturating_sub(1);
        self.click_row(row);
    }

    /// A left click on screen row `row` (0-based).
    pub fn click_row(&mut self, row: usize) {
        if self.menu.is_some() {
            self.pointer.dispatch(PointerDown::in_overlay());
            self.close_menu();
            return;
        }
        if row >= self.viewport.height() {
            self.pointer.dispatch(PointerDown::outside());
            return;
        }
        let index = self.viewport.offset() + row;
        let target = self.tree.visible_node_ids().get(index).cloned();
        match &target {
            Some(id) => self.pointer.dispatch(PointerDown::on_node(id.clone())),
            None => self.pointer.dispatch(PointerDown::on_empty_space()),
        }
        if self.prompt.is_some() {
            info!("Inline editor closed by pointer press");
            self.commit_prompt_or_cancel();
        }
        if let Some(id) = target {
            self.tree.state().set_active_node_id(Some(id));
        }
    }

    fn commit_prompt_or_cancel(&mut self) {
        self.commit_prompt();
        if self.prompt.is_some() {
            self.cancel_prompt();
        }
    }
}

impl<M: TreeDisplay> Drop for App<M> {
    fn drop(&mut self) {
        self.nav.dispose();
        self.message_clear.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::value_tree::ValueTree;
    use serde_json::json;

    fn key(k: TermKey) -> Event {
        Event::Key(k)
    }

    fn app() -> App<ValueTree> {
        let tree = EditorTree::with_defaults(ValueTree::from_json(&json!({
            "name": "Ada",
            "tags": ["a", "b", "c"]
        })));
        let app = App::new(tree, Config::default());
        app.viewport().set_height(10);
        app
    }

    fn active_name(app: &App<ValueTree>) -> String {
        let id = app.tree().state().active_node_id().unwrap();
        app.tree().get(&id).unwrap().name()
    }

    #[test]
    fn test_enter_opens_rename_prompt() {
        let mut app = app();
        app.handle_event(&key(TermKey::Down));
        app.handle_event(&key(TermKey::Down));
        app.handle_event(&key(TermKey::Char('\n')));

        assert_eq!(app.mode(), NavMode::EditName);
        assert_eq!(app.prompt().unwrap().buffer, "name");

        app.handle_event(&key(TermKey::Backspace));
        app.handle_event(&key(TermKey::Backspace));
        app.handle_event(&key(TermKey::Backspace));
        app.handle_event(&key(TermKey::Backspace));
        for ch in "title".chars() {
            app.handle_event(&key(TermKey::Char(ch)));
        }
        app.handle_event(&key(TermKey::Char('\n')));

        assert!(app.prompt().is_none());
        assert_eq!(app.mode(), NavMode::TreeNav);
        assert_eq!(active_name(&app), "title");
        assert!(app.is_dirty());
        assert_eq!(app.viewport().focus_count(), 1);
    }

    #[test]
    fn test_escape_on_new_field_drops_it() {
        let mut app = app();
        app.handle_event(&key(TermKey::Down));
        app.handle_event(&key(TermKey::Insert));
        assert_eq!(app.tree().root().child_count(), 3);
        assert!(app.prompt().is_some());

        app.handle_event(&key(TermKey::Esc));
        assert!(app.prompt().is_none());
        assert_eq!(app.tree().root().child_count(), 2);
    }

    #[test]
    fn test_menu_adds_item_to_end() {
        let mut app = app();
        app.handle_event(&key(TermKey::Down));
        app.handle_event(&key(TermKey::Down));
        app.handle_event(&key(TermKey::Down));
        assert_eq!(active_name(&app), "tags");

        app.handle_event(&key(TermKey::Char('m')));
        let menu = app.menu().unwrap();
        let position = menu.position_of("add-to-end").unwrap();
        for _ in 0..position {
            app.handle_event(&key(TermKey::Down));
        }
        app.handle_event(&key(TermKey::Char('\n')));

        assert!(app.menu().is_none());
        let tags = app.tree().root().child_at(1).unwrap();
        assert_eq!(tags.child_count(), 4);
        let active = app.tree().state().active_node_id().unwrap();
        assert_eq!(active, *tags.child_at(3).unwrap().id());
    }

    #[test]
    fn test_click_on_empty_space_clears_selection() {
        let mut app = app();
        app.handle_event(&key(TermKey::Down));
        app.click_row(8);
        assert!(app.tree().state().active_node_id().is_none());

        app.click_row(1);
        assert_eq!(active_name(&app), "name");
    }

    #[test]
    fn test_message_clears_after_timeout() {
        let mut app = app();
        app.handle_event(&key(TermKey::Char('=')));
        assert_eq!(app.message().unwrap().level, MessageLevel::Warning);

        app.tick(Duration::from_millis(1999));
        assert!(app.message().is_some());
        app.tick(Duration::from_millis(1));
        assert!(app.message().is_none());
    }

    #[test]
    fn test_viewport_follows_active_node() {
        let mut app = app();
        app.viewport().set_height(2);
        for _ in 0..4 {
            app.handle_event(&key(TermKey::Down));
        }
        app.rows();
        assert_eq!(app.viewport().offset(), 2);
    }

    #[test]
    fn test_q_quits() {
        let mut app = app();
        app.handle_event(&key(TermKey::Char('q')));
        assert!(app.should_quit());
    }
}
