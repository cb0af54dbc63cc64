//! Terminal UI.
//!
//! The screen has three areas stacked vertically:
//! - the tree view (everything but the last two lines)
//! - the status line
//! - the message area, replaced by the inline prompt while editing
//!
//! The context menu is drawn on top of the tree view when open.

pub mod colors;
pub mod display;
pub mod edit_prompt;
pub mod menu_popup;
pub mod message_area;
pub mod status_line;
pub mod tree_view;

use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;

use crate::app::App;
use colors::Palette;
use display::TreeDisplay;
use status_line::StatusInfo;
use tree_view::TreeViewOptions;

/// Draws an [`App`] into a terminal.
///
/// # Example
///
/// ```
/// use ratatui::backend::TestBackend;
/// use ratatui::Terminal;
/// use serde_json::json;
/// use treeaccess::app::App;
/// use treeaccess::config::Config;
/// use treeaccess::document::value_tree::ValueTree;
/// use treeaccess::editor::tree::EditorTree;
/// use treeaccess::ui::UI;
///
/// let tree = EditorTree::with_defaults(ValueTree::from_json(&json!({"a": 1})));
/// let app = App::new(tree, Config::default());
/// let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
/// UI::new().render(&mut terminal, &app).unwrap();
/// ```
pub struct UI {
    colors: Palette,
}

impl Default for UI {
    fn default() -> Self {
        Self::new()
    }
}

impl UI {
    pub fn new() -> Self {
        Self {
            colors: Palette::default(),
        }
    }

    pub fn with_palette(colors: Palette) -> Self {
        Self { colors }
    }

    pub fn render<B: Backend, M: TreeDisplay>(
        &self,
        terminal: &mut Terminal<B>,
        app: &App<M>,
    ) -> Result<()> {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ])
                .split(f.area());

            app.viewport().set_height(chunks[0].height as usize);
            let rows = app.rows();
            let offset = app.viewport().offset();
            let options = TreeViewOptions {
                indent_size: app.config().indent_size,
                show_guides: app.config().show_guides,
            };
            tree_view::render_tree_view(f, chunks[0], &rows, offset, options, &self.colors);

            let active_row = rows.iter().position(|r| r.active);
            let info = StatusInfo {
                mode: app.mode(),
                filename: app.filename(),
                dirty: app.is_dirty(),
                path: app.active_path(),
                position: active_row.map(|i| (i + 1, rows.len())),
            };
            status_line::render_status_line(f, chunks[1], &info, &self.colors);

            match app.prompt() {
                Some(prompt) => edit_prompt::render_edit_prompt(
                    f,
                    chunks[2],
                    prompt.label(),
                    &prompt.buffer,
                    prompt.cursor_chars(),
                    &self.colors,
                ),
                None => message_area::render_message_area(
                    f,
                    chunks[2],
                    app.message().as_ref(),
                    &self.colors,
                ),
            }

            if let Some(menu) = app.menu() {
                let anchor = active_row.unwrap_or(0).saturating_sub(offset) as u16;
                menu_popup::render_menu_popup(f, chunks[0], anchor, menu, &self.colors);
            }
        })?;
        Ok(())
    }
}
