//! Context menu popup.
//!
//! The menu tree from [`MenuView::items`](crate::editor::accessor::menu::MenuView::items)
//! is flattened into rows: submenus become a heading followed by their
//! entries, one level deeper. Only rows with an action can be selected.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::document::model::NodeId;
use crate::editor::accessor::menu::{MenuAction, MenuItem};
use crate::ui::colors::Palette;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRow {
    pub value: &'static str,
    pub label: &'static str,
    pub depth: usize,
    pub action: Option<MenuAction>,
    pub separator_before: bool,
}

/// An open context menu for one node.
#[derive(Debug, Clone)]
pub struct MenuPopup {
    node: NodeId,
    rows: Vec<MenuRow>,
    selected: usize,
}

fn flatten(items: &[MenuItem], depth: usize, out: &mut Vec<MenuRow>) {
    let mut separate_next = false;
    for item in items {
        out.push(MenuRow {
            value: item.value,
            label: item.label,
            depth,
            action: item.action,
            separator_before: (item.before_separator || separate_next) && !out.is_empty(),
        });
        flatten(&item.children, depth + 1, out);
        separate_next = item.after_separator;
    }
}

impl MenuPopup {
    pub fn new(node: NodeId, items: &[MenuItem]) -> Self {
        let mut rows = Vec::new();
        flatten(items, 0, &mut rows);
        let selected = rows.iter().position(|r| r.action.is_some()).unwrap_or(0);
        Self {
            node,
            rows,
            selected,
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node
    }

    pub fn rows(&self) -> &[MenuRow] {
        &self.rows
    }

    /// Whether the menu has nothing to select.
    pub fn is_empty(&self) -> bool {
        !self.rows.iter().any(|r| r.action.is_some())
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_action(&self) -> Option<MenuAction> {
        self.rows.get(self.selected).and_then(|r| r.action)
    }

    /// Number of Down presses from the initial selection to the entry
    /// `value`.
    pub fn position_of(&self, value: &str) -> Option<usize> {
        self.rows
            .iter()
            .filter(|r| r.action.is_some())
            .position(|r| r.value == value)
    }

    pub fn select_next(&mut self) {
        if let Some(next) = (self.selected + 1..self.rows.len()).find(|&i| self.rows[i].action.is_some())
        {
            self.selected = next;
        }
    }

    pub fn select_previous(&mut self) {
        if let Some(previous) = (0..self.selected).rev().find(|&i| self.rows[i].action.is_some()) {
            self.selected = previous;
        }
    }
}

/// Draws the menu next to the active row, clamped to `area`.
pub fn render_menu_popup(
    f: &mut Frame,
    area: Rect,
    anchor_row: u16,
    menu: &MenuPopup,
    colors: &Palette,
) {
    let label_width = menu
        .rows()
        .iter()
        .map(|r| r.depth * 2 + r.label.chars().count())
        .max()
        .unwrap_or(0) as u16;
    let separators = menu.rows().iter().filter(|r| r.separator_before).count() as u16;
    let width = (label_width + 4).min(area.width);
    let height = (menu.rows().len() as u16 + separators + 2).min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = (area.y + anchor_row + 1).min(area.y + area.height.saturating_sub(height));
    let popup = Rect::new(x, y, width, height);

    let mut lines = Vec::new();
    for (index, row) in menu.rows().iter().enumerate() {
        if row.separator_before {
            lines.push(Line::from(Span::styled(
                "─".repeat(width.saturating_sub(2) as usize),
                Style::default().fg(colors.guide),
            )));
        }
        let text = format!("{}{}", "  ".repeat(row.depth), row.label);
        let style = if index == menu.selected() {
            Style::default()
                .fg(colors.background)
                .bg(colors.cursor)
                .add_modifier(Modifier::BOLD)
        } else if row.action.is_none() {
            Style::default().fg(colors.preview)
        } else {
            Style::default().fg(colors.foreground)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Actions ")
        .style(Style::default().bg(colors.menu_bg).fg(colors.foreground));
    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::accessor::menu::move_entries;

    #[test]
    fn test_selection_skips_headings() {
        let items = vec![MenuItem {
            value: "move",
            label: "Move",
            action: None,
            children: move_entries(1, 3),
            before_separator: false,
            after_separator: false,
        }];
        let mut menu = MenuPopup::new(NodeId::from("n"), &items);
        assert_eq!(menu.rows().len(), 3);
        assert_eq!(menu.selected_action(), Some(MenuAction::MoveUp));

        menu.select_next();
        assert_eq!(menu.selected_action(), Some(MenuAction::MoveDown));
        menu.select_next();
        assert_eq!(menu.selected_action(), Some(MenuAction::MoveDown));
        menu.select_previous();
        menu.select_previous();
        assert_eq!(menu.selected_action(), Some(MenuAction::MoveUp));
    }

    #[test]
    fn test_empty_menu() {
        let menu = MenuPopup::new(NodeId::from("n"), &[]);
        assert!(menu.is_empty());
        assert_eq!(menu.selected_action(), None);
    }
}
