//! Status line widget.
//!
//! Shows the navigation mode, the file name, a `[+]` marker for unsaved
//! edits, the path of the active node and its position among the visible
//! rows:
//!
//! `TREE_NAV | rows.json [+] tags[2]                    5/9`

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::editor::mode::NavMode;
use crate::ui::colors::Palette;

/// Everything the status line displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo<'a> {
    pub mode: NavMode,
    pub filename: Option<&'a str>,
    pub dirty: bool,
    pub path: String,
    /// 1-based row of the active node and the number of visible rows.
    pub position: Option<(usize, usize)>,
}

pub fn render_status_line(f: &mut Frame, area: Rect, info: &StatusInfo, colors: &Palette) {
    let mode_and_file = format!("{} | {}", info.mode, info.filename.unwrap_or("[No Name]"));
    let dirty_indicator = if info.dirty { " [+]" } else { "" };
    let path_display = if info.path.is_empty() {
        String::new()
    } else {
        format!(" {}", info.path)
    };
    let position = info
        .position
        .map(|(row, total)| format!("{}/{}", row, total))
        .unwrap_or_default();

    let total_width = area.width as usize;
    let left_len = mode_and_file.chars().count()
        + dirty_indicator.len()
        + path_display.chars().count();
    let padding = if left_len + position.len() + 1 < total_width {
        total_width - left_len - position.len()
    } else {
        1
    };

    let default_style = Style::default()
        .fg(colors.status_line_fg)
        .bg(colors.status_line_bg);
    let path_style = Style::default().fg(colors.name).bg(colors.status_line_bg);

    let mut spans = vec![Span::styled(mode_and_file, default_style)];
    if !dirty_indicator.is_empty() {
        spans.push(Span::styled(dirty_indicator, default_style));
    }
    if !path_display.is_empty() {
        spans.push(Span::styled(path_display, path_style));
    }
    spans.push(Span::styled(" ".repeat(padding), default_style));
    spans.push(Span::styled(position, default_style));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
