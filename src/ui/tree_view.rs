//! Tree view rendering.
//!
//! Each visible row is drawn as guide connectors, an expand indicator, the
//! node name and its value or collapsed summary. The active row is
//! highlighted and rows with a validation error get a trailing marker.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::editor::accessor::layout::RendererType;
use crate::ui::colors::Palette;
use crate::ui::display::{guide_prefix, TreeRow};

/// Rendering options that come from the config.
#[derive(Debug, Clone, Copy)]
pub struct TreeViewOptions {
    pub indent_size: usize,
    pub show_guides: bool,
}

fn value_color(row: &TreeRow, colors: &Palette) -> ratatui::style::Color {
    if row.expandable {
        return colors.preview;
    }
    match row.renderer {
        RendererType::String => colors.string,
        RendererType::Number => colors.number,
        RendererType::Boolean => colors.boolean,
        RendererType::ForeignKey | RendererType::Ref => colors.link,
        RendererType::Container => colors.foreground,
    }
}

fn row_line<'a>(row: &'a TreeRow, options: TreeViewOptions, colors: &Palette) -> Line<'a> {
    let mut spans = vec![Span::styled(
        guide_prefix(row, options.indent_size, options.show_guides),
        Style::default().fg(colors.guide),
    )];

    if row.expandable {
        spans.push(Span::raw(if row.expanded { "▼ " } else { "▶ " }));
    } else if row.active {
        spans.push(Span::raw("▶ "));
    } else {
        spans.push(Span::raw("  "));
    }

    let highlight = Style::default()
        .fg(ratatui::style::Color::White)
        .bg(colors.cursor)
        .add_modifier(Modifier::BOLD);

    let name_style = if row.active {
        highlight
    } else {
        Style::default().fg(colors.name)
    };
    spans.push(Span::styled(row.name.as_str(), name_style));

    if let Some(value) = &row.value {
        let value_style = if row.active {
            highlight
        } else {
            Style::default().fg(value_color(row, colors))
        };
        spans.push(Span::styled(": ", name_style));
        spans.push(Span::styled(value.as_str(), value_style));
    }

    if let Some(error) = &row.error {
        spans.push(Span::styled(
            format!("  ! {}", error),
            Style::default().fg(colors.error),
        ));
    }

    Line::from(spans)
}

pub fn render_tree_view(
    f: &mut Frame,
    area: Rect,
    rows: &[TreeRow],
    scroll_offset: usize,
    options: TreeViewOptions,
    colors: &Palette,
) {
    let lines: Vec<Line> = rows
        .iter()
        .skip(scroll_offset)
        .take(area.height as usize)
        .map(|row| row_line(row, options, colors))
        .collect();

    let paragraph = Paragraph::new(lines).style(Style::default().bg(colors.background));
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::value_tree::ValueTree;
    use crate::editor::tree::EditorTree;
    use crate::ui::display::build_rows;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use serde_json::json;

    fn screen_lines(terminal: &Terminal<TestBackend>, width: usize) -> Vec<String> {
        let content = terminal.backend().buffer().content();
        content
            .chunks(width)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect()
    }

    #[test]
    fn test_renders_names_and_values() {
        let tree = EditorTree::with_defaults(ValueTree::from_json(&json!({
            "name": "Ada",
            "tags": ["x"]
        })));
        let rows = build_rows(&tree);
        let mut terminal = Terminal::new(TestBackend::new(40, 5)).unwrap();
        let options = TreeViewOptions {
            indent_size: 2,
            show_guides: true,
        };
        terminal
            .draw(|f| {
                let area = f.area();
                render_tree_view(f, area, &rows, 0, options, &Palette::default());
            })
            .unwrap();

        let lines = screen_lines(&terminal, 40);
        assert!(lines[1].contains("├─  name: \"Ada\""), "{:?}", lines);
        assert!(lines[2].contains("└─▼ tags"), "{:?}", lines);
        assert!(lines[3].starts_with("  └─"), "{:?}", lines);
        assert!(lines[3].contains("[0]: \"x\""), "{:?}", lines);
    }

    #[test]
    fn test_scroll_offset_skips_rows() {
        let tree = EditorTree::with_defaults(ValueTree::from_json(&json!({"a": 1, "b": 2})));
        let rows = build_rows(&tree);
        let mut terminal = Terminal::new(TestBackend::new(20, 2)).unwrap();
        let options = TreeViewOptions {
            indent_size: 2,
            show_guides: false,
        };
        terminal
            .draw(|f| {
                let area = f.area();
                render_tree_view(f, area, &rows, 1, options, &Palette::default());
            })
            .unwrap();

        let lines = screen_lines(&terminal, 20);
        assert!(lines[0].contains("a: 1"));
        assert!(lines[1].contains("b: 2"));
    }
}
