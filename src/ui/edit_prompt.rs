use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::colors::Palette;

/// Renders the inline editor line with a block cursor. `cursor_pos` counts
/// characters.
pub fn render_edit_prompt(
    f: &mut Frame,
    area: Rect,
    prompt: &str,
    buffer: &str,
    cursor_pos: usize,
    colors: &Palette,
) {
    let chars: Vec<char> = buffer.chars().collect();
    let cursor_pos = cursor_pos.min(chars.len());
    let before: String = chars.iter().take(cursor_pos).collect();
    let after: String = chars.iter().skip(cursor_pos + 1).collect();
    let at_cursor = chars.get(cursor_pos).copied().unwrap_or(' ');

    let text_style = Style::default()
        .fg(colors.foreground)
        .bg(colors.background)
        .add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled(prompt.to_string(), text_style),
        Span::styled(before, text_style),
        Span::styled(
            at_cursor.to_string(),
            Style::default()
                .fg(colors.background)
                .bg(colors.cursor)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if !after.is_empty() {
        spans.push(Span::styled(after, text_style));
    }

    let line = Paragraph::new(Line::from(spans)).style(Style::default().bg(colors.background));
    f.render_widget(line, area);
}
