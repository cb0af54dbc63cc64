//! Colors used by the terminal UI.

use ratatui::style::Color;

/// The UI palette. ANSI colors are used so the terminal's own scheme
/// decides the exact shades.
///
/// ```
/// use ratatui::style::Color;
/// use treeaccess::ui::colors::Palette;
///
/// let palette = Palette::default();
/// assert_eq!(palette.background, Color::Reset);
/// ```
#[derive(Debug, Clone)]
pub struct Palette {
    // Row content
    pub name: Color,
    pub string: Color,
    pub number: Color,
    pub boolean: Color,
    pub null: Color,
    pub link: Color,
    pub preview: Color,
    pub guide: Color,

    // Chrome
    pub background: Color,
    pub foreground: Color,
    pub cursor: Color,
    pub status_line_bg: Color,
    pub status_line_fg: Color,
    pub menu_bg: Color,

    // Messages
    pub error: Color,
    pub warning: Color,
    pub info: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            name: Color::LightBlue,
            string: Color::Green,
            number: Color::Magenta,
            boolean: Color::Yellow,
            null: Color::DarkGray,
            link: Color::Cyan,
            preview: Color::DarkGray,
            guide: Color::DarkGray,

            background: Color::Reset,
            foreground: Color::Gray,
            cursor: Color::LightBlue,
            status_line_bg: Color::White,
            status_line_fg: Color::Black,
            menu_bg: Color::Black,

            error: Color::Red,
            warning: Color::Yellow,
            info: Color::LightBlue,
        }
    }
}
