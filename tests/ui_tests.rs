use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde_json::json;
use termion::event::{Event, Key as TermKey};
use treeaccess::app::App;
use treeaccess::config::Config;
use treeaccess::document::schema_tree::SchemaTree;
use treeaccess::document::value_tree::ValueTree;
use treeaccess::editor::tree::EditorTree;
use treeaccess::ui::display::TreeDisplay;
use treeaccess::ui::UI;

const WIDTH: u16 = 60;

fn screen(terminal: &Terminal<TestBackend>) -> Vec<String> {
    terminal
        .backend()
        .buffer()
        .content()
        .chunks(WIDTH as usize)
        .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
        .collect()
}

fn press(app: &mut App<impl TreeDisplay>, key: TermKey) {
    app.handle_event(&Event::Key(key));
}

#[test]
fn test_status_line_tracks_active_row() {
    let tree = EditorTree::with_defaults(ValueTree::from_json(&json!({"a": 1, "b": [true]})));
    let mut app = App::new(tree, Config::default());
    app.set_filename("rows.json");
    let mut terminal = Terminal::new(TestBackend::new(WIDTH, 8)).unwrap();
    let ui = UI::new();

    press(&mut app, TermKey::Down);
    press(&mut app, TermKey::Down);
    press(&mut app, TermKey::Down);
    press(&mut app, TermKey::Down);
    ui.render(&mut terminal, &app).unwrap();

    let lines = screen(&terminal);
    assert!(lines[6].starts_with("TREE_NAV | rows.json b[0]"), "{:?}", lines);
    assert!(lines[6].trim_end().ends_with("4/4"), "{:?}", lines);
}

#[test]
fn test_menu_popup_is_drawn() {
    let tree = EditorTree::with_defaults(ValueTree::from_json(&json!({"list": [1, 2, 3]})));
    let mut app = App::new(tree, Config::default());
    let mut terminal = Terminal::new(TestBackend::new(WIDTH, 20)).unwrap();

    for _ in 0..4 {
        press(&mut app, TermKey::Down);
    }
    press(&mut app, TermKey::Char('m'));
    UI::new().render(&mut terminal, &app).unwrap();

    let text = screen(&terminal).join("\n");
    assert!(text.contains("Actions"), "{}", text);
    assert!(text.contains("Move"), "{}", text);
    assert!(text.contains("Add after"), "{}", text);
}

#[test]
fn test_formula_prompt_and_error_marker() {
    let schema = SchemaTree::from_json_schema(
        "orders",
        &json!({
            "type": "object",
            "properties": {
                "price": {"type": "number"},
                "total": {"type": "number"}
            }
        }),
    )
    .unwrap();
    let mut app = App::new(EditorTree::with_defaults(schema), Config::default());
    let mut terminal = Terminal::new(TestBackend::new(WIDTH, 6)).unwrap();

    press(&mut app, TermKey::Down);
    press(&mut app, TermKey::Down);
    press(&mut app, TermKey::Down);
    press(&mut app, TermKey::Char('='));
    for ch in "tax".chars() {
        press(&mut app, TermKey::Char(ch));
    }
    UI::new().render(&mut terminal, &app).unwrap();
    let lines = screen(&terminal);
    assert!(lines[5].starts_with("Formula: tax"), "{:?}", lines);

    press(&mut app, TermKey::Char('\n'));
    UI::new().render(&mut terminal, &app).unwrap();
    let lines = screen(&terminal);
    assert!(lines[2].contains("total: number = tax"), "{:?}", lines);
    assert!(lines[2].contains("Unknown field 'tax'"), "{:?}", lines);

    press(&mut app, TermKey::Esc);
    UI::new().render(&mut terminal, &app).unwrap();
    let lines = screen(&terminal);
    assert!(app.prompt().is_none());
    assert!(lines[2].contains("total: number"), "{:?}", lines);
    assert!(!lines[2].contains("tax"), "{:?}", lines);
}
