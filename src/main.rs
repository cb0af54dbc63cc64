use anyhow::{Context, Result};
use clap::Parser;
use ratatui::{backend::TermionBackend, Terminal};
use serde_json::json;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;
use termion::input::MouseTerminal;
use termion::raw::IntoRawMode;
use termion::screen::IntoAlternateScreen;

use treeaccess::app::App;
use treeaccess::config::Config;
use treeaccess::document::schema_tree::SchemaTree;
use treeaccess::document::value_tree::ValueTree;
use treeaccess::editor::clipboard::{Clipboard, MemoryClipboard, SystemClipboard};
use treeaccess::editor::tree::EditorTree;
use treeaccess::editor::tree_state::TreeState;
use treeaccess::file::loader::{
    load_document_from_stdin, load_rows, load_schema, schema_from_value,
};
use treeaccess::input::InputHandler;
use treeaccess::ui::display::{render_text, TreeDisplay};
use treeaccess::ui::UI;

/// treeaccess - browse and edit row documents and table schemas as trees
#[derive(Parser)]
#[command(name = "treeaccess")]
#[command(version)]
#[command(about = "Browse and edit row documents and table schemas as trees", long_about = None)]
struct Cli {
    /// JSON, JSON Lines or YAML file (omit to read stdin if piped, or open a sample)
    file: Option<String>,

    /// Treat the document as a table schema
    #[arg(short, long)]
    schema: bool,

    /// Write debug logs to this file
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// Print the tree as text and exit
    #[arg(long)]
    dump: bool,
}

/// Restores the terminal before the default panic output so the message is
/// readable.
fn setup_panic_hook() {
    use std::panic;

    let default_panic = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = write!(io::stderr(), "{}", termion::screen::ToMainScreen);
        let _ = write!(io::stderr(), "{}", termion::cursor::Show);
        let _ = io::stderr().flush();
        default_panic(panic_info);
    }));
}

fn init_logging(path: &PathBuf) -> Result<()> {
    use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};

    let log_file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    WriteLogger::init(LevelFilter::Debug, LogConfig::default(), log_file)
        .context("Failed to initialize logging")?;
    Ok(())
}

fn sample_rows() -> ValueTree {
    ValueTree::from_json(&json!({
        "customer": {"name": "Alice", "email": "alice@example.com"},
        "items": [
            {"sku": "A-1", "quantity": 2, "price": 9.5},
            {"sku": "B-7", "quantity": 1, "price": 20}
        ],
        "paid": false,
        "note": "leave at the door"
    }))
}

fn sample_schema() -> Result<SchemaTree> {
    schema_from_value(
        "orders",
        &json!({
            "type": "object",
            "properties": {
                "customer": {"foreignKey": "customers", "type": "string"},
                "quantity": {"type": "number"},
                "price": {"type": "number"},
                "total": {"type": "number", "x-formula": "quantity * price"},
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        }),
    )
}

fn main() -> Result<()> {
    setup_panic_hook();

    let cli = Cli::parse();
    if let Some(path) = &cli.log {
        init_logging(path)?;
    }
    let config = Config::load();
    log::info!("Starting treeaccess with {:?}", config);

    // Stdin may carry the document, so read it before taking over the terminal.
    let stdin_piped = cli.file.is_none() && !io::stdin().is_terminal();
    if cli.schema {
        let schema = match (&cli.file, stdin_piped) {
            (Some(path), _) => load_schema(path)?,
            (None, true) => schema_from_value("stdin", &load_document_from_stdin()?)?,
            (None, false) => sample_schema()?,
        };
        run(schema, cli, config, stdin_piped)
    } else {
        let rows = match (&cli.file, stdin_piped) {
            (Some(path), _) => load_rows(path)?,
            (None, true) => ValueTree::from_json(&load_document_from_stdin()?),
            (None, false) => sample_rows(),
        };
        run(rows, cli, config, stdin_piped)
    }
}

fn run<M: TreeDisplay>(model: M, cli: Cli, config: Config, stdin_piped: bool) -> Result<()> {
    let clipboard: Rc<dyn Clipboard> = if config.sync_clipboard {
        Rc::new(SystemClipboard)
    } else {
        Rc::new(MemoryClipboard::new())
    };
    let tree = EditorTree::new(
        model,
        Rc::new(TreeState::new()),
        clipboard,
        config.tree_settings(),
    );
    let mut app = App::new(tree, config);
    if let Some(name) = &cli.file {
        app.set_filename(name.clone());
    }

    if cli.dump {
        let text = render_text(&app.rows(), app.config().indent_size, app.config().show_guides);
        print!("{}", text);
        return Ok(());
    }

    let mut input_handler = if stdin_piped {
        InputHandler::new_with_tty()
            .context("Failed to open /dev/tty for keyboard input when stdin was piped")?
    } else {
        InputHandler::new()
    };

    let stdout = io::stdout()
        .into_raw_mode()
        .context("Failed to enable raw mode")?;
    let stdout = MouseTerminal::from(stdout);
    let stdout = stdout
        .into_alternate_screen()
        .context("Failed to enter alternate screen")?;
    let backend = TermionBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let ui = UI::new();
    let result = run_event_loop(&mut terminal, &ui, &mut input_handler, &mut app);

    write!(terminal.backend_mut(), "{}", termion::cursor::Show)?;
    terminal.backend_mut().flush()?;
    result
}

fn run_event_loop<B: ratatui::backend::Backend, M: TreeDisplay>(
    terminal: &mut Terminal<B>,
    ui: &UI,
    input_handler: &mut InputHandler,
    app: &mut App<M>,
) -> Result<()> {
    let mut last_tick = Instant::now();
    loop {
        ui.render(terminal, app)?;

        let Some(event) = input_handler.next_event()? else {
            break;
        };
        let now = Instant::now();
        app.tick(now.duration_since(last_tick));
        last_tick = now;

        app.handle_event(&event);
        if app.should_quit() {
            break;
        }
    }
    log::info!("Exiting");
    Ok(())
}
