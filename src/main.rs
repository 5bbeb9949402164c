//! Interactive terminal host for the catalogue browser.
//!
//! Serves one source of a JSON fixture catalogue and drives the view from stdin:
//!
//! ```text
//! ┌──────────────┐  Event (type/search/open)   ┌──────────────────────┐
//! │ stdin thread │ ───────────────────────────▶ │ CatalogueHost::pump  │ ◀── worker thread
//! │              │ ── Control (j/k/q) ────────▶ │ (control thread)     │
//! └──────────────┘                             └──────────────────────┘
//! ```
//!
//! # Commands
//!
//! - `type <text>`: change the search text (debounced)
//! - `search <text>`: submit a search immediately
//! - `j` / `k`: scroll one screen down / up
//! - `open <n>`: open the entry at list position `n`
//! - `q`: save the view and quit
//!
//! The view state is saved on exit; the next launch for the same source redraws it
//! without fetching.

#![allow(clippy::multiple_crate_versions)]

use catalogue_browser::domain::SourceId;
use catalogue_browser::observability::init_tracing;
use catalogue_browser::runtime::{
    CatalogueHost, Collaborators, ImageLoader, Navigator, SearchWidget, ViewRenderer,
};
use catalogue_browser::source::FixtureCatalogue;
use catalogue_browser::storage::{JsonStateStore, StateStore};
use catalogue_browser::ui::{render, CatalogueViewModel};
use catalogue_browser::{app::Viewport, initialize, infrastructure, CatalogueError, Config, Event, MangaSummary};
use clap::Parser;
use crossbeam_channel::{Sender, TryRecvError};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

/// Catalogue browser - endless, searchable listing of a manga source
#[derive(Parser, Debug)]
#[command(name = "catalogue-browser")]
#[command(version)]
#[command(about = "Browse a manga source with debounced search and endless scroll", long_about = None)]
struct Cli {
    /// JSON fixture catalogue to browse
    #[arg(long)]
    catalogue: Option<PathBuf>,

    /// Source to open
    #[arg(long)]
    source_id: Option<SourceId>,

    /// Saved view state file
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tracing filter (trace, debug, info, warn, error)
    #[arg(long)]
    trace_level: Option<String>,
}

/// Commands the control loop handles itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    ScrollDown,
    ScrollUp,
    Quit,
}

const TERMINAL_COLS: usize = 80;

struct TerminalView {
    rows: usize,
}

impl ViewRenderer for TerminalView {
    fn rows(&self) -> usize {
        self.rows
    }

    fn render(&mut self, vm: &CatalogueViewModel) {
        let mut stdout = std::io::stdout().lock();
        let _ = write!(stdout, "{}", render(vm, TERMINAL_COLS));
        let _ = stdout.flush();
    }

    fn scroll_to_top(&mut self) {
        tracing::trace!("terminal view scrolled to top");
    }
}

struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn open_detail(&mut self, manga: &MangaSummary, from_network: bool) {
        println!(">> opening \"{}\" (id {}, online: {from_network})", manga.title, manga.id);
    }
}

struct TerminalImages;

impl ImageLoader for TerminalImages {
    fn load_thumbnail(&mut self, position: usize, slot: usize, url: &str, headers: &BTreeMap<String, String>) {
        tracing::debug!(position, slot, url, header_count = headers.len(), "thumbnail requested");
    }
}

struct TerminalSearch;

impl SearchWidget for TerminalSearch {
    fn preset_query(&mut self, query: &str) {
        println!(">> search: {query}");
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config, CatalogueError> {
    let mut config = cli
        .config
        .as_deref()
        .map(Config::load)
        .transpose()?
        .unwrap_or_default();

    if let Some(path) = &cli.catalogue {
        config.catalogue_file = Some(path.to_string_lossy().into_owned());
    }
    if let Some(id) = cli.source_id {
        config.source_id = Some(id);
    }
    if let Some(path) = &cli.state_file {
        config.state_file = Some(path.to_string_lossy().into_owned());
    }
    if let Some(level) = &cli.trace_level {
        config.trace_level = Some(level.clone());
    }
    Ok(config)
}

fn parse_command(line: &str) -> Option<Result<Event, Control>> {
    let line = line.trim();
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

    match command {
        "type" => Some(Ok(Event::SearchTextChanged(rest.to_string()))),
        "search" => Some(Ok(Event::SearchSubmitted(rest.to_string()))),
        "open" => rest.trim().parse().ok().map(|n| Ok(Event::ItemSelected(n))),
        "j" => Some(Err(Control::ScrollDown)),
        "k" => Some(Err(Control::ScrollUp)),
        "q" => Some(Err(Control::Quit)),
        _ => None,
    }
}

fn spawn_input(mailbox: Sender<Event>, controls: Sender<Control>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Some(Ok(event)) => {
                        if mailbox.send(event).is_err() {
                            return;
                        }
                    }
                    Some(Err(control)) => {
                        if controls.send(control).is_err() || control == Control::Quit {
                            return;
                        }
                    }
                    None => println!("?? unknown command: {line}"),
                }
            }
            let _ = controls.send(Control::Quit);
        })?;
    Ok(())
}

fn scrolled(host: &CatalogueHost, rows: usize, control: Control) -> Viewport {
    let total = host.controller().visible_items().len();
    let first = host.controller().viewport().first_visible;
    let first = match control {
        Control::ScrollDown => (first + rows).min(total.saturating_sub(1)),
        _ => first.saturating_sub(rows),
    };
    Viewport::new(first, rows.min(total.saturating_sub(first)), total)
}

fn run(cli: Cli) -> Result<(), CatalogueError> {
    let config = load_config(&cli)?;
    init_tracing(&config, &infrastructure::data_dir());

    let span = tracing::debug_span!("catalogue_browser_run");
    let _guard = span.entered();

    let catalogue_path = config
        .catalogue_path()
        .ok_or_else(|| CatalogueError::Config("no catalogue file given (--catalogue)".to_string()))?;
    let catalogue = FixtureCatalogue::load(&catalogue_path, config.page_size)?;
    let mut store = JsonStateStore::new(config.state_path())?;

    let (controller, actions) = initialize(&config, &catalogue, &store)?;
    tracing::debug!(restored = controller.was_restored(), "catalogue view created");

    let collaborators = Collaborators {
        navigator: Box::new(TerminalNavigator),
        images: Box::new(TerminalImages),
        search: Box::new(TerminalSearch),
        renderer: Box::new(TerminalView {
            rows: config.visible_rows,
        }),
    };
    let mut host = CatalogueHost::new(controller, actions, Box::new(catalogue), collaborators)?;

    let (control_tx, controls) = crossbeam_channel::unbounded();
    spawn_input(host.mailbox(), control_tx)?;

    for event in [Event::Activated, Event::SearchWidgetBuilt] {
        host.dispatch(&event)?;
    }

    loop {
        host.pump(Duration::from_millis(50))?;
        match controls.try_recv() {
            Ok(Control::Quit) | Err(TryRecvError::Disconnected) => break,
            Ok(control) => {
                let viewport = scrolled(&host, config.visible_rows, control);
                host.dispatch(&Event::Scrolled(viewport))?;
            }
            Err(TryRecvError::Empty) => {}
        }
    }

    if let Some(state) = host.shutdown()? {
        store.save(&state)?;
        tracing::debug!(path = ?store.path(), "view state saved");
    }
    Ok(())
}
