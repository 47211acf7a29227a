mod app;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use scrollee_config::Config;
use scrollee_engine::Size;
use std::{
    io::{Stdout, stdout},
    path::PathBuf,
    process,
    time::{Duration, Instant},
};

const DEFAULT_SIDEBAR_ROWS: f64 = 14.0;
const TRACE_VIEWPORT: Size = Size {
    width: 100.0,
    height: 30.0,
};
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "scrollee-cli")]
#[command(about = "Scroll a simulated page and watch the sidebar stick")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/scrollee/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Height of the sidebar in rows
    #[arg(long, value_name = "ROWS", default_value_t = DEFAULT_SIDEBAR_ROWS, value_parser = parse_sidebar_rows)]
    sidebar_rows: f64,

    /// Print the sidebar state for each scroll offset instead of starting the UI
    #[arg(long, value_name = "OFFSET", num_args = 1.., allow_negative_numbers = true)]
    trace: Option<Vec<f64>>,
}

fn parse_sidebar_rows(value: &str) -> Result<f64, String> {
    let rows = value
        .parse::<f64>()
        .map_err(|e| format!("invalid sidebar rows '{value}': {e}"))?;
    app::check_sidebar_rows(rows).map_err(|e| e.to_string())
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let (config, source) = match path {
        Some(path) => (
            Config::load_from_path(path)?
                .with_context(|| format!("config file '{}' not found", path.display()))?,
            path.clone(),
        ),
        None => (Config::load()?.unwrap_or_default(), Config::config_path()),
    };
    log::info!("Using configuration from {}", source.display());
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .map(|path| Config::expand_path(&path).unwrap_or(path));

    let config = match load_config(config_path.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e:#}");
            process::exit(1);
        }
    };

    if let Some(offsets) = cli.trace {
        return print_trace(&config, cli.sidebar_rows, &offsets);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = page_viewport(&terminal)
        .and_then(|viewport| App::new(viewport, cli.sidebar_rows, &config))
        .and_then(|mut app| run_app(&mut terminal, &mut app));

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn print_trace(config: &Config, sidebar_rows: f64, offsets: &[f64]) -> Result<()> {
    let mut app = App::new(TRACE_VIEWPORT, sidebar_rows, config)?;
    if !app.sticky().is_attached() {
        println!("sidebar has no room to move inside the article; nothing to trace");
        return Ok(());
    }

    println!(
        "{:>8}  {:<8}  {:<8}  {:<12}  style",
        "offset", "scroll", "sticky", "positioning"
    );
    for row in app.trace(offsets) {
        println!(
            "{:>8}  {:<8}  {:<8}  {:<12}  {}",
            row.offset,
            row.direction.to_string(),
            row.status.to_string(),
            row.positioning.to_string(),
            row.css.unwrap_or_default()
        );
    }
    Ok(())
}

type Term = Terminal<CrosstermBackend<Stdout>>;

fn page_viewport(terminal: &Term) -> Result<Size> {
    let area = terminal.size()?;
    Ok(Size::new(
        area.width as f64,
        area.height.saturating_sub(ui::STATUS_ROWS) as f64,
    ))
}

fn run_app(terminal: &mut Term, app: &mut App) -> Result<()> {
    let started = Instant::now();

    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        let page_rows = app.sticky().geometry().window_height.max(1.0);
        if event::poll(FRAME)? {
            let now = started.elapsed();
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Down | KeyCode::Char('j') => app.scroll_by(1.0, now),
                    KeyCode::Up | KeyCode::Char('k') => app.scroll_by(-1.0, now),
                    KeyCode::PageDown | KeyCode::Char(' ') => app.scroll_by(page_rows, now),
                    KeyCode::PageUp => app.scroll_by(-page_rows, now),
                    KeyCode::Char('g') | KeyCode::Home => app.scroll_by(f64::MIN, now),
                    KeyCode::Char('G') | KeyCode::End => app.scroll_by(f64::MAX, now),
                    KeyCode::Char('a') => {
                        let attached = app.toggle_attached();
                        log::info!("sidebar {}", if attached { "attached" } else { "detached" });
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollDown => app.scroll_by(3.0, now),
                    MouseEventKind::ScrollUp => app.scroll_by(-3.0, now),
                    _ => {}
                },
                Event::Resize(width, height) => app.resize(Size::new(
                    width as f64,
                    height.saturating_sub(ui::STATUS_ROWS) as f64,
                )),
                _ => {}
            }
        }

        app.tick(started.elapsed());
    }
}
