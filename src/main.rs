use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use screener::app::{App, InputMode};
use screener::config::{self, Config};
use screener::core::Action;
use screener::infrastructure::gateway::{Gateway, ReqwestTransport};
use screener::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent};
use screener::store::PageMove;
use screener::ui;

#[derive(Debug, Parser)]
#[command(
    name = "screener",
    version,
    about = "Screener: blockchain account statements in the terminal"
)]
struct Args {
    /// Analysis backend base URL (e.g. http://localhost:8085/api)
    #[arg(long)]
    backend: Option<String>,

    /// Rows per table page
    #[arg(long)]
    page_size: Option<usize>,

    /// Directory for exported statements
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Network of the initial query (ethereum, polygon, ...)
    #[arg(long, requires_all = ["address", "from", "to"])]
    chain: Option<String>,

    /// Address of the initial query
    #[arg(long, requires = "chain")]
    address: Option<String>,

    /// Start date of the initial query (YYYY-MM-DD)
    #[arg(long, requires = "chain")]
    from: Option<String>,

    /// End date of the initial query (YYYY-MM-DD)
    #[arg(long, requires = "chain")]
    to: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();
    let config = config_from_args(&args, config::load());
    info!(backend = %config.backend_url, "starting");

    let transport = ReqwestTransport::new(config.request_timeout())?;
    let gateway = Gateway::new(Arc::new(transport), config.backend_url.clone())
        .with_cache_ttl(config.cache_ttl());
    let runtime = RuntimeBridge::new(Arc::new(gateway))?;

    let mut app = App::new(&config);
    let action = match (&args.chain, &args.address, &args.from, &args.to) {
        (Some(chain), Some(address), Some(from), Some(to)) => {
            app.request_analysis(chain, address, from, to)
        }
        _ => app.request_health(),
    };
    app.apply_action(action);

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

fn config_from_args(args: &Args, mut config: Config) -> Config {
    if let Some(backend) = args
        .backend
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        config.backend_url = backend.to_string();
    }
    if let Some(page_size) = args.page_size {
        config.page_size = page_size.max(1);
    }
    if let Some(dir) = args.export_dir.clone() {
        config.export_dir = Some(dir);
    }
    config
}

/// Log to a file; the terminal belongs to the TUI
fn init_logging() {
    let Some(path) = config::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| ui::draw(f, &mut app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::AnalysisReady { generation, result } => {
                app.apply_analysis(generation, result)
            }
            RuntimeEvent::AnalysisFailed { generation, error } => {
                app.apply_gateway_error(generation, error)
            }
            RuntimeEvent::ExportReady { file } => app.apply_export_result(Ok(file)),
            RuntimeEvent::ExportFailed { error } => app.apply_export_result(Err(error)),
            RuntimeEvent::HealthReady { status } => app.apply_health(Ok(status)),
            RuntimeEvent::HealthFailed { error } => app.apply_health(Err(error)),
            RuntimeEvent::Unexpected {
                task,
                generation,
                message,
            } => app.apply_unexpected(task, generation, &message),
            RuntimeEvent::Error { message } => {
                warn!(error = %message, "runtime error");
                app.apply_action(Action::error(message));
            }
        }
    }

    for cmd in app.take_requests() {
        if let Err(err) = runtime.send(cmd) {
            app.apply_action(Action::error(format!("{err:#}")));
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Char(':') => app.enter_command(),
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('n') | KeyCode::Right => app.change_page(PageMove::Next),
        KeyCode::Char('p') | KeyCode::Left => app.change_page(PageMove::Prev),
        KeyCode::Char('s') => app.cycle_sort_field(),
        KeyCode::Char('d') => app.toggle_sort_direction(),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection_down(),
        KeyCode::Char('x') | KeyCode::Delete => {
            let action = app.delete_selected();
            app.apply_action(action);
        }
        KeyCode::Char('u') => {
            let action = app.reset_overlay();
            app.apply_action(action);
        }
        KeyCode::Char('r') => app.apply_command_text("refresh"),
        KeyCode::Char('e') => app.apply_command_text("export csv"),
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_command(),
        KeyCode::Enter => app.apply_command(),
        KeyCode::Up => {
            if let Some(last) = app.command.last.clone() {
                app.command.input = last;
            }
        }
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.command.input.push(ch);
        }
        _ => {}
    }
}
