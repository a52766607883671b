use std::io;
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use weektasks::cli::{run_command, Cli, Command};
use weektasks::logger::init_logging;
use weektasks::settings::Settings;
use weektasks::storage::{FileStore, KeyValueStore, MemoryStore, TaskStore};
use weektasks::task_board::TaskBoard;
use weektasks::ui::{run_app, setup_or_restore, App};
use weektasks::Result;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "exiting with error");
            eprintln!("weektasks: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir.clone() {
        settings.data_dir = dir;
    }
    if let Some(level) = cli.log_level.clone() {
        settings.log_level = level;
    }
    let _guard = init_logging(&settings)?;
    info!(data_dir = %settings.data_dir.display(), ephemeral = cli.ephemeral, "starting");

    let command = cli.command.unwrap_or(Command::Tui);
    if cli.ephemeral {
        dispatch(MemoryStore::new(), command)
    } else {
        dispatch(FileStore::new(&settings.data_dir), command)
    }
}

fn dispatch<S: KeyValueStore>(backend: S, command: Command) -> Result<()> {
    let mut board = TaskBoard::new(TaskStore::new(backend));
    match command {
        Command::Tui => run_tui(board),
        other => run_command(&mut board, other, Local::now().date_naive(), &mut io::stdout()),
    }
}

fn run_tui<S: KeyValueStore>(board: TaskBoard<S>) -> Result<()> {
    let mut app = App::new(board);
    app.reload();

    // Terminal setup
    enable_raw_mode()?;
    let mut terminal = setup_or_restore(
        || {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
            Terminal::new(CrosstermBackend::new(stdout))
        },
        || {
            execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture).ok();
            disable_raw_mode()
        },
    )?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
