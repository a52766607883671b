use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::error::{Result, TaskError};
use crate::grouping::plain_lines;
use crate::storage::KeyValueStore;
use crate::task::NewTask;
use crate::task_board::TaskBoard;

#[derive(Debug, Parser)]
#[command(name = "weektasks", version, about = "A weekly task list for the terminal")]
pub struct Cli {
    /// Settings file (defaults to ~/.config/weektasks/config.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the stored task list.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Log filter, e.g. `debug`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Keep tasks in memory only; nothing is written to disk.
    #[arg(long)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive board (the default).
    Tui,
    /// Add a task.
    Add {
        #[arg(long)]
        day: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        important: bool,
    },
    /// Print tasks grouped by day.
    List,
    /// Mark a task done.
    Done { id: u64 },
    /// Mark a task not done.
    Undone { id: u64 },
    /// Delete a task.
    Remove { id: u64 },
    /// Delete every task.
    Clear,
}

/// Runs one non-interactive command against `board`, writing any output to
/// `out`.
pub fn run_command<S: KeyValueStore, W: Write>(
    board: &mut TaskBoard<S>,
    command: Command,
    today: NaiveDate,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Tui => Err(TaskError::Terminal(
            "interactive mode is not a batch command".to_string(),
        )),
        Command::Add {
            day,
            name,
            description,
            important,
        } => {
            let task = board.add_task(NewTask {
                day,
                task_name: name,
                description,
                is_important: important,
            })?;
            writeln!(out, "added #{} {}", task.id, task.task_name)?;
            Ok(())
        }
        Command::List => {
            board.reload()?;
            for line in plain_lines(&board.groups(today)) {
                writeln!(out, "{line}")?;
            }
            Ok(())
        }
        Command::Done { id } => set_done(board, id, true, out),
        Command::Undone { id } => set_done(board, id, false, out),
        Command::Remove { id } => {
            if !board.remove(id)? {
                return Err(TaskError::NotFound(id));
            }
            writeln!(out, "removed #{id}")?;
            Ok(())
        }
        Command::Clear => {
            board.clear()?;
            writeln!(out, "cleared all tasks")?;
            Ok(())
        }
    }
}

fn set_done<S: KeyValueStore, W: Write>(
    board: &mut TaskBoard<S>,
    id: u64,
    done: bool,
    out: &mut W,
) -> Result<()> {
    if !board.set_done(id, done)? {
        return Err(TaskError::NotFound(id));
    }
    let state = if done { "done" } else { "open" };
    writeln!(out, "#{id} is {state}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, TaskStore};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn run(board: &mut TaskBoard<MemoryStore>, command: Command) -> Result<String> {
        let mut out = Vec::new();
        run_command(board, command, today(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn parses_add_with_flags() {
        let cli = Cli::try_parse_from([
            "weektasks",
            "--data-dir",
            "/tmp/x",
            "add",
            "--day",
            "Friday",
            "--name",
            "Report",
            "--important",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(
            cli.command,
            Some(Command::Add {
                day: "Friday".into(),
                name: "Report".into(),
                description: String::new(),
                important: true,
            })
        );
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["weektasks"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn add_list_done_remove_flow() {
        let mut board = TaskBoard::new(TaskStore::new(MemoryStore::new()));
        let added = run(
            &mut board,
            Command::Add {
                day: "monday".into(),
                name: "Call bank".into(),
                description: "ask about fees".into(),
                important: true,
            },
        )
        .unwrap();
        assert!(added.starts_with("added #"));
        let id = board.tasks()[0].id;

        run(&mut board, Command::Done { id }).unwrap();
        let listing = run(&mut board, Command::List).unwrap();
        assert_eq!(
            listing,
            format!("Monday (Oct 16):\n  [x] ! Call bank (#{id})\n        ask about fees\n")
        );

        assert!(matches!(
            run(&mut board, Command::Remove { id: id + 1 }),
            Err(TaskError::NotFound(_))
        ));
        run(&mut board, Command::Remove { id }).unwrap();
        assert_eq!(run(&mut board, Command::List).unwrap(), "");
    }

    #[test]
    fn undone_on_missing_id_fails() {
        let mut board = TaskBoard::new(TaskStore::new(MemoryStore::new()));
        assert!(matches!(
            run(&mut board, Command::Undone { id: 9 }),
            Err(TaskError::NotFound(9))
        ));
    }
}
