use std::io;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use tracing::{debug, warn};

use crate::error::Result;
use crate::form::{Field, TaskForm};
use crate::grouping::DayGroup;
use crate::storage::KeyValueStore;
use crate::task::Task;
use crate::task_board::TaskBoard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    List,
    Form,
    ConfirmClear,
}

pub struct App<S> {
    pub board: TaskBoard<S>,
    pub form: TaskForm,
    pub mode: Mode,
    pub status: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(board: TaskBoard<S>) -> Self {
        Self {
            board,
            form: TaskForm::new(),
            mode: Mode::List,
            status: None,
        }
    }

    pub fn reload(&mut self) {
        match self.board.reload() {
            Ok(()) => self.status = None,
            Err(err) => {
                warn!(%err, "showing empty list");
                self.status = Some(format!("{err}; showing an empty list"));
            }
        }
    }

    /// Applies one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        match self.mode {
            Mode::List => return self.handle_list_key(key.code),
            Mode::Form => self.handle_form_key(key.code),
            Mode::ConfirmClear => {
                if key.code == KeyCode::Char('y') {
                    self.status = Some(match self.board.clear() {
                        Ok(()) => "todo list cleared".to_string(),
                        Err(err) => err.to_string(),
                    });
                } else {
                    self.status = Some("clear cancelled".to_string());
                }
                self.mode = Mode::List;
            }
        }
        false
    }

    fn handle_list_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('a') => {
                self.mode = Mode::Form;
                self.status = None;
            }
            KeyCode::Up | KeyCode::Char('k') => self.board.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.board.move_selection(1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(id) = self.board.selected().map(|t| t.id) {
                    self.status = match self.board.toggle_done(id) {
                        Ok(Some(_)) => None,
                        Ok(None) => Some("task no longer exists".to_string()),
                        Err(err) => Some(err.to_string()),
                    };
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.board.selected().map(|t| t.id) {
                    self.status = match self.board.remove(id) {
                        Ok(_) => Some("task removed".to_string()),
                        Err(err) => Some(err.to_string()),
                    };
                }
            }
            KeyCode::Char('C') => {
                self.mode = Mode::ConfirmClear;
                self.status = Some("clear all tasks? (y/n)".to_string());
            }
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.mode = Mode::List,
            KeyCode::Tab => self.form.focus_next(),
            KeyCode::BackTab => self.form.focus_prev(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char(c) => self.form.input_char(c),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let fields = match self.form.submit() {
            Ok(fields) => fields,
            Err(err) => {
                self.status = Some(err.to_string());
                return;
            }
        };
        match self.board.add_task(fields) {
            Ok(task) => {
                debug!(id = task.id, "task added from form");
                self.status = Some("task added".to_string());
                self.form.clear();
                self.mode = Mode::List;
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }
}

/// Runs the remaining terminal setup; if it fails, `restore` undoes what
/// was already switched on before the error is returned.
pub fn setup_or_restore<T>(
    setup: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce() -> io::Result<()>,
) -> Result<T> {
    match setup() {
        Ok(value) => Ok(value),
        Err(err) => {
            if let Err(restore_err) = restore() {
                warn!(%restore_err, "failed to restore terminal");
            }
            Err(err.into())
        }
    }
}

pub fn run_app<B: Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> Result<()> {
    loop {
        let today = Local::now().date_naive();
        terminal.draw(|f| draw(f, app, today))?;

        if let Event::Key(key) = event::read()? {
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>, today: NaiveDate) {
    let form_height = if app.mode == Mode::Form { 6 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Min(3),
            Constraint::Length(form_height),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_tasks(f, app, today, chunks[0]);
    if app.mode == Mode::Form {
        draw_form(f, &app.form, chunks[1]);
    }

    let footer = match &app.status {
        Some(status) => Span::styled(status.clone(), Style::default().fg(Color::Yellow)),
        None => Span::styled(
            help_text(app.mode),
            Style::default().fg(Color::DarkGray),
        ),
    };
    f.render_widget(Paragraph::new(Line::from(footer)), chunks[2]);
}

fn help_text(mode: Mode) -> &'static str {
    match mode {
        Mode::List => "a add  space done  d remove  C clear  r reload  q quit",
        Mode::Form => "tab next field  enter save  esc cancel",
        Mode::ConfirmClear => "y confirm  any other key cancels",
    }
}

fn draw_tasks<S: KeyValueStore>(f: &mut Frame, app: &App<S>, today: NaiveDate, area: Rect) {
    let groups = app.board.groups(today);
    let selected_id = app.board.selected().map(|t| t.id);
    let (items, selected_item) = task_items(&groups, selected_id);

    let mut state = ListState::default();
    state.select(selected_item);

    let list = List::new(items)
        .block(Block::default().title("Tasks").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut state);
}

/// One header item per group and one item per task; also the item index of
/// the selected task.
fn task_items(
    groups: &[DayGroup],
    selected_id: Option<u64>,
) -> (Vec<ListItem<'static>>, Option<usize>) {
    let mut items = Vec::new();
    let mut selected = None;
    for group in groups {
        let header_style = if group.is_today {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        items.push(ListItem::new(Line::from(Span::styled(
            format!("{}:", group.label),
            header_style,
        ))));
        for task in &group.tasks {
            if Some(task.id) == selected_id {
                selected = Some(items.len());
            }
            items.push(ListItem::new(task_lines(task)));
        }
    }
    (items, selected)
}

fn task_lines(task: &Task) -> Vec<Line<'static>> {
    let checkbox = if task.done { "[x] " } else { "[ ] " };
    let mut name_style = Style::default();
    if task.is_important {
        name_style = name_style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }
    if task.done {
        name_style = name_style
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT);
    }

    let mut lines = vec![Line::from(vec![
        Span::raw(format!("  {checkbox}")),
        Span::styled(task.task_name.clone(), name_style),
    ])];
    if !task.description.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("      {}", task.description),
            Style::default().fg(Color::Gray),
        )));
    }
    lines
}

fn draw_form(f: &mut Frame, form: &TaskForm, area: Rect) {
    let lines: Vec<Line> = TaskForm::fields()
        .into_iter()
        .map(|field| {
            let value = match field {
                Field::Important if form.is_important => "[x]".to_string(),
                Field::Important => "[ ]".to_string(),
                _ => form.text(field).to_string(),
            };
            let style = if form.focus == field {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{:<12} ", field.label()), style),
                Span::raw(value),
            ])
        })
        .collect();

    let form_widget =
        Paragraph::new(lines).block(Block::default().title("New task").borders(Borders::ALL));
    f.render_widget(form_widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, TaskStore};
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn app() -> App<MemoryStore> {
        App::new(TaskBoard::new(TaskStore::new(MemoryStore::new())))
    }

    fn press(app: &mut App<MemoryStore>, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App<MemoryStore>, s: &str) {
        s.chars().for_each(|c| {
            press(app, KeyCode::Char(c));
        });
    }

    fn add_via_form(app: &mut App<MemoryStore>, day: &str, name: &str, important: bool) {
        press(app, KeyCode::Char('a'));
        type_str(app, day);
        press(app, KeyCode::Tab);
        type_str(app, name);
        if important {
            press(app, KeyCode::Tab);
            press(app, KeyCode::Tab);
            press(app, KeyCode::Char(' '));
        }
        press(app, KeyCode::Enter);
    }

    fn screen(app: &App<MemoryStore>) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(50, 12)).unwrap();
        terminal.draw(|f| draw(f, app, today())).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn failed_setup_runs_restore() {
        let restored = std::cell::Cell::new(false);
        let result: Result<()> = setup_or_restore(
            || Err(io::Error::new(io::ErrorKind::Other, "no tty")),
            || {
                restored.set(true);
                Ok(())
            },
        );
        assert!(matches!(result, Err(crate::error::TaskError::Io(_))));
        assert!(restored.get());

        let restored = std::cell::Cell::new(false);
        let value = setup_or_restore(
            || Ok(7),
            || {
                restored.set(true);
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(value, 7);
        assert!(!restored.get());
    }

    #[test]
    fn form_submission_adds_task_and_resets_form() {
        let mut app = app();
        add_via_form(&mut app, "Friday", "Report", false);

        assert_eq!(app.mode, Mode::List);
        assert_eq!(app.board.tasks().len(), 1);
        let task = &app.board.tasks()[0];
        assert_eq!((task.day.as_str(), task.task_name.as_str()), ("Friday", "Report"));
        assert!(!task.done);
        assert_eq!(app.form.day, "");
    }

    #[test]
    fn incomplete_form_stays_open_with_message() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "monday");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Form);
        assert_eq!(app.status.as_deref(), Some("task name is required"));
        assert!(app.board.tasks().is_empty());
    }

    #[test]
    fn space_toggles_selected_task() {
        let mut app = app();
        add_via_form(&mut app, "monday", "a", false);
        add_via_form(&mut app, "monday", "b", false);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        let done: Vec<_> = app.board.tasks().iter().map(|t| t.done).collect();
        assert_eq!(done, [false, true]);
    }

    #[test]
    fn clear_needs_confirmation() {
        let mut app = app();
        add_via_form(&mut app, "monday", "a", false);
        press(&mut app, KeyCode::Char('C'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.board.tasks().len(), 1);

        press(&mut app, KeyCode::Char('C'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.board.tasks().is_empty());
        assert_eq!(app.mode, Mode::List);
    }

    #[test]
    fn q_quits_only_from_list() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.form.day, "q");
        press(&mut app, KeyCode::Esc);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn renders_groups_with_dates_and_checkboxes() {
        let mut app = app();
        add_via_form(&mut app, "tuesday", "Buy milk", false);
        add_via_form(&mut app, "monday", "Call bank", true);
        let first = app.board.tasks()[0].id;
        app.board.set_done(first, true).unwrap();

        let rows = screen(&app);
        let text = rows.join("\n");
        assert!(text.contains("Monday (Oct 16):"));
        assert!(text.contains("[x] Call bank"));
        assert!(text.contains("Tuesday (Oct 17):"));
        assert!(text.contains("[ ] Buy milk"));

        let monday = rows.iter().position(|r| r.contains("Monday")).unwrap();
        let tuesday = rows.iter().position(|r| r.contains("Tuesday")).unwrap();
        assert!(monday < tuesday);
    }

    #[test]
    fn corrupt_storage_shows_notice() {
        let mut store = TaskStore::new(MemoryStore::new());
        store
            .backend_mut()
            .set(crate::storage::TASKS_KEY, "garbage")
            .unwrap();
        let mut app = App::new(TaskBoard::new(store));
        app.reload();
        assert!(app.status.as_deref().unwrap().contains("showing an empty list"));
        assert!(screen(&app).join("\n").contains("unreadable"));
    }
}
