//! A weekly task list: tasks tagged with a weekday, kept in a key-value
//! store, and shown grouped by day.

pub mod cli;
pub mod error;
pub mod form;
pub mod grouping;
pub mod logger;
pub mod ordering;
pub mod settings;
pub mod storage;
pub mod task;
pub mod task_board;
pub mod ui;

pub use error::{Result, TaskError};
pub use task::{NewTask, Task};
