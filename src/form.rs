//! Input form for new tasks.

use crate::task::NewTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Day,
    TaskName,
    Description,
    Important,
}

impl Field {
    const ORDER: [Field; 4] = [
        Field::Day,
        Field::TaskName,
        Field::Description,
        Field::Important,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Day => "Day *",
            Field::TaskName => "Task *",
            Field::Description => "Description",
            Field::Important => "Important",
        }
    }

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
}

/// Field buffers plus the focused field.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub day: String,
    pub task_name: String,
    pub description: String,
    pub is_important: bool,
    pub focus: Field,
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus_next(&mut self) {
        let next = (self.focus.index() + 1) % Field::ORDER.len();
        self.focus = Field::ORDER[next];
    }

    pub fn focus_prev(&mut self) {
        let len = Field::ORDER.len();
        self.focus = Field::ORDER[(self.focus.index() + len - 1) % len];
    }

    /// Types into the focused text field. A space on the importance field
    /// toggles it instead.
    pub fn input_char(&mut self, c: char) {
        match self.focus {
            Field::Important if c == ' ' => self.toggle_important(),
            Field::Important => {}
            _ => {
                if let Some(buf) = self.focused_text_mut() {
                    buf.push(c);
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buf) = self.focused_text_mut() {
            buf.pop();
        }
    }

    pub fn toggle_important(&mut self) {
        self.is_important = !self.is_important;
    }

    /// Checks the required fields and hands back the entered values.
    /// The form itself is left untouched; call [`TaskForm::clear`] once the
    /// task is stored.
    pub fn submit(&self) -> Result<NewTask, FormError> {
        if self.day.trim().is_empty() {
            return Err(FormError::Required("day"));
        }
        if self.task_name.trim().is_empty() {
            return Err(FormError::Required("task name"));
        }
        Ok(NewTask {
            day: self.day.clone(),
            task_name: self.task_name.clone(),
            description: self.description.clone(),
            is_important: self.is_important,
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Day => &self.day,
            Field::TaskName => &self.task_name,
            Field::Description => &self.description,
            Field::Important => "",
        }
    }

    pub fn fields() -> [Field; 4] {
        Field::ORDER
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Day => Some(&mut self.day),
            Field::TaskName => Some(&mut self.task_name),
            Field::Description => Some(&mut self.description),
            Field::Important => None,
        }
    }
}
