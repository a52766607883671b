//! Partitions sorted tasks into day groups with calendar-date headers.

use chrono::{Datelike, Days, NaiveDate};

use crate::ordering::{parse_weekday, weekday_name};
use crate::task::Task;

/// Tasks sharing a weekday, shown under one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    /// Full weekday name, or the lowercased text for non-weekdays.
    pub key: String,
    pub label: String,
    pub date: Option<NaiveDate>,
    pub is_today: bool,
    pub tasks: Vec<Task>,
}

/// Groups an already-sorted slice, keeping first-seen day order.
///
/// Every spelling of a weekday ("Mon", "monday") lands in the same group;
/// other strings group by their lowercased text.
pub fn group_by_day(tasks: &[Task], today: NaiveDate) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    for task in tasks {
        let key = group_key(&task.day);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.tasks.push(task.clone()),
            None => {
                let date = day_date(&key, today);
                groups.push(DayGroup {
                    label: day_label(&key, date),
                    is_today: parse_weekday(&key) == Some(today.weekday()),
                    date,
                    key,
                    tasks: vec![task.clone()],
                });
            }
        }
    }
    groups
}

fn group_key(day: &str) -> String {
    match parse_weekday(day) {
        Some(weekday) => weekday_name(weekday).to_string(),
        None => day.trim().to_lowercase(),
    }
}

/// `today` shifted forward by the day's Monday-first offset (Monday adds
/// nothing, Sunday adds six). `None` for strings that are not weekdays.
pub fn day_date(day: &str, today: NaiveDate) -> Option<NaiveDate> {
    let weekday = parse_weekday(day)?;
    today.checked_add_days(Days::new(u64::from(weekday.num_days_from_monday())))
}

/// Header text such as `Friday (Oct 16)`, or just the capitalized day when
/// no date could be computed.
pub fn day_label(day: &str, date: Option<NaiveDate>) -> String {
    let name = capitalize(day.trim());
    match date {
        Some(date) => format!("{name} ({})", date.format("%b %-d")),
        None => name,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Plain-text rendering of the groups, one line per header and task.
pub fn plain_lines(groups: &[DayGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        let marker = if group.is_today { " <- today" } else { "" };
        lines.push(format!("{}:{marker}", group.label));
        for task in &group.tasks {
            let check = if task.done { 'x' } else { ' ' };
            let flag = if task.is_important { "!" } else { " " };
            lines.push(format!(
                "  [{check}] {flag} {} (#{})",
                task.task_name, task.id
            ));
            if !task.description.is_empty() {
                lines.push(format!("        {}", task.description));
            }
        }
    }
    lines
}
