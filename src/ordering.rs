//! Deterministic task ordering: weekday, then importance, then name.

use std::cmp::Ordering;

use chrono::Weekday;

use crate::task::Task;

/// Parses a free-text day name, ignoring case and surrounding whitespace.
/// Accepts full names and three-letter abbreviations.
pub fn parse_weekday(day: &str) -> Option<Weekday> {
    day.trim().parse::<Weekday>().ok()
}

/// Lowercase full name, the canonical spelling for grouping.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Position in the Monday-first week: Monday is 0, Sunday is 6.
pub fn weekday_rank(day: &str) -> Option<u32> {
    parse_weekday(day).map(|d| d.num_days_from_monday())
}

/// Recognized weekdays in calendar order, then anything else by its
/// lowercased text.
pub fn compare_days(a: &str, b: &str) -> Ordering {
    match (weekday_rank(a), weekday_rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.trim().to_lowercase().cmp(&b.trim().to_lowercase()),
    }
}

pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    compare_days(&a.day, &b.day)
        .then_with(|| b.is_important.cmp(&a.is_important))
        .then_with(|| a.task_name.cmp(&b.task_name))
}

/// Sorts in place. The sort is stable, so full ties keep their input order.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64, day: &str, name: &str, important: bool) -> Task {
        Task {
            id,
            day: day.into(),
            task_name: name.into(),
            description: String::new(),
            is_important: important,
            done: false,
        }
    }

    fn names(tasks: &[Task]) -> Vec<(&str, &str, bool)> {
        tasks
            .iter()
            .map(|t| (t.day.as_str(), t.task_name.as_str(), t.is_important))
            .collect()
    }

    #[test]
    fn weekday_rank_is_monday_first_and_case_insensitive() {
        assert_eq!(weekday_rank("Monday"), Some(0));
        assert_eq!(weekday_rank("  tuesday "), Some(1));
        assert_eq!(weekday_rank("SATURDAY"), Some(5));
        assert_eq!(weekday_rank("sun"), Some(6));
        assert_eq!(weekday_rank("someday"), None);
        assert_eq!(weekday_rank(""), None);
    }

    #[test]
    fn calendar_order_not_alphabetical() {
        let mut tasks = vec![
            task(1, "sunday", "a", false),
            task(2, "friday", "a", false),
            task(3, "Monday", "a", false),
            task(4, "wednesday", "a", false),
        ];
        sort_tasks(&mut tasks);
        let days: Vec<_> = tasks.iter().map(|t| t.day.as_str()).collect();
        assert_eq!(days, ["Monday", "wednesday", "friday", "sunday"]);
    }

    #[test]
    fn mixed_day_and_importance_scenario() {
        let mut tasks = vec![
            task(1, "Tuesday", "Buy milk", false),
            task(2, "Monday", "Call bank", true),
            task(3, "Monday", "Call bank", false),
        ];
        sort_tasks(&mut tasks);
        assert_eq!(
            names(&tasks),
            [
                ("Monday", "Call bank", true),
                ("Monday", "Call bank", false),
                ("Tuesday", "Buy milk", false),
            ]
        );
    }

    #[test]
    fn important_first_then_name_within_a_day() {
        let mut tasks = vec![
            task(1, "monday", "b", false),
            task(2, "monday", "z", true),
            task(3, "monday", "a", false),
            task(4, "monday", "c", true),
            task(5, "monday", "B", false),
        ];
        sort_tasks(&mut tasks);
        let ordered: Vec<_> = tasks.iter().map(|t| t.task_name.as_str()).collect();
        // case-sensitive: uppercase sorts before lowercase
        assert_eq!(ordered, ["c", "z", "B", "a", "b"]);
    }

    #[test]
    fn unknown_days_sort_last() {
        let mut tasks = vec![
            task(1, "Someday", "x", true),
            task(2, "sunday", "y", false),
            task(3, "later", "z", false),
        ];
        sort_tasks(&mut tasks);
        let days: Vec<_> = tasks.iter().map(|t| t.day.as_str()).collect();
        assert_eq!(days, ["sunday", "later", "Someday"]);
    }

    #[test]
    fn full_ties_keep_input_order_and_nothing_is_dropped() {
        let mut tasks = vec![
            task(1, "friday", "same", false),
            task(2, "fri", "same", false),
            task(3, "Friday", "same", false),
        ];
        sort_tasks(&mut tasks);
        let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, [1, 2, 3]);

        let mut empty: Vec<Task> = Vec::new();
        sort_tasks(&mut empty);
        assert!(empty.is_empty());
    }
}
