use crate::calendar::{cell_key, days_in_month};
use crate::model::{Color, Task};
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub total_days: u32,
    pub filled_days: u32,
    pub remaining_days: u32,
    pub completion_percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorUsage {
    pub color: Color,
    pub count: usize,
}

/// Completion counts for one tracked year. Only days elapsed up to and
/// including `today` enter the denominator, so future days never lower the
/// percentage. The percentage rounds half away from zero.
pub fn task_stats(task: &Task, year: i32, today: Date) -> TaskStats {
    let mut total_days = 0u32;
    let mut filled_days = 0u32;

    for month in 0..12u8 {
        for day in 1..=days_in_month(year, month) {
            if !elapsed(year, month, day, today) {
                continue;
            }
            total_days += 1;
            if task.grid_data.contains_key(&cell_key(year, month, day)) {
                filled_days += 1;
            }
        }
    }

    let completion_percentage = if total_days > 0 {
        ((f64::from(filled_days) / f64::from(total_days)) * 100.0).round() as u8
    } else {
        0
    };

    TaskStats {
        total_days,
        filled_days,
        remaining_days: total_days - filled_days,
        completion_percentage,
    }
}

pub fn per_color_count(task: &Task, color_id: &str) -> usize {
    task.grid_data
        .values()
        .filter(|value| value.as_str() == color_id)
        .count()
}

/// Per-color usage in palette order, for legends and summaries.
pub fn color_usage(task: &Task) -> Vec<ColorUsage> {
    task.colors
        .iter()
        .map(|color| ColorUsage {
            color: color.clone(),
            count: per_color_count(task, &color.id),
        })
        .collect()
}

fn elapsed(year: i32, month: u8, day: u8, today: Date) -> bool {
    (year, month, day) <= (today.year(), u8::from(today.month()) - 1, today.day())
}

#[cfg(test)]
mod tests {
    use super::{color_usage, per_color_count, task_stats};
    use crate::model::{Task, default_palette};
    use std::collections::HashMap;
    use time::macros::date;

    fn task_with_cells(cells: &[(&str, &str)]) -> Task {
        Task {
            id: "task-1".to_string(),
            name: "Exercise".to_string(),
            icon: "💪".to_string(),
            colors: default_palette(),
            grid_data: cells
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn counts_only_elapsed_days_in_denominator() {
        let task = task_with_cells(&[("2024-0-15", "done")]);
        let stats = task_stats(&task, 2024, date!(2024 - 01 - 20));

        assert_eq!(stats.total_days, 20);
        assert_eq!(stats.filled_days, 1);
        assert_eq!(stats.remaining_days, 19);
        assert_eq!(stats.completion_percentage, 5);
    }

    #[test]
    fn future_marks_do_not_count_as_filled() {
        let task = task_with_cells(&[("2024-0-15", "done"), ("2024-11-31", "done")]);
        let stats = task_stats(&task, 2024, date!(2024 - 01 - 20));

        assert_eq!(stats.filled_days, 1);
    }

    #[test]
    fn other_year_marks_do_not_count() {
        let task = task_with_cells(&[("2023-0-15", "done")]);
        let stats = task_stats(&task, 2024, date!(2024 - 01 - 20));

        assert_eq!(stats.filled_days, 0);
        assert_eq!(stats.total_days, 20);
    }

    #[test]
    fn past_year_uses_full_year_of_days() {
        let task = task_with_cells(&[("2023-0-1", "done")]);
        let stats = task_stats(&task, 2023, date!(2024 - 06 - 15));

        assert_eq!(stats.total_days, 365);
        assert_eq!(stats.filled_days, 1);
    }

    #[test]
    fn leap_year_counts_february_29() {
        let task = task_with_cells(&[("2024-1-29", "done")]);
        let stats = task_stats(&task, 2024, date!(2024 - 02 - 29));

        assert_eq!(stats.total_days, 31 + 29);
        assert_eq!(stats.filled_days, 1);
    }

    #[test]
    fn year_not_yet_started_is_all_zeroes() {
        let task = task_with_cells(&[("2025-0-1", "done")]);
        let stats = task_stats(&task, 2025, date!(2024 - 06 - 15));

        assert_eq!(stats.total_days, 0);
        assert_eq!(stats.filled_days, 0);
        assert_eq!(stats.completion_percentage, 0);
    }

    #[test]
    fn percentage_rounds_to_nearest_integer() {
        // 1 of 3 elapsed days = 33.33..%
        let task = task_with_cells(&[("2024-0-1", "done")]);
        let stats = task_stats(&task, 2024, date!(2024 - 01 - 03));
        assert_eq!(stats.completion_percentage, 33);

        // 2 of 3 = 66.66..%
        let task = task_with_cells(&[("2024-0-1", "done"), ("2024-0-2", "partial")]);
        let stats = task_stats(&task, 2024, date!(2024 - 01 - 03));
        assert_eq!(stats.completion_percentage, 67);
    }

    #[test]
    fn stats_stay_within_bounds() {
        let mut cells = HashMap::new();
        for day in 1..=31u8 {
            cells.insert(format!("2024-0-{day}"), "done".to_string());
        }
        let mut task = task_with_cells(&[]);
        task.grid_data = cells;

        let stats = task_stats(&task, 2024, date!(2024 - 12 - 31));
        assert!(stats.filled_days <= stats.total_days);
        assert!(stats.completion_percentage <= 100);

        let full = task_stats(&task, 2024, date!(2024 - 01 - 31));
        assert_eq!(full.completion_percentage, 100);
    }

    #[test]
    fn per_color_count_tallies_all_entries() {
        let task = task_with_cells(&[
            ("2024-0-1", "done"),
            ("2024-0-2", "done"),
            ("2024-0-3", "partial"),
        ]);

        assert_eq!(per_color_count(&task, "done"), 2);
        assert_eq!(per_color_count(&task, "partial"), 1);
        assert_eq!(per_color_count(&task, "missed"), 0);
    }

    #[test]
    fn color_usage_follows_palette_order() {
        let task = task_with_cells(&[("2024-0-1", "missed"), ("2024-0-2", "missed")]);
        let usage = color_usage(&task);

        let summary: Vec<(&str, usize)> = usage
            .iter()
            .map(|entry| (entry.color.id.as_str(), entry.count))
            .collect();
        assert_eq!(summary, [("done", 0), ("partial", 0), ("missed", 2)]);
    }
}
