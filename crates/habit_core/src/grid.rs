use crate::calendar::{cell_key, is_today, is_valid_day};
use crate::model::Task;
use time::Date;

pub const GRID_ROWS: usize = 31;
pub const GRID_COLS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCell {
    /// The day number exceeds that month's day count.
    OutOfRange,
    Trackable {
        cell_key: String,
        color_id: Option<String>,
        is_today: bool,
    },
}

/// Renderable 31-row x 12-column matrix for one task and year. Row index is
/// day-of-month minus one, column index is the month. The rendering layer
/// consumes this as-is and never recomputes calendar validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearGrid {
    pub year: i32,
    pub rows: Vec<Vec<GridCell>>,
}

pub fn year_grid(task: &Task, year: i32, today: Date) -> YearGrid {
    let mut rows = Vec::with_capacity(GRID_ROWS);

    for day in 1..=GRID_ROWS as u8 {
        let mut row = Vec::with_capacity(GRID_COLS);
        for month in 0..GRID_COLS as u8 {
            if !is_valid_day(year, month, day) {
                row.push(GridCell::OutOfRange);
                continue;
            }

            let key = cell_key(year, month, day);
            row.push(GridCell::Trackable {
                color_id: task.grid_data.get(&key).cloned(),
                is_today: is_today(year, month, day, today),
                cell_key: key,
            });
        }
        rows.push(row);
    }

    YearGrid { year, rows }
}
