use habit_core::grid::{GridCell, YearGrid};
use habit_core::model::Task;
use habit_core::stats::{ColorUsage, TaskStats};
use std::io::IsTerminal;
use tabled::builder::Builder;
use tabled::settings::Style;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            Some("always") => Self::Always,
            Some("never") => Self::Never,
            _ => Self::Auto,
        }
    }

    pub fn enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::stdout().is_terminal(),
        }
    }
}

/// hsl(hue, 70%, 50%), the fixed saturation/lightness every swatch uses.
pub fn hue_to_rgb(hue: u16) -> (u8, u8, u8) {
    let h = f64::from(hue % 360) / 60.0;
    let c = 0.70;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = 0.50 - c / 2.0;

    let (r, g, b) = match h as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

fn paint(hue: u16, text: &str) -> String {
    let (r, g, b) = hue_to_rgb(hue);
    format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
}

/// Colored cells show a block in the palette color; plain cells fall back to
/// the color's 1-based palette position so the grid stays readable without
/// ANSI support. Today's cell is bracketed either way.
pub fn render_year_grid(task: &Task, grid: &YearGrid, colored: bool) -> String {
    let mut builder = Builder::default();

    let mut header = Vec::with_capacity(MONTH_LABELS.len() + 1);
    header.push("Day".to_string());
    header.extend(MONTH_LABELS.iter().map(|label| label.to_string()));
    builder.push_record(header);

    for (row_index, row) in grid.rows.iter().enumerate() {
        let mut record = Vec::with_capacity(MONTH_LABELS.len() + 1);
        record.push((row_index + 1).to_string());
        for cell in row {
            record.push(render_cell(task, cell, colored));
        }
        builder.push_record(record);
    }

    let mut table = builder.build();
    table.with(Style::blank());
    table.to_string()
}

fn render_cell(task: &Task, cell: &GridCell, colored: bool) -> String {
    let GridCell::Trackable {
        color_id, is_today, ..
    } = cell
    else {
        return String::new();
    };

    let glyph = match color_id.as_deref() {
        Some(id) => match task.colors.iter().position(|color| color.id == id) {
            Some(index) if colored => paint(task.colors[index].hue, "█"),
            Some(index) => (index + 1).to_string(),
            None => "?".to_string(),
        },
        None => "·".to_string(),
    };

    if *is_today {
        format!("[{glyph}]")
    } else {
        glyph
    }
}

pub fn render_legend(usage: &[ColorUsage], colored: bool) -> String {
    let mut lines = Vec::with_capacity(usage.len());
    for (index, entry) in usage.iter().enumerate() {
        let swatch = if colored {
            paint(entry.color.hue, "■")
        } else {
            (index + 1).to_string()
        };
        lines.push(format!(
            "{} {} ({}): {}",
            swatch, entry.color.name, entry.color.id, entry.count
        ));
    }
    lines.join("\n")
}

pub fn render_stats(task: &Task, year: i32, stats: &TaskStats, usage: &[ColorUsage]) -> String {
    let mut lines = vec![
        format!("{} {} ({})", task.icon, task.name, year),
        format!(
            "  filled: {} of {} days ({}%)",
            stats.filled_days, stats.total_days, stats.completion_percentage
        ),
        format!("  remaining: {}", stats.remaining_days),
    ];
    for entry in usage {
        lines.push(format!("  {} ({}): {}", entry.color.name, entry.color.id, entry.count));
    }
    lines.join("\n")
}
