use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new habit
    ///
    /// Example: habit add "Exercise" --icon 💪
    Add {
        name: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Rename a habit or change its icon
    ///
    /// Example: habit edit task-1 --name "Morning run" --icon 🏃
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a habit
    ///
    /// Example: habit delete task-1
    Delete {
        id: String,
    },
    /// Show a habit with its palette
    ///
    /// Example: habit show task-1
    Show {
        id: String,
    },
    /// List habits
    ///
    /// Example: habit list
    List,
    /// Manage a habit's color palette
    Color {
        #[command(subcommand)]
        color: ColorCommand,
    },
    /// Mark a day; marking it again with the same color clears it
    ///
    /// Example: habit mark task-1 2024-01-15
    /// Example: habit mark task-1 2024-01-15 missed
    Mark {
        id: String,
        date: String,
        color: Option<String>,
    },
    /// Clear a day
    ///
    /// Example: habit unmark task-1 2024-01-15
    Unmark {
        id: String,
        date: String,
    },
    /// Print the year grid
    ///
    /// Example: habit grid task-1 --year 2024
    Grid {
        id: String,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Print completion statistics
    ///
    /// Example: habit stats task-1
    Stats {
        id: String,
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ColorCommand {
    /// Add a color to the palette (hue 0-359)
    ///
    /// Example: habit color add task-1 "Rest day" 210
    Add {
        id: String,
        name: String,
        #[arg(value_parser = clap::value_parser!(u16).range(0..=359))]
        hue: u16,
    },
    /// Remove a color and clear every day marked with it
    ///
    /// Example: habit color remove task-1 missed
    Remove {
        id: String,
        color_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    ColorMode,
    DefaultIcon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_field = canonicalize_flag_name(key_raw)
        .ok_or_else(|| "override key cannot be empty".to_string())?;

    match canonical_field.as_str() {
        "color_mode" => Ok(ParsedConfigOverride {
            target: ConfigOverrideTarget::ColorMode,
            value,
        }),
        "default_icon" | "icon" => Ok(ParsedConfigOverride {
            target: ConfigOverrideTarget::DefaultIcon,
            value,
        }),
        other => Err(format!("unknown config field '{other}'")),
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
