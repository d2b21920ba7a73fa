use clap::{CommandFactory, Parser};
use habit_cli::cli::{Cli, ColorCommand, Command, ConfigOverrideTarget, parse_config_override};
use habit_cli::render::{self, ColorMode};
use habit_core::calendar;
use habit_core::clock::{clock_from_env, parse_iso_date};
use habit_core::config::{self, Config, ConfigOverrides};
use habit_core::error::AppError;
use habit_core::grid::{GridCell, year_grid};
use habit_core::model::Task;
use habit_core::stats::{color_usage, task_stats};
use habit_core::storage::FileStore;
use habit_core::store::{ColorRemoval, HabitStore};
use std::io::{self, BufRead};
use time::Date;

const DEFAULT_ICON: &str = "💪";

fn open_store() -> Result<HabitStore, AppError> {
    let backend = FileStore::from_env()?;
    HabitStore::open(Box::new(backend))
}

fn cell_key_for(date: Date) -> String {
    calendar::cell_key(date.year(), u8::from(date.month()) - 1, date.day())
}

fn print_task_json(task: &Task) {
    let json = serde_json::json!({
        "id": task.id,
        "name": task.name,
        "icon": task.icon,
        "colors": task.colors,
        "marked_days": task.grid_data.len(),
        "created_at": task.created_at,
    });
    println!("{}", json);
}

fn print_tasks_plain(tasks: &[Task], active_task_id: Option<&str>) {
    for task in tasks {
        let prefix = if active_task_id == Some(task.id.as_str()) {
            "* "
        } else {
            "  "
        };
        println!(
            "{}{} | {} {} | {} colors | {} days marked",
            prefix,
            task.id,
            task.icon,
            task.name,
            task.colors.len(),
            task.grid_data.len()
        );
    }
}

fn print_tasks_json(tasks: &[Task]) {
    let payload: Vec<serde_json::Value> = tasks
        .iter()
        .map(|task| {
            serde_json::json!({
                "id": task.id,
                "name": task.name,
                "icon": task.icon,
                "colors": task.colors,
                "marked_days": task.grid_data.len(),
                "created_at": task.created_at,
            })
        })
        .collect();
    println!("{}", serde_json::Value::Array(payload));
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::ColorMode => overrides.color_mode = Some(parsed.value),
            ConfigOverrideTarget::DefaultIcon => overrides.default_icon = Some(parsed.value),
        }
    }
    Ok(overrides)
}

fn run_command(cli: Cli, config: &Config) -> Result<(), AppError> {
    let mut store = open_store()?;
    let today = clock_from_env()?.today();

    match cli.command {
        Command::Add { name, icon } => {
            let name = match name {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("name is required")),
            };
            let icon = icon
                .or_else(|| config.default_icon.clone())
                .unwrap_or_else(|| DEFAULT_ICON.to_string());

            let task = store.create_task(&name, &icon, None)?;
            if cli.json {
                print_task_json(&task);
            } else {
                println!("Added habit: {} {} ({})", task.icon, task.name, task.id);
            }
        }
        Command::Edit { id, name, icon } => {
            if name.is_none() && icon.is_none() {
                return Err(AppError::invalid_input("nothing to change"));
            }
            if !store.update_task(&id, name.as_deref(), icon.as_deref())? {
                return Err(AppError::not_found("no such habit"));
            }

            let task = store
                .get_task(&id)
                .ok_or_else(|| AppError::not_found("no such habit"))?;
            if cli.json {
                print_task_json(task);
            } else {
                println!("Updated habit: {} {} ({})", task.icon, task.name, task.id);
            }
        }
        Command::Delete { id } => {
            if !store.delete_task(&id)? {
                return Err(AppError::not_found("no such habit"));
            }
            if cli.json {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("Deleted habit: {id}");
            }
        }
        Command::Show { id } => {
            let task = store
                .get_task(&id)
                .ok_or_else(|| AppError::not_found("no such habit"))?;
            if cli.json {
                let json = serde_json::json!({
                    "id": task.id,
                    "name": task.name,
                    "icon": task.icon,
                    "colors": task.colors,
                    "grid_data": task.grid_data,
                    "created_at": task.created_at,
                });
                println!("{}", json);
            } else {
                println!("{} {} ({})", task.icon, task.name, task.id);
                println!("  created: {}", task.created_at);
                println!("  days marked: {}", task.grid_data.len());
                for color in &task.colors {
                    println!("  color {} ({}): hue {}", color.name, color.id, color.hue);
                }
            }
        }
        Command::List => {
            if cli.json {
                print_tasks_json(store.tasks());
            } else {
                print_tasks_plain(store.tasks(), store.active_task_id());
            }
        }
        Command::Color { color } => match color {
            ColorCommand::Add { id, name, hue } => {
                let color = store
                    .add_color(&id, &name, hue)?
                    .ok_or_else(|| AppError::not_found("no such habit"))?;
                if cli.json {
                    let json = serde_json::json!({
                        "id": color.id,
                        "name": color.name,
                        "hue": color.hue,
                    });
                    println!("{}", json);
                } else {
                    println!("Added color: {} ({}) hue {}", color.name, color.id, color.hue);
                }
            }
            ColorCommand::Remove { id, color_id } => match store.remove_color(&id, &color_id)? {
                ColorRemoval::Removed => {
                    if cli.json {
                        println!("{}", serde_json::json!({ "removed": color_id }));
                    } else {
                        println!("Removed color: {color_id}");
                    }
                }
                ColorRemoval::LastColor => {
                    return Err(AppError::invalid_input("cannot remove the last color"));
                }
                ColorRemoval::NotFound => {
                    return Err(AppError::not_found("no such habit or color"));
                }
            },
        },
        Command::Mark { id, date, color } => {
            let date = parse_iso_date(&date)?;
            let key = cell_key_for(date);
            let task = store
                .get_task(&id)
                .cloned()
                .ok_or_else(|| AppError::not_found("no such habit"))?;

            let color_id = match color.as_deref() {
                Some(raw) => task
                    .color(raw)
                    .map(|c| c.id.clone())
                    .ok_or_else(|| AppError::not_found("no such color"))?,
                None => task
                    .colors
                    .first()
                    .map(|c| c.id.clone())
                    .ok_or_else(|| AppError::invalid_data("habit has no colors"))?,
            };

            let clearing = task.grid_data.get(&key) == Some(&color_id);
            if clearing {
                store.set_cell(&id, &key, None)?;
            } else {
                store.set_cell(&id, &key, Some(&color_id))?;
            }

            if cli.json {
                let json = serde_json::json!({
                    "task_id": id,
                    "cell_key": key,
                    "color_id": if clearing {
                        serde_json::Value::Null
                    } else {
                        serde_json::Value::String(color_id.clone())
                    },
                });
                println!("{}", json);
            } else if clearing {
                println!("Cleared {key} on {id}");
            } else {
                println!("Marked {key} with {color_id} on {id}");
            }
        }
        Command::Unmark { id, date } => {
            let date = parse_iso_date(&date)?;
            let key = cell_key_for(date);
            if store.get_task(&id).is_none() {
                return Err(AppError::not_found("no such habit"));
            }

            let cleared = store.set_cell(&id, &key, None)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "task_id": id, "cell_key": key, "cleared": cleared })
                );
            } else if cleared {
                println!("Cleared {key} on {id}");
            } else {
                println!("Nothing to clear at {key} on {id}");
            }
        }
        Command::Grid { id, year } => {
            let year = year.unwrap_or_else(|| today.year());
            let task = store
                .get_task(&id)
                .ok_or_else(|| AppError::not_found("no such habit"))?;
            let grid = year_grid(task, year, today);

            if cli.json {
                let rows: Vec<Vec<serde_json::Value>> = grid
                    .rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|cell| match cell {
                                GridCell::OutOfRange => serde_json::Value::Null,
                                GridCell::Trackable {
                                    cell_key,
                                    color_id,
                                    is_today,
                                } => serde_json::json!({
                                    "cell_key": cell_key,
                                    "color_id": color_id,
                                    "is_today": is_today,
                                }),
                            })
                            .collect()
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({ "task_id": id, "year": year, "rows": rows })
                );
            } else {
                let colored = ColorMode::from_config(config.color_mode.as_deref()).enabled();
                println!("{} {} ({})", task.icon, task.name, year);
                println!("{}", render::render_year_grid(task, &grid, colored));
                println!("{}", render::render_legend(&color_usage(task), colored));
            }
        }
        Command::Stats { id, year } => {
            let year = year.unwrap_or_else(|| today.year());
            let task = store
                .get_task(&id)
                .ok_or_else(|| AppError::not_found("no such habit"))?;
            let stats = task_stats(task, year, today);
            let usage = color_usage(task);

            if cli.json {
                let colors: Vec<serde_json::Value> = usage
                    .iter()
                    .map(|entry| {
                        serde_json::json!({
                            "id": entry.color.id,
                            "name": entry.color.name,
                            "count": entry.count,
                        })
                    })
                    .collect();
                let json = serde_json::json!({
                    "task_id": id,
                    "year": year,
                    "total_days": stats.total_days,
                    "filled_days": stats.filled_days,
                    "remaining_days": stats.remaining_days,
                    "completion_percentage": stats.completion_percentage,
                    "colors": colors,
                });
                println!("{}", json);
            } else {
                println!("{}", render::render_stats(task, year, &stats, &usage));
            }
        }
    }

    Ok(())
}

fn run(cli: Cli) -> Result<(), AppError> {
    let load = config::load_config_with_fallback();
    if let Some(err) = load.error {
        eprintln!("WARNING: {err}");
    }
    let overrides = collect_overrides(&cli.config_override)?;
    let config = config::merge_overrides(&load.config, &overrides);

    run_command(cli, &config)
}

fn run_interactive() -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("habit".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run(cli) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive() {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
