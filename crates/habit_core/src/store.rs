use crate::calendar;
use crate::error::AppError;
use crate::model::{Color, Task, default_palette};
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub const STORE_KEY: &str = "habits";
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoredState {
    schema_version: u32,
    tasks: Vec<Task>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRemoval {
    Removed,
    LastColor,
    NotFound,
}

/// Owns the task collection and persists it through an injected backend.
/// Every mutation applies in memory first and then writes the whole
/// collection; a failed write surfaces as an error while the in-memory
/// change stays applied, leaving retry to the caller.
pub struct HabitStore {
    backend: Box<dyn KeyValueStore>,
    tasks: Vec<Task>,
    active_task_id: Option<String>,
    selected_color_id: Option<String>,
}

impl std::fmt::Debug for HabitStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HabitStore")
            .field("backend", &"<dyn KeyValueStore>")
            .field("tasks", &self.tasks)
            .field("active_task_id", &self.active_task_id)
            .field("selected_color_id", &self.selected_color_id)
            .finish()
    }
}

impl HabitStore {
    /// Loads the collection, seeding and persisting the default tasks when
    /// the backend has no data yet. A malformed or invariant-violating blob
    /// is an error, never a silent fall back to defaults.
    pub fn open(backend: Box<dyn KeyValueStore>) -> Result<Self, AppError> {
        let mut store = Self {
            backend,
            tasks: Vec::new(),
            active_task_id: None,
            selected_color_id: None,
        };

        match store.backend.read(STORE_KEY)? {
            Some(blob) => {
                let stored: StoredState = serde_json::from_str(&blob)
                    .map_err(|err| AppError::invalid_data(err.to_string()))?;
                if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
                    return Err(AppError::invalid_data("schema_version mismatch"));
                }
                validate_tasks(&stored.tasks)?;
                store.tasks = stored.tasks;
            }
            None => {
                store.tasks = seed_tasks();
                store.persist()?;
            }
        }

        store.reset_selection();
        Ok(store)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.active_task_id
            .as_deref()
            .and_then(|id| self.get_task(id))
    }

    pub fn active_task_id(&self) -> Option<&str> {
        self.active_task_id.as_deref()
    }

    pub fn selected_color_id(&self) -> Option<&str> {
        self.selected_color_id.as_deref()
    }

    /// Selection is transient UI state and is never persisted.
    pub fn select_task(&mut self, id: &str) -> bool {
        let Some(task) = self.get_task(id) else {
            return false;
        };
        let first_color = task.colors.first().map(|color| color.id.clone());
        self.active_task_id = Some(id.to_string());
        self.selected_color_id = first_color;
        true
    }

    pub fn select_color(&mut self, color_id: &str) -> bool {
        let Some(task) = self.active_task() else {
            return false;
        };
        if task.color(color_id).is_none() {
            return false;
        }
        self.selected_color_id = Some(color_id.to_string());
        true
    }

    pub fn create_task(
        &mut self,
        name: &str,
        icon: &str,
        initial_colors: Option<Vec<Color>>,
    ) -> Result<Task, AppError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("name is required"));
        }

        let colors = match initial_colors {
            Some(colors) => {
                validate_palette(&colors)?;
                colors
            }
            None => default_palette(),
        };

        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        let id = format!("task-{}", OffsetDateTime::now_utc().unix_timestamp_nanos());

        let task = Task {
            id: id.clone(),
            name: trimmed.to_string(),
            icon: icon.to_string(),
            colors,
            grid_data: Default::default(),
            created_at,
        };

        self.tasks.push(task.clone());
        self.active_task_id = Some(id);
        self.selected_color_id = task.colors.first().map(|color| color.id.clone());
        self.persist()?;

        Ok(task)
    }

    /// Returns `Ok(false)` without touching anything when the id is unknown.
    pub fn update_task(
        &mut self,
        id: &str,
        name: Option<&str>,
        icon: Option<&str>,
    ) -> Result<bool, AppError> {
        let name = match name {
            Some(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(AppError::invalid_input("name cannot be blank"));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(false);
        };

        if let Some(name) = name {
            task.name = name;
        }
        if let Some(icon) = icon {
            task.icon = icon.to_string();
        }

        self.persist()?;
        Ok(true)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<bool, AppError> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            return Ok(false);
        };

        self.tasks.remove(index);
        if self.active_task_id.as_deref() == Some(id) {
            self.reset_selection();
        }

        self.persist()?;
        Ok(true)
    }

    /// `Ok(None)` when the task id is unknown. The hue range is the caller's
    /// contract and is not re-checked here.
    pub fn add_color(
        &mut self,
        task_id: &str,
        name: &str,
        hue: u16,
    ) -> Result<Option<Color>, AppError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("color name is required"));
        }

        let id = format!("color-{}", OffsetDateTime::now_utc().unix_timestamp_nanos());
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) else {
            return Ok(None);
        };

        let color = Color {
            id,
            name: trimmed.to_string(),
            hue,
        };
        task.colors.push(color.clone());

        self.persist()?;
        Ok(Some(color))
    }

    /// Removing a task's last color is rejected so the palette never goes
    /// empty. On success every grid entry painted with the color is deleted
    /// in the same write, and a removed selected color falls back to the
    /// task's first remaining one.
    pub fn remove_color(&mut self, task_id: &str, color_id: &str) -> Result<ColorRemoval, AppError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) else {
            return Ok(ColorRemoval::NotFound);
        };
        let Some(index) = task.colors.iter().position(|color| color.id == color_id) else {
            return Ok(ColorRemoval::NotFound);
        };
        if task.colors.len() == 1 {
            return Ok(ColorRemoval::LastColor);
        }

        task.colors.remove(index);
        task.grid_data.retain(|_, value| value != color_id);
        let fallback = task.colors.first().map(|color| color.id.clone());

        if self.selected_color_id.as_deref() == Some(color_id) {
            self.selected_color_id = fallback;
        }

        self.persist()?;
        Ok(ColorRemoval::Removed)
    }

    /// `color_id: None` clears the cell (the key is absent afterwards).
    /// Malformed or out-of-calendar keys are input errors; an unknown task
    /// or color is a `false` no-op.
    pub fn set_cell(
        &mut self,
        task_id: &str,
        key: &str,
        color_id: Option<&str>,
    ) -> Result<bool, AppError> {
        let (year, month, day) = calendar::parse_cell_key(key)
            .ok_or_else(|| AppError::invalid_input("cell key must be year-month-day"))?;
        if !calendar::is_valid_day(year, month, day) {
            return Err(AppError::invalid_input("no such calendar day"));
        }
        let canonical = calendar::cell_key(year, month, day);

        let Some(task) = self.tasks.iter_mut().find(|task| task.id == task_id) else {
            return Ok(false);
        };

        match color_id {
            Some(color_id) => {
                if task.color(color_id).is_none() {
                    return Ok(false);
                }
                task.grid_data.insert(canonical, color_id.to_string());
            }
            None => {
                if task.grid_data.remove(&canonical).is_none() {
                    return Ok(false);
                }
            }
        }

        self.persist()?;
        Ok(true)
    }

    fn reset_selection(&mut self) {
        self.active_task_id = self.tasks.first().map(|task| task.id.clone());
        self.selected_color_id = self
            .tasks
            .first()
            .and_then(|task| task.colors.first())
            .map(|color| color.id.clone());
    }

    fn persist(&mut self) -> Result<(), AppError> {
        let stored = StoredState {
            schema_version: SCHEMA_VERSION,
            tasks: self.tasks.clone(),
        };
        let blob = serde_json::to_string_pretty(&stored)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        self.backend.write(STORE_KEY, &blob)
    }
}

fn validate_palette(colors: &[Color]) -> Result<(), AppError> {
    if colors.is_empty() {
        return Err(AppError::invalid_input("at least one color is required"));
    }

    let mut seen = HashSet::new();
    for color in colors {
        if !seen.insert(color.id.as_str()) {
            return Err(AppError::invalid_input("duplicate color id"));
        }
    }

    Ok(())
}

fn validate_tasks(tasks: &[Task]) -> Result<(), AppError> {
    let mut task_ids = HashSet::new();
    for task in tasks {
        if !task_ids.insert(task.id.as_str()) {
            return Err(AppError::invalid_data("duplicate task id"));
        }
        validate_palette(&task.colors)
            .map_err(|_| AppError::invalid_data(format!("bad palette for {}", task.id)))?;

        for (key, color_id) in &task.grid_data {
            let valid = calendar::parse_cell_key(key)
                .is_some_and(|(year, month, day)| calendar::is_valid_day(year, month, day));
            if !valid {
                return Err(AppError::invalid_data(format!("bad cell key {key}")));
            }
            if task.color(color_id).is_none() {
                return Err(AppError::invalid_data(format!(
                    "cell {key} references unknown color {color_id}"
                )));
            }
        }
    }

    Ok(())
}

fn seed_tasks() -> Vec<Task> {
    let created_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    vec![
        Task {
            id: "task-1".to_string(),
            name: "Exercise".to_string(),
            icon: "💪".to_string(),
            colors: default_palette(),
            grid_data: Default::default(),
            created_at: created_at.clone(),
        },
        Task {
            id: "task-2".to_string(),
            name: "Study".to_string(),
            icon: "📚".to_string(),
            colors: default_palette(),
            grid_data: Default::default(),
            created_at,
        },
    ]
}
