use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One selectable marking state in a task's palette. The display color is
/// derived as hsl(hue, 70%, 50%) by the rendering layer and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub id: String,
    pub name: String,
    pub hue: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub colors: Vec<Color>,
    #[serde(default)]
    pub grid_data: HashMap<String, String>,
    pub created_at: String,
}

impl Task {
    pub fn color(&self, color_id: &str) -> Option<&Color> {
        self.colors.iter().find(|color| color.id == color_id)
    }
}

pub fn default_palette() -> Vec<Color> {
    vec![
        Color {
            id: "done".to_string(),
            name: "Done".to_string(),
            hue: 142,
        },
        Color {
            id: "partial".to_string(),
            name: "Partial".to_string(),
            hue: 38,
        },
        Color {
            id: "missed".to_string(),
            name: "Missed".to_string(),
            hue: 0,
        },
    ]
}
