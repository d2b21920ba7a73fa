mod task;

pub use task::{Color, Task, default_palette};
