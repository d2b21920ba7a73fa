pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod grid;
pub mod model;
pub mod stats;
pub mod storage;
pub mod store;
