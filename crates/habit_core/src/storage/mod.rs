use crate::error::AppError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

mod file_store;

pub use file_store::{FileStore, data_dir};

/// Minimal key-value contract the store persists through. Written data only
/// has to be readable again within the same process.
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, AppError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}

/// In-memory backend. Clones share the same entries, so a test can keep a
/// handle to inspect what the store wrote.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed<K: Into<String>, V: Into<String>>(&self, key: K, value: V) {
        self.entries.borrow_mut().insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
