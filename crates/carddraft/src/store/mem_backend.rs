use super::backend::DraftBackend;
use crate::error::{DraftError, Result};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;

/// In-memory storage backend for testing.
///
/// Uses `RefCell` for interior mutability since the draft subsystem is single-threaded.
/// This keeps the `DraftBackend` trait on `&self` without reaching for a lock.
#[derive(Default)]
pub struct MemBackend {
    content: RefCell<Option<String>>,
    writes: Cell<usize>,
    simulate_write_error: Cell<bool>,
    simulate_read_error: Cell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-seeded with raw file content, e.g. a corrupt or hand-edited file.
    pub fn with_content(content: &str) -> Self {
        let backend = Self::default();
        *backend.content.borrow_mut() = Some(content.to_string());
        backend
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.simulate_read_error.set(simulate);
    }

    /// Raw content as it would sit on disk.
    pub fn raw(&self) -> Option<String> {
        self.content.borrow().clone()
    }

    /// Number of successful writes, including removals.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl DraftBackend for MemBackend {
    fn read(&self) -> Result<Option<String>> {
        if self.simulate_read_error.get() {
            return Err(DraftError::Store("Simulated read error".to_string()));
        }
        Ok(self.content.borrow().clone())
    }

    fn write(&self, content: &str) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(DraftError::Store("Simulated write error".to_string()));
        }
        *self.content.borrow_mut() = Some(content.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(DraftError::Store("Simulated write error".to_string()));
        }
        *self.content.borrow_mut() = None;
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("memory://drafts.json")
    }
}
