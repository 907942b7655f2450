//! # Storage Layer
//!
//! Drafts for every template live in a single JSON document, one entry per template key.
//! The store is split the same way on both sides of the I/O boundary:
//!
//! 1. [`backend::DraftBackend`]: raw document I/O (read, atomic write, remove).
//! 2. [`draft_store::DraftStore`]: keying, staleness, validation and the in-memory mapping.
//!
//! ## Lifecycle
//!
//! - **Lazy load**: the document is read on first access and then held for the process lifetime.
//! - **Write-through**: every `put`/`delete` flushes the whole mapping before returning. Mutations
//!   are bounded by the autosave interval and payloads are small, so there's no write-behind.
//! - **Atomic replace**: writes go to a temp file and are renamed over the target, so the document
//!   on disk is always either the old mapping or the new one.
//! - **Empty means absent**: flushing an empty mapping removes the document.
//!
//! ## Failure Model
//!
//! Nothing in this layer may take the host down:
//!
//! - Missing document → empty store.
//! - Unreadable or unparseable document → logged, empty store.
//! - Malformed entry → treated as absent and removed when its key is looked up.
//! - Failed flush → returned to the caller, in-memory state kept; the next flush retries.
//!
//! ## Storage Layout
//!
//! ```text
//! <profile dir>/
//! └── add_cards_autosave.json   # { "<template>": { last_saved, fields, tags }, ... }
//! ```
//!
//! ## Implementations
//!
//! - [`FileDraftStore`]: production, backed by [`fs_backend::FsBackend`].
//! - [`InMemoryDraftStore`]: for testing logic without filesystem I/O.

use crate::config::DraftConfig;
use std::path::Path;

pub mod backend;
pub mod draft_store;
pub mod fs_backend;
pub mod mem_backend;

pub use draft_store::DraftStore;

pub type FileDraftStore = DraftStore<fs_backend::FsBackend>;
pub type InMemoryDraftStore = DraftStore<mem_backend::MemBackend>;

impl FileDraftStore {
    /// Store backed by the configured file inside `profile_dir`. Nothing is read until first use.
    pub fn open(profile_dir: &Path, config: &DraftConfig) -> Self {
        DraftStore::with_backend(fs_backend::FsBackend::new(config.backing_path(profile_dir)))
    }
}

impl Default for InMemoryDraftStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        DraftStore::with_backend(mem_backend::MemBackend::new())
    }
}
