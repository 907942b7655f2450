use crate::error::Result;
use std::path::PathBuf;

/// Abstract interface for raw draft-file I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while DraftStore handles the "what" (keying, staleness, validation).
pub trait DraftBackend {
    /// Read the raw backing content.
    /// Returns Ok(None) if nothing has been written yet.
    /// Returns Err only on actual I/O errors (permissions, disk failure).
    fn read(&self) -> Result<Option<String>>;

    /// Replace the backing content.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn write(&self, content: &str) -> Result<()>;

    /// Remove the backing content. Not an error if it doesn't exist.
    fn remove(&self) -> Result<()>;

    /// Where the drafts live. For FsBackend this is the real path, for MemBackend a virtual one.
    fn location(&self) -> PathBuf;
}
