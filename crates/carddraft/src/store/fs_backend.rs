use super::backend::DraftBackend;
use crate::error::{DraftError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Filesystem backend: one JSON file inside the user's profile directory.
pub struct FsBackend {
    path: PathBuf,
}

impl FsBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn parent_dir(&self) -> Result<PathBuf> {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => Ok(p.to_path_buf()),
            Some(_) => Ok(PathBuf::from(".")),
            None => Err(DraftError::Store(format!(
                "Backing path has no parent directory: {}",
                self.path.display()
            ))),
        }
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(DraftError::Io)?;
        }
        Ok(())
    }
}

impl DraftBackend for FsBackend {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DraftError::Io(e)),
        }
    }

    fn write(&self, content: &str) -> Result<()> {
        let dir = self.parent_dir()?;
        self.ensure_dir(&dir)?;

        // Atomic write: a crash mid-write leaves the previous file intact.
        let tmp_path = dir.join(format!(".drafts-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_path, content).map_err(DraftError::Io)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(DraftError::Io(e));
        }
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DraftError::Io(e)),
        }
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}
