use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use uuid::Uuid;

use crate::error::{Error, Result};

/// The file the window is persisted to between runs.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Makes sure the state file exists, creating an empty one if not.
    /// A location we cannot write to is caught here rather than at
    /// shutdown.
    pub fn open_or_create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match fs::metadata(&path) {
            Ok(_) => (),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                File::create(&path).map_err(|e| Error::storage(&path, e))?;
                info!("Created empty state file {}", path.display());
            }
            Err(e) => return Err(Error::storage(&path, e)),
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|e| Error::storage(&self.path, e))
    }

    /// Writes a sibling temp file and renames it over the target, so a
    /// crash mid-write leaves the previous state intact.
    pub fn save(&self, bytes: &[u8]) -> Result<()> {
        let tmp = self.temp_path();
        if let Err(e) = write_synced(&tmp, bytes) {
            let _ = fs::remove_file(&tmp);
            return Err(Error::storage(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(Error::storage(&self.path, e));
        }
        debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp_name = format!(".{}.{}.tmp", file_name, Uuid::new_v4().to_simple());
        self.path.with_file_name(tmp_name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
