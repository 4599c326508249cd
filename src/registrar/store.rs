mod snapshot;

use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::info;
use tempfile::NamedTempFile;

pub use snapshot::Snapshot;

use super::err::StoreError;
use super::AppState;

/// 以单个 json 文件保存全部状态
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved state; `None` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<AppState>, StoreError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;
        let state = AppState::from_snapshot(snapshot)?;
        info!("state loaded from {}", self.path.display());
        Ok(Some(state))
    }

    /// Write the state to a temporary file next to the target, then move it
    /// into place.
    pub fn save(&self, state: &AppState) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        // create the data directory if it doesn't exist
        fs::create_dir_all(&parent)?;

        let tmp = NamedTempFile::new_in(&parent)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, &state.to_snapshot())?;
            writer.flush()?;
        }
        tmp.persist(&self.path).map_err(|e| e.error)?;
        info!("state saved to {}", self.path.display());
        Ok(())
    }
}
