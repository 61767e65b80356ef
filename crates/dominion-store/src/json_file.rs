//! File-backed kingdom store.
//!
//! Each kingdom is one pretty-printed JSON document named `<id>.json`
//! inside the data directory; its chain spawn history sits in
//! `history/<id>.json`. Writes go to a sibling temporary file first and
//! are renamed into place, so a crash mid-save leaves the previous document
//! intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use dominion_core::{Kingdom, KingdomStore, SpawnHistory, StoreError};
use dominion_types::KingdomId;

const HISTORY_DIR: &str = "history";

/// Kingdoms stored as JSON files in one directory.
#[derive(Debug, Clone)]
pub struct JsonFileKingdomStore {
    dir: PathBuf,
}

impl JsonFileKingdomStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(dir.join(HISTORY_DIR))?;
        debug!(dir = %dir.display(), "kingdom store opened");
        Ok(Self { dir })
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: KingdomId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn history_path_for(&self, id: KingdomId) -> PathBuf {
        self.dir.join(HISTORY_DIR).join(format!("{id}.json"))
    }

    /// Every stored kingdom. Unreadable documents are skipped with a
    /// warning.
    pub fn load_all(&self) -> Result<Vec<Kingdom>, StoreError> {
        let mut kingdoms = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match read_kingdom(&path) {
                Ok(kingdom) => kingdoms.push(kingdom),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable kingdom"),
            }
        }
        Ok(kingdoms)
    }
}

fn read_kingdom(path: &Path) -> Result<Kingdom, StoreError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Write `contents` to a temporary sibling of `path`, then rename it over.
fn write_atomically(path: &Path, contents: &str) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl KingdomStore for JsonFileKingdomStore {
    fn find_by_id(&self, id: KingdomId) -> Result<Option<Kingdom>, StoreError> {
        match read_kingdom(&self.path_for(id)) {
            Ok(kingdom) => Ok(Some(kingdom)),
            Err(StoreError::Io { source }) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Kingdom>, StoreError> {
        Ok(self.load_all()?.into_iter().find(|k| k.name() == name))
    }

    fn save(&mut self, kingdom: &Kingdom) -> Result<(), StoreError> {
        let path = self.path_for(kingdom.id());
        write_atomically(&path, &serde_json::to_string_pretty(kingdom)?)?;
        debug!(kingdom = %kingdom.id(), path = %path.display(), "kingdom saved");
        Ok(())
    }

    fn exists(&self, id: KingdomId) -> Result<bool, StoreError> {
        Ok(self.path_for(id).try_exists()?)
    }

    fn find_spawn_history(&self, id: KingdomId) -> Result<Option<SpawnHistory>, StoreError> {
        match fs::read_to_string(self.history_path_for(id)) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_spawn_history(
        &mut self,
        id: KingdomId,
        history: &SpawnHistory,
    ) -> Result<(), StoreError> {
        let path = self.history_path_for(id);
        write_atomically(&path, &serde_json::to_string_pretty(history)?)?;
        debug!(kingdom = %id, turns_played = history.turns_played, "spawn history saved");
        Ok(())
    }
}
