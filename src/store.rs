//! On-disk upload directory
//!
//! Each accepted upload is stored as `<id>.dcm`. The fingerprint registry is
//! persisted next to the uploads as `hash_map.json`, an object mapping hex
//! fingerprints to upload identifiers.

use crate::fingerprint::Fingerprint;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const SNAPSHOT_FILE_NAME: &str = "hash_map.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot serialize registry snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

trait IoContext<T> {
    fn at(self, path: &Path) -> Result<T, StoreError>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T, StoreError> {
        self.map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Open `dir`, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).at(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn file_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.dcm"))
    }

    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE_NAME)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.file_path(id).is_file()
    }

    pub fn write(&self, id: &str, bytes: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.file_path(id);
        fs::write(&path, bytes).at(&path)?;
        debug!(path = %path.display(), len = bytes.len(), "stored upload");
        Ok(path)
    }

    pub fn read(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.file_path(id);
        fs::read(&path).at(&path)
    }

    /// Identifiers of all stored uploads, sorted; the snapshot is not an upload
    pub fn ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir).at(&self.dir)? {
            let path = entry.at(&self.dir)?.path();
            if path.is_file()
                && path.extension().is_some_and(|ext| ext == "dcm")
                && let Some(id) = path.file_stem().and_then(|stem| stem.to_str())
            {
                ids.push(id.to_string());
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Remove a stored upload; a missing file is not an error
    pub fn remove(&self, id: &str) -> Result<(), StoreError> {
        let path = self.file_path(id);
        match fs::remove_file(&path) {
            Err(source) if source.kind() != io::ErrorKind::NotFound => {
                Err(StoreError::Io { path, source })
            }
            _ => Ok(()),
        }
    }

    /// Load the persisted registry.
    ///
    /// A missing snapshot yields an empty map. So does an unreadable one,
    /// with a warning, and entries with malformed fingerprints are skipped.
    pub fn load_snapshot(&self) -> Result<HashMap<Fingerprint, String>, StoreError> {
        let path = self.snapshot_path();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(StoreError::Io { path, source: e }),
        };

        let raw: HashMap<String, String> = match serde_json::from_str(&text) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable registry snapshot");
                return Ok(HashMap::new());
            }
        };

        Ok(raw
            .into_iter()
            .filter_map(|(hex, id)| match hex.parse::<Fingerprint>() {
                Ok(fp) => Some((fp, id)),
                Err(e) => {
                    warn!(error = %e, "skipping registry entry");
                    None
                }
            })
            .collect())
    }

    /// Persist the registry, replacing the previous snapshot atomically
    pub fn save_snapshot(&self, entries: &HashMap<Fingerprint, String>) -> Result<(), StoreError> {
        let path = self.snapshot_path();
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(entries)?;
        fs::write(&tmp, json).at(&tmp)?;
        fs::rename(&tmp, &path).at(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint_bytes;

    #[test]
    fn test_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path().join("uploads")).unwrap();

        let path = store.write("abc", b"payload").unwrap();
        assert_eq!(path, dir.path().join("uploads").join("abc.dcm"));
        assert!(store.contains("abc"));
        assert_eq!(store.read("abc").unwrap(), b"payload");

        store.remove("abc").unwrap();
        assert!(!store.contains("abc"));
        store.remove("abc").unwrap();
    }

    #[test]
    fn test_ids_skip_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path()).unwrap();
        assert!(store.ids().unwrap().is_empty());

        store.write("b", b"2").unwrap();
        store.write("a", b"1").unwrap();
        store.save_snapshot(&HashMap::new()).unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        assert_eq!(store.ids().unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path()).unwrap();
        assert!(store.load_snapshot().unwrap().is_empty());

        let entries = HashMap::from([
            (fingerprint_bytes(b"a"), "id-a".to_string()),
            (fingerprint_bytes(b"b"), "id-b".to_string()),
        ]);
        store.save_snapshot(&entries).unwrap();
        assert_eq!(store.load_snapshot().unwrap(), entries);

        let raw = fs::read(store.snapshot_path()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(json[fingerprint_bytes(b"a").to_string()], "id-a");
    }

    #[test]
    fn test_corrupt_snapshot_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::open(dir.path()).unwrap();

        fs::write(store.snapshot_path(), b"{not json").unwrap();
        assert!(store.load_snapshot().unwrap().is_empty());

        fs::write(store.snapshot_path(), br#"{"beef": "short-key"}"#).unwrap();
        assert!(store.load_snapshot().unwrap().is_empty());
    }
}
