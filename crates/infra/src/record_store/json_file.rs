use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use super::r#trait::{ChangeSet, Collection, RecordStore, StoreError};

type Document = BTreeMap<String, Vec<JsonValue>>;

/// Record store backed by a single JSON document on disk.
///
/// The file holds `{ "<collection>": [records...] }`. Keys this build does not
/// know about are read and written back untouched.
///
/// Commits write a sibling temp file, flush it, rename it over the original
/// and flush the directory. The in-memory copy is only replaced after the rename succeeded,
/// so a failed commit leaves both the file and later reads unchanged.
#[derive(Debug)]
pub struct JsonFileRecordStore {
    path: PathBuf,
    document: RwLock<Document>,
}

impl JsonFileRecordStore {
    /// Open (or lazily create) the document at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = if path.exists() {
            let raw = fs::read(&path)?;
            if raw.iter().all(u8::is_ascii_whitespace) {
                Document::new()
            } else {
                serde_json::from_slice::<Document>(&raw).map_err(|e| {
                    StoreError::Serialization(format!("{}: {e}", path.display()))
                })?
            }
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            Document::new()
        };

        tracing::debug!(path = %path.display(), collections = document.len(), "opened record store");

        Ok(Self {
            path,
            document: RwLock::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_document(&self, document: &Document) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        sync_dir(self.directory())?;
        Ok(())
    }

    fn directory(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }
}

/// Flush a directory entry so a rename inside it survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), StoreError> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), StoreError> {
    Ok(())
}

impl RecordStore for JsonFileRecordStore {
    fn get(&self, collection: Collection) -> Result<Vec<JsonValue>, StoreError> {
        let document = self
            .document
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(document
            .get(collection.as_str())
            .cloned()
            .unwrap_or_default())
    }

    fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut document = self
            .document
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let mut next = document.clone();
        for (collection, records) in changes.into_writes() {
            next.insert(collection.as_str().to_string(), records);
        }

        self.write_document(&next)?;
        *document = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("pitstop-{}", uuid::Uuid::now_v7()))
            .join(name)
    }

    #[test]
    fn records_survive_reopen() {
        let path = scratch_path("shop.json");
        {
            let store = JsonFileRecordStore::open(&path).unwrap();
            let mut changes = ChangeSet::new();
            changes
                .put(Collection::Customers, vec![json!({"id": "c1", "name": "Sam"})])
                .put(Collection::Counters, vec![json!({"id": "visits", "value": 3})]);
            store.commit(changes).unwrap();
        }

        let reopened = JsonFileRecordStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(Collection::Customers).unwrap(),
            vec![json!({"id": "c1", "name": "Sam"})]
        );
        assert_eq!(
            reopened.get(Collection::Counters).unwrap()[0]["value"],
            json!(3)
        );
        assert!(!reopened.temp_path().exists());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn directory_of_a_bare_file_name_is_the_working_directory() {
        let store = JsonFileRecordStore {
            path: PathBuf::from("shop.json"),
            document: RwLock::new(Document::new()),
        };
        assert_eq!(store.directory(), Path::new("."));

        let nested = scratch_path("shop.json");
        let store = JsonFileRecordStore::open(&nested).unwrap();
        assert_eq!(store.directory(), nested.parent().unwrap());
        sync_dir(store.directory()).unwrap();

        let _ = fs::remove_dir_all(nested.parent().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn syncing_a_missing_directory_fails() {
        let missing = scratch_path("gone");
        assert!(matches!(sync_dir(&missing), Err(StoreError::Io(_))));
    }

    #[test]
    fn unknown_keys_are_preserved() {
        let path = scratch_path("shop.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"salesmen": [{"name": "Ali"}], "visits": []}"#).unwrap();

        let store = JsonFileRecordStore::open(&path).unwrap();
        store
            .put(Collection::Visits, vec![json!({"id": "00001"})])
            .unwrap();

        let raw: JsonValue = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["salesmen"][0]["name"], json!("Ali"));
        assert_eq!(raw["visits"][0]["id"], json!("00001"));

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn failed_write_leaves_reads_unchanged() {
        let path = scratch_path("shop.json");
        let store = JsonFileRecordStore::open(&path).unwrap();
        store
            .put(Collection::Vendors, vec![json!({"id": "v1"})])
            .unwrap();

        // A directory where the temp file should go makes the write fail.
        fs::create_dir_all(store.temp_path()).unwrap();
        let err = store
            .put(Collection::Vendors, vec![json!({"id": "v2"})])
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(
            store.get(Collection::Vendors).unwrap(),
            vec![json!({"id": "v1"})]
        );

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
