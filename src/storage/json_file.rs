//! Whole-file JSON collections with atomic rewrites.
//!
//! Every save rewrites the complete collection: serialize to a temp file,
//! flush, fsync, rename over the target. The target file therefore never
//! holds a half-written collection. Last write wins; there is no journal,
//! no locking and no partial update.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;
use uuid::Uuid;

use crate::error::StorageError;

/// File name of the persisted company collection.
pub const COMPANIES_FILE: &str = "companies.json";

/// File name of the persisted alert collection.
pub const ALERTS_FILE: &str = "alerts.json";

/// JSON-file storage rooted at one data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `dir`.
    ///
    /// The directory itself is created on first save, not here, so opening
    /// a session never touches the filesystem until something changes.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path of one collection file.
    #[must_use]
    pub fn path_for(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Loads a collection, treating a missing file as empty.
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] when the file exists but cannot be read,
    /// [`StorageError::Corrupt`] when it holds unparseable JSON. Callers
    /// are expected to keep going with an empty collection on corruption.
    pub fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StorageError> {
        let path = self.path_for(file);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "collection file absent, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::Io { path, source: e }),
        };
        serde_json::from_str(&contents).map_err(|e| StorageError::Corrupt {
            path,
            message: e.to_string(),
        })
    }

    /// Saves a collection atomically.
    pub fn save<T: Serialize>(&self, file: &str, items: &[T]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let path = self.path_for(file);
        let mut writer = CollectionWriter::create(path)?;
        writer.write_items(items)?;
        writer.commit()?;

        debug!(path = %self.path_for(file).display(), count = items.len(), "collection saved");
        Ok(())
    }
}

/// Writes one collection file via write-to-temp-then-rename.
///
/// The temp file is removed on drop if the writer never committed.
struct CollectionWriter {
    temp_path: Option<PathBuf>,
    final_path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl CollectionWriter {
    fn create(final_path: PathBuf) -> Result<Self, StorageError> {
        let temp_path = final_path.with_extension(format!("json.tmp.{}", Uuid::new_v4()));
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| StorageError::Io {
                path: temp_path.clone(),
                source: e,
            })?;
        Ok(Self {
            temp_path: Some(temp_path),
            final_path,
            writer: Some(BufWriter::new(file)),
        })
    }

    fn write_items<T: Serialize>(&mut self, items: &[T]) -> Result<(), StorageError> {
        let writer = self.writer.as_mut().ok_or_else(|| already_consumed(&self.final_path))?;

        // Four-space indent, same shape the data files have always had.
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);
        items
            .serialize(&mut serializer)
            .map_err(|e| StorageError::Io {
                path: self.final_path.clone(),
                source: std::io::Error::new(ErrorKind::Other, e),
            })
    }

    /// Flush, fsync, rename. The rename is the commit point.
    fn commit(mut self) -> Result<(), StorageError> {
        let mut writer = self.writer.take().ok_or_else(|| already_consumed(&self.final_path))?;
        let temp_path = self.temp_path.take().ok_or_else(|| already_consumed(&self.final_path))?;

        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |e| StorageError::Io { path, source: e }
        };

        writer.flush().map_err(io_err(&temp_path))?;
        writer.get_ref().sync_all().map_err(io_err(&temp_path))?;
        fs::rename(&temp_path, &self.final_path).map_err(io_err(&self.final_path))?;
        Ok(())
    }
}

impl Drop for CollectionWriter {
    fn drop(&mut self) {
        // Best-effort cleanup when the write never committed.
        if let Some(ref temp_path) = self.temp_path {
            if temp_path.exists() {
                let _ = fs::remove_file(temp_path);
            }
        }
    }
}

fn already_consumed(path: &Path) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(ErrorKind::Other, "writer already consumed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        name: String,
        count: u32,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "alpha".to_string(),
                count: 1,
            },
            Row {
                name: "beta".to_string(),
                count: 2,
            },
        ]
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let loaded: Vec<Row> = store.load("absent.json").unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.save("rows.json", &rows()).unwrap();
        let loaded: Vec<Row> = store.load("rows.json").unwrap();
        assert_eq!(loaded, rows());
    }

    #[test]
    fn test_save_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("deep").join("data");
        let store = JsonFileStore::new(&nested);

        store.save("rows.json", &rows()).unwrap();
        assert!(nested.join("rows.json").exists());
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.save("rows.json", &rows()).unwrap();
        store.save("rows.json", &rows()).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["rows.json".to_string()]);
    }

    #[test]
    fn test_save_overwrites_whole_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.save("rows.json", &rows()).unwrap();
        let second = vec![Row {
            name: "only".to_string(),
            count: 9,
        }];
        store.save("rows.json", &second).unwrap();

        let loaded: Vec<Row> = store.load("rows.json").unwrap();
        assert_eq!(loaded, second);
    }

    #[test]
    fn test_saved_file_is_pretty_printed() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.save("rows.json", &rows()).unwrap();
        let contents = fs::read_to_string(store.path_for("rows.json")).unwrap();
        assert!(contents.contains("\n    "));
    }

    #[test]
    fn test_load_corrupt_file_is_distinct_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(store.path_for("rows.json"), "{not json").unwrap();

        let err = store.load::<Row>("rows.json").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
        assert!(format!("{err}").contains("rows.json"));
    }

    #[test]
    fn test_load_wrong_shape_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(store.path_for("rows.json"), "{\"name\": \"not a list\"}").unwrap();

        let err = store.load::<Row>("rows.json").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[test]
    fn test_empty_collection_saves_as_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.save::<Row>("rows.json", &[]).unwrap();
        let contents = fs::read_to_string(store.path_for("rows.json")).unwrap();
        assert_eq!(contents, "[]");

        let loaded: Vec<Row> = store.load("rows.json").unwrap();
        assert!(loaded.is_empty());
    }
}
