use std::{
    ffi::OsString,
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use fs2::FileExt;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{ser::PrettyFormatter, Map, Value};
use tempfile::NamedTempFile;
use crate::errors::{StoreError, StoreResult};

pub const SCHEMA_VERSION: u32 = 1;

/// One collection: record key to opaque record, in insertion order.
pub type Records = Map<String, Value>;

/// Whole-collection persistence. Every `load` reads the full document and
/// every `save` replaces it; there are no partial reads or writes.
pub trait Store: Send + Sync {
    /// Creates the document as an empty collection if it does not exist yet.
    fn initialize(&self) -> StoreResult<()>;

    fn load(&self) -> StoreResult<Records>;

    fn save(&self, records: &Records) -> StoreResult<()>;

    /// Held by callers for the span of one load-mutate-save round trip.
    fn write_guard(&self) -> StoreResult<WriteGuard>;

    fn location(&self) -> &Path;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteDiscipline {
    /// Overlapping writers are not excluded; the last full save wins.
    LastWriteWins,
    /// Writers take an exclusive lock on `<document>.lock` first.
    SingleWriter,
}

/// Releases the collection lock (if any) when dropped.
#[derive(Debug)]
pub struct WriteGuard {
    _lock: Option<File>,
}

impl WriteGuard {
    pub fn unlocked() -> Self {
        Self { _lock: None }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CollectionDocument {
    #[serde(default = "current_schema_version")]
    schema_version: u32,
    #[serde(default)]
    records: Records,
}

fn current_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    discipline: WriteDiscipline,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>, discipline: WriteDiscipline) -> Self {
        Self {
            path: path.into(),
            discipline,
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl Store for JsonStore {
    fn initialize(&self) -> StoreResult<()> {
        fs::create_dir_all(self.parent_dir()).map_err(|e| self.io_error(e))?;

        // create_new keeps an existing collection untouched
        match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(mut file) => {
                file.write_all(b"{}").map_err(|e| self.io_error(e))?;
                tracing::info!("Initialized empty collection at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!("Collection already present at {}", self.path.display());
                Ok(())
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn load(&self) -> StoreResult<Records> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            tracing::error!("Failed to read collection {}: {}", self.path.display(), e);
            self.io_error(e)
        })?;

        let document: CollectionDocument = serde_json::from_str(&raw).map_err(|e| {
            tracing::error!("Failed to parse collection {}: {}", self.path.display(), e);
            StoreError::Format {
                path: self.path.clone(),
                source: e,
            }
        })?;

        if document.schema_version > SCHEMA_VERSION {
            return Err(StoreError::UnsupportedVersion {
                path: self.path.clone(),
                found: document.schema_version,
                supported: SCHEMA_VERSION,
            });
        }

        tracing::trace!("Loaded {} records from {}", document.records.len(), self.path.display());
        Ok(document.records)
    }

    fn save(&self, records: &Records) -> StoreResult<()> {
        let document = CollectionDocument {
            schema_version: SCHEMA_VERSION,
            records: records.clone(),
        };

        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        document.serialize(&mut serializer).map_err(|e| StoreError::Format {
            path: self.path.clone(),
            source: e,
        })?;

        // Write beside the target and rename over it, so a failed save
        // leaves the previous document in place.
        let mut temp = NamedTempFile::new_in(self.parent_dir()).map_err(|e| self.io_error(e))?;
        temp.write_all(&buffer).map_err(|e| self.io_error(e))?;
        temp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        temp.persist(&self.path).map_err(|e| {
            tracing::error!("Failed to replace collection {}: {}", self.path.display(), e.error);
            self.io_error(e.error)
        })?;

        tracing::debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn write_guard(&self) -> StoreResult<WriteGuard> {
        if self.discipline == WriteDiscipline::LastWriteWins {
            return Ok(WriteGuard::unlocked());
        }

        let lock_path = self.lock_path();
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StoreError::Lock {
                path: lock_path.clone(),
                source: e,
            })?;

        // Blocks while another writer holds the collection
        lock_file.lock_exclusive().map_err(|e| StoreError::Lock {
            path: lock_path.clone(),
            source: e,
        })?;

        tracing::trace!("Acquired write lock {}", lock_path.display());
        Ok(WriteGuard {
            _lock: Some(lock_file),
        })
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// Decodes one opaque record into its typed form.
pub fn decode_record<T: DeserializeOwned>(store: &dyn Store, key: &str, value: Value) -> StoreResult<T> {
    serde_json::from_value(value).map_err(|e| StoreError::Record {
        path: store.location().to_path_buf(),
        key: key.to_string(),
        source: e,
    })
}

pub fn encode_record<T: Serialize>(store: &dyn Store, key: &str, record: &T) -> StoreResult<Value> {
    serde_json::to_value(record).map_err(|e| StoreError::Record {
        path: store.location().to_path_buf(),
        key: key.to_string(),
        source: e,
    })
}
