//! Flat-file user store.
//!
//! All users live in one pretty-printed JSON array. Every mutation reads the
//! whole document, changes it in memory and rewrites the whole document.
//!
//! Callers that modify the collection take [`UserStore::lock`] and use the
//! returned [`WriteGuard`] for both the read and the write, so no other writer
//! can interleave. Reads without the lock are safe because writes go through a
//! temp-file rename.
//!
//! ## Corrupt documents
//!
//! A document that cannot be parsed is treated as an empty collection so the
//! service keeps answering. The unreadable file is first renamed to
//! `users.json.corrupt-<unix seconds>` (with a `.N` suffix if that name is
//! taken); nothing is deleted. Only a lock holder renames: a lock-free reader
//! that sees a corrupt document takes the lock and reads again, since a writer
//! may have replaced the file in between.

mod atomic;
mod record;

pub use record::UserRecord;

use chrono::Utc;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs,
    io::AsyncWriteExt,
    sync::{Mutex, MutexGuard},
};
use tracing::{debug, error, info_span, warn, Instrument};

pub const USERS_FILE_NAME: &str = "users.json";
const EMPTY_DOCUMENT: &[u8] = b"[]";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize user records: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

enum Document {
    Records(Vec<UserRecord>),
    Corrupt(serde_json::Error),
}

/// Exclusive access to the document for a read-modify-write sequence.
#[derive(Debug)]
pub struct WriteGuard<'a> {
    store: &'a UserStore,
    _writer: MutexGuard<'a, ()>,
}

impl WriteGuard<'_> {
    /// Read every record, quarantining a corrupt document.
    ///
    /// # Errors
    /// Returns an error only for I/O failures.
    pub async fn load_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        match self.store.read_document().await? {
            Document::Records(records) => Ok(records),
            Document::Corrupt(err) => {
                error!("User store is not a valid record list, treating as empty: {err}");
                self.store.quarantine().await;
                Ok(Vec::new())
            }
        }
    }

    /// Replace the whole persisted collection with `records`.
    ///
    /// # Errors
    /// Returns an error if serialization or the atomic write fails.
    pub async fn save_all(&self, records: &[UserRecord]) -> Result<(), StoreError> {
        self.store.write_document(records).await
    }
}

#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    writer: Mutex<()>,
}

impl UserStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    /// Store backed by `<data_dir>/users.json`.
    #[must_use]
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(USERS_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize writers. Use the guard for both `load_all` and `save_all`.
    pub async fn lock(&self) -> WriteGuard<'_> {
        WriteGuard {
            store: self,
            _writer: self.writer.lock().await,
        }
    }

    /// Create the backing file with an empty collection if it does not exist.
    /// An existing file is never touched.
    ///
    /// # Errors
    /// Returns an error if the data directory or the file cannot be created.
    pub async fn ensure_initialized(&self) -> Result<(), StoreError> {
        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::io(parent, err))?;
        }

        let created = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .await;

        match created {
            Ok(mut file) => {
                file.write_all(EMPTY_DOCUMENT)
                    .await
                    .map_err(|err| StoreError::io(&self.path, err))?;
                file.flush()
                    .await
                    .map_err(|err| StoreError::io(&self.path, err))?;
                debug!(path = %self.path.display(), "Initialized empty user store");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(err) => Err(StoreError::io(&self.path, err)),
        }
    }

    /// Read every record, in insertion order, without taking the writer lock.
    ///
    /// # Errors
    /// Returns an error only for I/O failures. Unparseable content yields an
    /// empty collection after the file has been quarantined.
    pub async fn load_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        match self.read_document().await? {
            Document::Records(records) => Ok(records),
            Document::Corrupt(err) => {
                debug!("Corrupt read without the lock, checking again under it: {err}");
                self.lock().await.load_all().await
            }
        }
    }

    /// Replace the whole persisted collection with `records`.
    ///
    /// # Errors
    /// Returns an error if serialization or the atomic write fails.
    pub async fn save_all(&self, records: &[UserRecord]) -> Result<(), StoreError> {
        self.lock().await.save_all(records).await
    }

    async fn read_document(&self) -> Result<Document, StoreError> {
        let span = info_span!("store.load", store.path = %self.path.display());
        async {
            self.ensure_initialized().await?;

            let raw = fs::read_to_string(&self.path)
                .await
                .map_err(|err| StoreError::io(&self.path, err))?;

            if raw.trim().is_empty() {
                return Ok(Document::Records(Vec::new()));
            }

            Ok(match serde_json::from_str::<Vec<UserRecord>>(&raw) {
                Ok(records) => {
                    debug!(records = records.len(), "Loaded user records");
                    Document::Records(records)
                }
                Err(err) => Document::Corrupt(err),
            })
        }
        .instrument(span)
        .await
    }

    async fn write_document(&self, records: &[UserRecord]) -> Result<(), StoreError> {
        let span = info_span!(
            "store.save",
            store.path = %self.path.display(),
            records = records.len()
        );
        async {
            let document = serde_json::to_vec_pretty(records)?;
            atomic::atomic_write(&self.path, &document)
                .await
                .map_err(|err| StoreError::io(&self.path, err))
        }
        .instrument(span)
        .await
    }

    /// Whether the backing file can currently be read.
    pub async fn is_readable(&self) -> bool {
        match fs::metadata(&self.path).await {
            Ok(metadata) => metadata.is_file(),
            Err(err) => {
                debug!("User store metadata unavailable: {err}");
                false
            }
        }
    }

    // Caller holds the writer lock.
    async fn quarantine(&self) {
        let target = match self.quarantine_target().await {
            Ok(target) => target,
            Err(err) => {
                error!(
                    "Failed to pick a quarantine name for {}: {err}",
                    self.path.display()
                );
                return;
            }
        };

        match fs::rename(&self.path, &target).await {
            Ok(()) => warn!(
                "Moved unreadable user store to {}; starting from an empty collection",
                target.display()
            ),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => error!(
                "Failed to quarantine unreadable user store {}: {err}",
                self.path.display()
            ),
        }
    }

    /// First free `<file>.corrupt-<unix seconds>[.N]` next to the store.
    async fn quarantine_target(&self) -> std::io::Result<PathBuf> {
        let base = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        let stamp = Utc::now().timestamp();

        let mut attempt = 0_u32;
        loop {
            let mut name = base.clone();
            if attempt == 0 {
                name.push(format!(".corrupt-{stamp}"));
            } else {
                name.push(format!(".corrupt-{stamp}.{attempt}"));
            }
            let target = self.path.with_file_name(name);
            if !fs::try_exists(&target).await? {
                return Ok(target);
            }
            attempt += 1;
        }
    }
}
