//! Durable seen-record store backed by an append-only MessagePack log.
//!
//! Each save appends one length-prefixed record; on open the log is folded
//! by external key so the newest stamp per key wins. `compact` rewrites the
//! log down to the live set through an atomic rename.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::core::{Result, SyncError};
use crate::ledger::{SeenRecord, SeenStore};

pub struct FileSeenStore {
    path: PathBuf,
    writer: BufWriter<File>,
    records: BTreeMap<String, SeenRecord>,
}

impl FileSeenStore {
    /// Open (or create) the log at `path` and fold its records by key.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SyncError::StorageError(format!("Failed to create seen log directory: {}", e))
            })?;
        }

        let mut records = BTreeMap::new();
        if path.exists() {
            let file = File::open(&path)
                .map_err(|e| SyncError::StorageError(format!("Failed to open seen log: {}", e)))?;
            let mut reader = BufReader::new(file);
            loop {
                let mut len_bytes = [0u8; 4];
                match reader.read_exact(&mut len_bytes) {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                    Err(e) => {
                        return Err(SyncError::StorageError(format!(
                            "Failed to read seen log: {}",
                            e
                        )));
                    }
                }
                let len = u32::from_le_bytes(len_bytes) as usize;
                let mut data = vec![0u8; len];
                reader.read_exact(&mut data).map_err(|e| {
                    SyncError::StorageError(format!("Failed to read seen log: {}", e))
                })?;
                let record: SeenRecord = rmp_serde::from_slice(&data).map_err(|e| {
                    SyncError::StorageError(format!("Failed to deserialize seen record: {}", e))
                })?;
                records.insert(record.external_key.clone(), record);
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| SyncError::StorageError(format!("Failed to open seen log: {}", e)))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, external_key: &str) -> Option<&SeenRecord> {
        self.records.get(external_key)
    }

    fn write_framed<W: Write>(writer: &mut W, record: &SeenRecord) -> Result<()> {
        let serialized = rmp_serde::to_vec(record).map_err(|e| {
            SyncError::StorageError(format!("Failed to serialize seen record: {}", e))
        })?;
        let len = serialized.len() as u32;
        writer
            .write_all(&len.to_le_bytes())
            .map_err(|e| SyncError::StorageError(format!("Failed to write seen log: {}", e)))?;
        writer
            .write_all(&serialized)
            .map_err(|e| SyncError::StorageError(format!("Failed to write seen log: {}", e)))?;
        Ok(())
    }

    /// Rewrite the log down to the live record per key.
    ///
    /// Written to a temp file in the log's directory and renamed over the
    /// log, so a crash mid-compaction leaves the old log intact. The engine
    /// never calls this; operators bounding log growth do.
    pub fn compact(&mut self) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
            SyncError::StorageError(format!("Failed to create compaction file: {}", e))
        })?;
        for record in self.records.values() {
            Self::write_framed(&mut tmp, record)?;
        }
        tmp.flush()
            .map_err(|e| SyncError::StorageError(format!("Failed to flush compaction: {}", e)))?;
        tmp.persist(&self.path)
            .map_err(|e| SyncError::StorageError(format!("Failed to replace seen log: {}", e)))?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| SyncError::StorageError(format!("Failed to reopen seen log: {}", e)))?;
        self.writer = BufWriter::new(file);
        Ok(())
    }
}

impl SeenStore for FileSeenStore {
    fn save(&mut self, record: SeenRecord) -> Result<()> {
        Self::write_framed(&mut self.writer, &record)?;
        self.writer
            .flush()
            .map_err(|e| SyncError::StorageError(format!("Failed to flush seen log: {}", e)))?;
        self.records.insert(record.external_key.clone(), record);
        Ok(())
    }

    fn find_stale(
        &self,
        stamp: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<SeenRecord>> {
        Ok(self
            .records
            .values()
            .filter(|record| record.stamp != stamp)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
