//! Durable chunk storage for in-flight recordings
//!
//! Each recording is assembled into an append-only file under the buffer
//! directory, keyed by filename. An in-memory ordered fragment list is kept
//! alongside the file for diagnostics and replay. All access to a given
//! filename is serialized through a per-filename mutex; different filenames
//! never contend with each other.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// A single received fragment, retained in memory for diagnostics/replay.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Arrival sequence number, starting at 0
    pub sequence: u64,
    /// Opaque media bytes as delivered by the transport
    pub bytes: Vec<u8>,
}

/// Receipt for an accepted fragment: its assigned sequence number and the
/// buffer's running byte total. Cheap to return; the fragment list itself is
/// only cloned for the diagnostics endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ChunkReceipt {
    pub sequence: u64,
    pub total_bytes: u64,
}

/// Per-recording buffer bookkeeping, guarded by its own mutex.
#[derive(Debug)]
struct BufferEntry {
    path: PathBuf,
    fragments: Vec<Fragment>,
    total_bytes: u64,
}

/// Append-only local buffer store for recordings in flight.
pub struct ChunkStore {
    buffer_dir: PathBuf,
    buffers: RwLock<HashMap<String, Arc<Mutex<BufferEntry>>>>,
}

impl ChunkStore {
    /// Create a store rooted at `buffer_dir`, creating the directory if needed.
    pub async fn new(buffer_dir: impl Into<PathBuf>) -> Result<Self> {
        let buffer_dir = buffer_dir.into();
        fs::create_dir_all(&buffer_dir).await?;

        info!("Chunk store initialized at {:?}", buffer_dir);

        Ok(Self {
            buffer_dir,
            buffers: RwLock::new(HashMap::new()),
        })
    }

    /// Get the buffer entry for `filename`, creating it on first use.
    async fn entry(&self, filename: &str) -> Arc<Mutex<BufferEntry>> {
        {
            let buffers = self.buffers.read().await;
            if let Some(entry) = buffers.get(filename) {
                return Arc::clone(entry);
            }
        }

        let mut buffers = self.buffers.write().await;
        Arc::clone(buffers.entry(filename.to_string()).or_insert_with(|| {
            Arc::new(Mutex::new(BufferEntry {
                path: self.buffer_dir.join(filename),
                fragments: Vec::new(),
                total_bytes: 0,
            }))
        }))
    }

    /// Look up the buffer entry for `filename` without creating one.
    async fn existing_entry(&self, filename: &str) -> Result<Arc<Mutex<BufferEntry>>> {
        let buffers = self.buffers.read().await;
        buffers
            .get(filename)
            .cloned()
            .ok_or_else(|| Error::NotFound(filename.to_string()))
    }

    /// Append `bytes` to the end of the recording's buffer, opening it on
    /// first use, and return the fragment's receipt. A write failure is
    /// returned to the caller for logging but leaves the entry usable, so
    /// later chunks still attempt to append.
    pub async fn append_chunk(&self, filename: &str, bytes: Vec<u8>) -> Result<ChunkReceipt> {
        let entry = self.entry(filename).await;
        let mut entry = entry.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&entry.path)
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        let sequence = entry.fragments.len() as u64;
        entry.total_bytes += bytes.len() as u64;
        entry.fragments.push(Fragment { sequence, bytes });

        Ok(ChunkReceipt {
            sequence,
            total_bytes: entry.total_bytes,
        })
    }

    /// Read the full assembled byte sequence for a recording.
    pub async fn read_all(&self, filename: &str) -> Result<Vec<u8>> {
        let entry = self.existing_entry(filename).await?;
        let entry = entry.lock().await;

        match fs::read(&entry.path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::NotFound(filename.to_string()))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Current buffer length in bytes, without loading the contents.
    pub async fn size_of(&self, filename: &str) -> Result<u64> {
        let entry = self.existing_entry(filename).await?;
        let entry = entry.lock().await;

        match fs::metadata(&entry.path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::NotFound(filename.to_string()))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Remove the local buffer. Idempotent: deleting a recording that has no
    /// buffer is logged, not an error.
    pub async fn delete(&self, filename: &str) -> Result<()> {
        let entry = {
            let mut buffers = self.buffers.write().await;
            buffers.remove(filename)
        };

        let Some(entry) = entry else {
            info!("No buffer to delete for {}", filename);
            return Ok(());
        };

        let entry = entry.lock().await;
        match fs::remove_file(&entry.path).await {
            Ok(()) => {
                info!("Deleted buffer for {}", filename);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Buffer file already gone for {}", filename);
                Ok(())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Ordered fragment list received so far, for diagnostics/replay.
    pub async fn fragments(&self, filename: &str) -> Vec<Fragment> {
        match self.existing_entry(filename).await {
            Ok(entry) => entry.lock().await.fragments.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Accumulated byte count as tracked by the in-memory bookkeeping.
    pub async fn tracked_bytes(&self, filename: &str) -> u64 {
        match self.existing_entry(filename).await {
            Ok(entry) => entry.lock().await.total_bytes,
            Err(_) => 0,
        }
    }
}
