// SPDX-FileCopyrightText: 2026 Modmail Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat-file implementation of the [`CounterStore`] trait.
//!
//! The last-issued ticket number lives in a single JSON record
//! (`{"ticket_number": N}`), read once at startup and rewritten after every
//! increment. A tokio mutex serializes increment-and-persist so concurrent
//! creations cannot observe or issue the same number.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use modmail_config::model::CounterConfig;
use modmail_core::error::ModmailError;
use modmail_core::traits::CounterStore;
use modmail_core::types::TicketNumber;

/// Persisted counter record layout.
#[derive(Debug, Serialize, Deserialize)]
struct CounterRecord {
    ticket_number: u64,
}

/// File-backed monotonic ticket-number store.
#[derive(Debug)]
pub struct FileCounterStore {
    path: PathBuf,
    /// Last issued number; the mutex spans the whole increment+persist
    /// sequence so issued numbers are strictly increasing.
    last: Mutex<u64>,
}

impl FileCounterStore {
    /// Opens the counter file named by the configuration, reading the last
    /// issued number. A missing file starts the counter at zero.
    pub async fn open(config: &CounterConfig) -> Result<Self, ModmailError> {
        let path = PathBuf::from(&config.path);

        let last = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let record: CounterRecord =
                    serde_json::from_str(&content).map_err(|e| ModmailError::Storage {
                        source: Box::new(e),
                    })?;
                record.ticket_number
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => {
                return Err(ModmailError::Storage {
                    source: Box::new(e),
                });
            }
        };

        debug!(path = %path.display(), last, "counter store opened");
        Ok(Self {
            path,
            last: Mutex::new(last),
        })
    }

    /// Writes the record via a temp file and rename, so a crash mid-write
    /// never leaves a truncated counter file.
    async fn persist(&self, value: u64) -> Result<(), ModmailError> {
        let record = CounterRecord {
            ticket_number: value,
        };
        let content = serde_json::to_string(&record).map_err(|e| ModmailError::Storage {
            source: Box::new(e),
        })?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, content.as_bytes())
            .await
            .map_err(|e| ModmailError::Storage {
                source: Box::new(e),
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| ModmailError::Storage {
                source: Box::new(e),
            })
    }
}

#[async_trait]
impl CounterStore for FileCounterStore {
    async fn next(&self) -> Result<TicketNumber, ModmailError> {
        let mut last = self.last.lock().await;
        let next = *last + 1;
        self.persist(next).await?;
        *last = next;
        debug!(number = next, "ticket number issued");
        Ok(TicketNumber(next))
    }

    async fn last_issued(&self) -> Result<u64, ModmailError> {
        Ok(*self.last.lock().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn config_in(dir: &tempfile::TempDir) -> CounterConfig {
        CounterConfig {
            path: dir
                .path()
                .join("ticket_counter.json")
                .to_string_lossy()
                .into_owned(),
        }
    }

    #[tokio::test]
    async fn missing_file_starts_at_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCounterStore::open(&config_in(&dir)).await.unwrap();
        assert_eq!(store.last_issued().await.unwrap(), 0);
        assert_eq!(store.next().await.unwrap(), TicketNumber(1));
    }

    #[tokio::test]
    async fn numbers_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);

        {
            let store = FileCounterStore::open(&config).await.unwrap();
            store.next().await.unwrap();
            store.next().await.unwrap();
            assert_eq!(store.next().await.unwrap(), TicketNumber(3));
        }

        let reopened = FileCounterStore::open(&config).await.unwrap();
        assert_eq!(reopened.last_issued().await.unwrap(), 3);
        assert_eq!(reopened.next().await.unwrap(), TicketNumber(4));
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        tokio::fs::write(&config.path, b"not json").await.unwrap();

        let err = FileCounterStore::open(&config).await.unwrap_err();
        assert!(matches!(err, ModmailError::Storage { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_strictly_increasing() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileCounterStore::open(&config_in(&dir)).await.unwrap());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move { store.next().await.unwrap() }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            let number = handle.await.unwrap();
            assert!(seen.insert(number), "issued numbers must be unique");
        }
        assert_eq!(seen.len(), 16);
        assert_eq!(store.last_issued().await.unwrap(), 16);

        // The persisted record reflects the final value.
        let content = tokio::fs::read_to_string(&config_in(&dir).path).await.unwrap();
        assert!(content.contains("16"));
    }
}
