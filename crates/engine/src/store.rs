use crate::collaborators::{DisputeStore, UpdateOutcome};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redress_protocol::{Dispute, DisputeStatus};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory dispute store.
///
/// The reference implementation of the conditional-write contract; used by
/// tests and as the base of the JSON file store.
#[derive(Debug, Default)]
pub struct MemoryDisputeStore {
    disputes: Mutex<HashMap<Uuid, Dispute>>,
}

impl MemoryDisputeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_map<T>(&self, f: impl FnOnce(&mut HashMap<Uuid, Dispute>) -> T) -> Result<T> {
        let mut map = self
            .disputes
            .lock()
            .map_err(|_| EngineError::Store("dispute store lock poisoned".to_string()))?;
        Ok(f(&mut map))
    }

    fn snapshot(&self) -> Result<Vec<Dispute>> {
        self.with_map(|map| map.values().cloned().collect())
    }
}

#[async_trait]
impl DisputeStore for MemoryDisputeStore {
    async fn insert(&self, dispute: Dispute) -> Result<()> {
        self.with_map(|map| {
            map.insert(dispute.id, dispute);
        })
    }

    async fn get(&self, id: Uuid) -> Result<Option<Dispute>> {
        self.with_map(|map| map.get(&id).cloned())
    }

    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Dispute>> {
        self.with_map(|map| {
            let mut found: Vec<Dispute> = map
                .values()
                .filter(|d| d.client_id == client_id)
                .cloned()
                .collect();
            found.sort_by_key(|d| d.created_at);
            found
        })
    }

    async fn list_escalation_candidates(&self, now: DateTime<Utc>) -> Result<Vec<Dispute>> {
        self.with_map(|map| {
            let mut due: Vec<Dispute> = map
                .values()
                .filter(|d| d.escalation_due(now))
                .cloned()
                .collect();
            due.sort_by_key(|d| d.escalation_ready_at);
            due
        })
    }

    async fn update_if_status(
        &self,
        dispute: Dispute,
        expected: DisputeStatus,
    ) -> Result<UpdateOutcome> {
        self.with_map(|map| match map.get(&dispute.id) {
            Some(current) if current.status == expected => {
                map.insert(dispute.id, dispute);
                UpdateOutcome::Applied
            }
            Some(current) => UpdateOutcome::StaleStatus(current.status),
            // Insert-if-absent keeps the write idempotent for callers that
            // retried a partially applied batch.
            None => {
                map.insert(dispute.id, dispute);
                UpdateOutcome::Applied
            }
        })
    }
}

/// JSON-file-backed dispute store.
///
/// Loads the whole map at open, rewrites the file through an atomic rename
/// after every mutation. Suitable for the CLI and small books of business,
/// not for concurrent processes.
#[derive(Debug)]
pub struct JsonFileStore {
    inner: MemoryDisputeStore,
    path: PathBuf,
}

impl JsonFileStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = MemoryDisputeStore::new();
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let disputes: Vec<Dispute> = serde_json::from_str(&raw)?;
                log::info!("Loaded {} dispute(s) from {:?}", disputes.len(), path);
                inner.with_map(|map| {
                    for dispute in disputes {
                        map.insert(dispute.id, dispute);
                    }
                })?;
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Dispute store {:?} does not exist yet; starting empty", path);
            }
            Err(err) => return Err(err.into()),
        }
        Ok(Self { inner, path })
    }

    async fn persist(&self) -> Result<()> {
        let mut disputes = self.inner.snapshot()?;
        disputes.sort_by_key(|d| (d.created_at, d.id));
        let raw = serde_json::to_string_pretty(&disputes)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &raw).await?;
        if let Err(err) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }
}

#[async_trait]
impl DisputeStore for JsonFileStore {
    async fn insert(&self, dispute: Dispute) -> Result<()> {
        self.inner.insert(dispute).await?;
        self.persist().await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Dispute>> {
        self.inner.get(id).await
    }

    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Dispute>> {
        self.inner.list_by_client(client_id).await
    }

    async fn list_escalation_candidates(&self, now: DateTime<Utc>) -> Result<Vec<Dispute>> {
        self.inner.list_escalation_candidates(now).await
    }

    async fn update_if_status(
        &self,
        dispute: Dispute,
        expected: DisputeStatus,
    ) -> Result<UpdateOutcome> {
        let outcome = self.inner.update_if_status(dispute, expected).await?;
        if matches!(outcome, UpdateOutcome::Applied) {
            self.persist().await?;
        }
        Ok(outcome)
    }
}
