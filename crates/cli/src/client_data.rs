use async_trait::async_trait;
use redress_engine::{ClientDirectory, EvidenceVault};
use redress_protocol::{ClientProfile, EvidenceDocument, NegativeItem};
use serde::Deserialize;
use std::path::Path;
use uuid::Uuid;

/// Operator-supplied client export: identity, parsed report items, and
/// uploaded evidence references, as one JSON document.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ClientFile {
    pub profile: ClientProfile,
    #[serde(default)]
    pub items: Vec<NegativeItem>,
    #[serde(default)]
    pub evidence: Vec<EvidenceDocument>,
}

impl ClientFile {
    pub(crate) fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let file: Self = serde_json::from_str(&raw)?;
        log::debug!(
            "Loaded client {} with {} item(s), {} evidence document(s)",
            file.profile.id,
            file.items.len(),
            file.evidence.len()
        );
        Ok(file)
    }
}

/// Adapts a loaded [`ClientFile`] to the engine's collaborator seams.
pub(crate) struct FileClientData {
    file: ClientFile,
}

impl FileClientData {
    pub(crate) fn new(file: ClientFile) -> Self {
        Self { file }
    }
}

#[async_trait]
impl ClientDirectory for FileClientData {
    async fn profile(&self, client_id: Uuid) -> redress_engine::Result<Option<ClientProfile>> {
        Ok((client_id == self.file.profile.id).then(|| self.file.profile.clone()))
    }

    async fn items(&self, _client_id: Uuid) -> redress_engine::Result<Vec<NegativeItem>> {
        Ok(self.file.items.clone())
    }
}

#[async_trait]
impl EvidenceVault for FileClientData {
    async fn documents(&self, _client_id: Uuid) -> redress_engine::Result<Vec<EvidenceDocument>> {
        Ok(self.file.evidence.clone())
    }
}
