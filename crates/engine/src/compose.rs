use crate::collaborators::{ClientDirectory, DisputeStore, EvidenceVault};
use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use redress_protocol::{
    Bureau, ClientProfile, Dispute, DisputeStatus, EvidenceDocument, ItemType, NegativeItem,
    Recipient, ValidationReport, DISPUTE_SCHEMA_VERSION,
};
use redress_render::{render, VarMap};
use redress_strategy::{
    select_strategy, validate_evidence, AdvisoryClassifier, DisputeStrategy, PriorRoundOutcome,
};
use redress_templates::{LetterTemplate, TemplateLibrary, TemplateQuery};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

/// How items are grouped into letters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CombinePolicy {
    /// One letter per bureau carrying every selected item present on it.
    Combined,
    /// One letter per (item, bureau) pair.
    Individual,
}

/// One generation request, operator-triggered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeRequest {
    pub client_id: Uuid,
    pub item_ids: Vec<Uuid>,
    pub round: u32,
    pub bureaus: Vec<Bureau>,
    pub combine: CombinePolicy,
    pub recipient: Recipient,
    #[serde(default)]
    pub operator_codes: Vec<String>,
    #[serde(default)]
    pub evidence_ids: Vec<Uuid>,
    /// Force generation past an invalid evidence report. Recorded on every
    /// produced dispute for audit.
    #[serde(default)]
    pub override_evidence: bool,
    /// Ask the bureau for human review instead of automated matching.
    #[serde(default)]
    pub manual_review: bool,
    /// Letter date and `created_at` for the produced drafts.
    pub now: DateTime<Utc>,
}

/// A unit that failed without aborting the batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitFailure {
    pub bureau: Bureau,
    pub item_ids: Vec<Uuid>,
    pub reason: String,
}

#[derive(Debug)]
pub struct ComposeOutcome {
    /// Drafts persisted to the store, in unit order.
    pub disputes: Vec<Dispute>,
    /// Units that produced no letter.
    pub failures: Vec<UnitFailure>,
    pub validation: ValidationReport,
    pub strategy: DisputeStrategy,
}

struct LetterUnit {
    bureau: Bureau,
    items: Vec<NegativeItem>,
}

/// Orchestrates selector -> evidence gate -> template store -> renderer and
/// persists the resulting drafts.
///
/// Request-scoped and stateless between calls: every compose fetches fresh
/// collaborator data and writes each dispute row independently.
pub struct LetterComposer {
    clients: Arc<dyn ClientDirectory>,
    evidence: Arc<dyn EvidenceVault>,
    store: Arc<dyn DisputeStore>,
    classifier: Option<Arc<dyn AdvisoryClassifier>>,
    templates: Arc<TemplateLibrary>,
}

impl LetterComposer {
    #[must_use]
    pub fn new(
        clients: Arc<dyn ClientDirectory>,
        evidence: Arc<dyn EvidenceVault>,
        store: Arc<dyn DisputeStore>,
        templates: Arc<TemplateLibrary>,
    ) -> Self {
        Self {
            clients,
            evidence,
            store,
            classifier: None,
            templates,
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn AdvisoryClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub async fn compose(&self, request: &ComposeRequest) -> Result<ComposeOutcome> {
        let profile = self
            .clients
            .profile(request.client_id)
            .await?
            .ok_or(EngineError::ClientNotFound(request.client_id))?;
        let all_items = self.clients.items(request.client_id).await?;
        let selected: Vec<NegativeItem> = request
            .item_ids
            .iter()
            .filter_map(|id| all_items.iter().find(|item| item.id == *id).cloned())
            .collect();

        let advisory = match &self.classifier {
            Some(classifier) => classifier.classify(&selected, request.round).await,
            None => None,
        };
        let prior = self.prior_outcomes(request).await?;
        let strategy = select_strategy(
            &selected,
            request.round,
            &prior,
            &request.operator_codes,
            advisory.as_ref(),
        )?;
        log::info!(
            "Strategy for client {}: {} ({:?}, confidence {:.2})",
            request.client_id,
            strategy.methodology.as_str(),
            strategy.provenance,
            strategy.confidence
        );

        let attached = self.attached_documents(request).await?;
        let validation = validate_evidence(&strategy.reason_codes, &attached, &request.item_ids);
        if !validation.valid && !request.override_evidence {
            return Err(EngineError::EvidenceBlocked { report: validation });
        }
        let overridden = !validation.valid;
        if overridden {
            log::warn!(
                "Evidence gate overridden for client {} ({} missing requirement(s))",
                request.client_id,
                validation.missing_requirements.len()
            );
        }

        let units = expand_units(&selected, &request.bureaus, request.combine);
        let mut disputes = Vec::new();
        let mut failures = Vec::new();
        for unit in units {
            match self
                .produce_unit(&unit, &profile, &strategy, request, !attached.is_empty(), overridden)
                .await
            {
                Ok(dispute) => disputes.push(dispute),
                Err(err) => {
                    log::warn!(
                        "Letter unit for bureau {} failed: {err}",
                        unit.bureau.as_str()
                    );
                    failures.push(UnitFailure {
                        bureau: unit.bureau,
                        item_ids: unit.items.iter().map(|item| item.id).collect(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        log::info!(
            "Compose finished for client {}: {} letter(s), {} failure(s)",
            request.client_id,
            disputes.len(),
            failures.len()
        );
        Ok(ComposeOutcome {
            disputes,
            failures,
            validation,
            strategy,
        })
    }

    async fn produce_unit(
        &self,
        unit: &LetterUnit,
        profile: &ClientProfile,
        strategy: &DisputeStrategy,
        request: &ComposeRequest,
        evidence_attached: bool,
        overridden: bool,
    ) -> Result<Dispute> {
        let query = TemplateQuery {
            methodology: strategy.methodology,
            recipient: request.recipient,
            round: request.round,
            item_type: uniform_item_type(&unit.items),
            bureau: Some(unit.bureau),
        };
        let template =
            self.templates
                .resolve(&query)
                .ok_or_else(|| EngineError::TemplateNotFound {
                    methodology: strategy.methodology.as_str().to_string(),
                    recipient: request.recipient.as_str().to_string(),
                    round: request.round,
                })?;

        let vars = build_vars(
            profile,
            unit,
            strategy,
            template,
            request,
            evidence_attached,
        );
        let body = render(&template.body, &vars);
        let dispute = Dispute {
            schema_version: DISPUTE_SCHEMA_VERSION,
            id: Uuid::new_v4(),
            client_id: request.client_id,
            item_ids: unit.items.iter().map(|item| item.id).collect(),
            bureau: unit.bureau,
            round: request.round,
            methodology: strategy.methodology,
            reason_codes: strategy.reason_codes.clone(),
            letter_fingerprint: sha256_hex(body.as_bytes()),
            letter_body: body,
            template_fingerprint: Some(self.templates.fingerprint().to_string()),
            status: DisputeStatus::Draft,
            sent_at: None,
            response_deadline: None,
            escalation_ready_at: None,
            response_received_at: None,
            outcome: None,
            evidence_override: overridden,
            escalation_history: Vec::new(),
            created_at: request.now,
            updated_at: request.now,
        };
        self.store.insert(dispute.clone()).await?;
        Ok(dispute)
    }

    async fn attached_documents(&self, request: &ComposeRequest) -> Result<Vec<EvidenceDocument>> {
        if request.evidence_ids.is_empty() {
            return Ok(Vec::new());
        }
        let documents = self.evidence.documents(request.client_id).await?;
        Ok(documents
            .into_iter()
            .filter(|doc| request.evidence_ids.contains(&doc.id))
            .collect())
    }

    /// Prior-round outcomes for the selected items, expired-unanswered chains
    /// first so the selector sees the strongest escalation signal.
    async fn prior_outcomes(&self, request: &ComposeRequest) -> Result<Vec<PriorRoundOutcome>> {
        if request.round < 2 {
            return Ok(Vec::new());
        }
        let existing = self.store.list_by_client(request.client_id).await?;
        let mut outcomes: Vec<PriorRoundOutcome> = existing
            .iter()
            .filter(|d| d.round == request.round - 1)
            .filter(|d| d.item_ids.iter().any(|id| request.item_ids.contains(id)))
            .map(|d| PriorRoundOutcome {
                round: d.round,
                status: d.status,
                outcome: d.outcome,
                responded: d.response_received_at.is_some(),
                deadline_lapsed: d
                    .response_deadline
                    .is_some_and(|deadline| request.now >= deadline),
            })
            .collect();
        outcomes.sort_by_key(|o| !o.expired_unanswered());
        Ok(outcomes)
    }

}

fn expand_units(
    items: &[NegativeItem],
    bureaus: &[Bureau],
    policy: CombinePolicy,
) -> Vec<LetterUnit> {
    match policy {
        CombinePolicy::Combined => bureaus
            .iter()
            .filter_map(|&bureau| {
                let present: Vec<NegativeItem> = items
                    .iter()
                    .filter(|item| item.reported_on(bureau))
                    .cloned()
                    .collect();
                (!present.is_empty()).then_some(LetterUnit {
                    bureau,
                    items: present,
                })
            })
            .collect(),
        CombinePolicy::Individual => {
            let mut units = Vec::new();
            for item in items {
                for &bureau in bureaus {
                    if item.reported_on(bureau) {
                        units.push(LetterUnit {
                            bureau,
                            items: vec![item.clone()],
                        });
                    }
                }
            }
            units
        }
    }
}

fn uniform_item_type(items: &[NegativeItem]) -> Option<ItemType> {
    let first = items.first()?.item_type;
    items
        .iter()
        .all(|item| item.item_type == first)
        .then_some(first)
}

fn build_vars(
    profile: &ClientProfile,
    unit: &LetterUnit,
    strategy: &DisputeStrategy,
    template: &LetterTemplate,
    request: &ComposeRequest,
    evidence_attached: bool,
) -> VarMap {
    let mut vars = VarMap::new();
    let mut set = |key: &str, value: String| {
        vars.insert(key.to_string(), value);
    };
    set("date", request.now.format("%B %d, %Y").to_string());
    set("client_name", profile.full_name.clone());
    set("client_address", profile.mailing_block());
    set("client_ssn_last4", profile.ssn_last4.clone());
    set("bureau_name", unit.bureau.display_name().to_string());
    set("round", request.round.to_string());
    set("item_count", unit.items.len().to_string());
    set("items_list", format_items_list(&unit.items));
    if let Some(first) = unit.items.first() {
        set("creditor", first.creditor.clone());
        set("amount", first.amount_display());
    }
    set("reason_codes", strategy.reason_codes.join(", "));
    set("legal_citations", template.legal_citations.join("; "));
    set(
        "evidence_attached",
        if evidence_attached { "1" } else { "" }.to_string(),
    );
    set(
        "manual_review",
        if request.manual_review { "1" } else { "" }.to_string(),
    );
    vars
}

fn format_items_list(items: &[NegativeItem]) -> String {
    let mut lines = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let mut line = format!(
            "{}. Creditor: {} | Account type: {} | Reported amount: {}",
            idx + 1,
            item.creditor,
            item.item_type.as_str(),
            item.amount_display()
        );
        if let Some(status) = &item.reported_status {
            line.push_str(&format!(" | Reported status: {status}"));
        }
        if let Some(date) = item.date_reported {
            line.push_str(&format!(" | Date reported: {date}"));
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
