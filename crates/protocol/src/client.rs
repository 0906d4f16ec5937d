use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity fields of a client as the letter composer needs them.
///
/// The full client record (contact history, billing, portal login) lives in
/// the account-management system; this is the read-only projection used to
/// address and sign letters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ClientProfile {
    pub id: Uuid,
    pub full_name: String,
    pub street_address: String,
    pub city_state_zip: String,
    /// Last four digits only; full SSNs never enter the engine.
    pub ssn_last4: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
}

impl ClientProfile {
    #[must_use]
    pub fn mailing_block(&self) -> String {
        format!("{}\n{}", self.street_address, self.city_state_zip)
    }
}
