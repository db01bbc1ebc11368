use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque account identity supplied by the caller's environment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Outcome of a lottery settlement, persisted for external watchers.
///
/// `winner` is `None` when no tickets were ever sold; in that case nothing
/// was disbursed and the whole pool stays with the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub lottery_id: Uuid,
    pub lottery_name: String,
    pub winner: Option<AccountId>,
    pub amount_disbursed: u64,
    pub operator_take: u64,
    pub settled_at: DateTime<Utc>,
}
