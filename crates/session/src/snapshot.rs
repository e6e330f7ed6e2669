//! 持久化的主体快照

use chrono::{DateTime, Utc};
use console_auth_core::Principal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct PrincipalSnapshot {
    #[serde(flatten)]
    pub principal: Principal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl PrincipalSnapshot {
    pub fn capture(principal: &Principal) -> Self {
        Self {
            principal: principal.clone(),
            saved_at: Some(Utc::now()),
        }
    }
}
