use serde::{Deserialize, Serialize};

use super::{de, Extra};

pub const ROLE_MANAGER: &str = "ROLE_MANAGER";

/// The signed-in account as returned by `/api/login` and `/api/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    /// Single-role backends send `role`, others a `roles` list.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub roles: Vec<String>,
    #[serde(default, alias = "company_id", deserialize_with = "de::opt_id")]
    pub company_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role) || self.roles.iter().any(|r| r == role)
    }

    /// Managers are the only users allowed to book documents.
    pub fn is_manager(&self) -> bool {
        self.has_role(ROLE_MANAGER)
    }
}
