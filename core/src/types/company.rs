use std::fmt;

use serde::{Deserialize, Serialize};

use super::{de, Extra};
use crate::query::QueryString;

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: u64,
    pub name: String,
    #[serde(default, alias = "tax_id")]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_active", alias = "is_active")]
    pub active: bool,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "tax_id")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Partial update; `None` fields are left untouched on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "tax_id")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// A user attached to a company, as listed on the admin screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyUser {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub roles: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompanySort {
    Id,
    Name,
    TaxId,
    Active,
}

impl fmt::Display for CompanySort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompanySort::Id => "id",
            CompanySort::Name => "name",
            CompanySort::TaxId => "taxId",
            CompanySort::Active => "active",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        })
    }
}

/// Filters of the company list. `q` is trimmed; blank means no search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyListParams {
    pub q: Option<String>,
    pub active: Option<bool>,
    pub sort: Option<CompanySort>,
    pub dir: Option<SortDir>,
}

impl CompanyListParams {
    pub fn query(&self) -> QueryString {
        QueryString::new()
            .push("q", self.q.as_deref())
            .push("active", self.active)
            .push("sort", self.sort)
            .push("dir", self.dir)
    }
}
