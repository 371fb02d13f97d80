use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{de, Extra};
use crate::error::ApiError;
use crate::query::QueryString;

/// Income or cost. Types the client does not know are carried through
/// unchanged when read from the server, but never accepted as input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentType {
    Income,
    Cost,
    Other(String),
}

impl DocumentType {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentType::Income => "INCOME",
            DocumentType::Cost => "COST",
            DocumentType::Other(s) => s,
        }
    }

    /// Case-insensitive decode of a type sent by the server.
    pub fn normalize(raw: &str) -> Self {
        let up = raw.trim().to_ascii_uppercase();
        match up.as_str() {
            "INCOME" => DocumentType::Income,
            "COST" => DocumentType::Cost,
            _ => DocumentType::Other(up),
        }
    }
}

/// Strict: only `INCOME` and `COST`.
impl FromStr for DocumentType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match DocumentType::normalize(s) {
            DocumentType::Other(other) => {
                Err(ApiError::InvalidInput(format!("unknown document type {other:?}")))
            }
            known => Ok(known),
        }
    }
}

/// Lifecycle of a document: drafts sit in the buffer until booked.
///
/// Statuses the client does not know are carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    Buffer,
    Booked,
    Other(String),
}

impl DocumentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentStatus::Buffer => "BUFFER",
            DocumentStatus::Booked => "BOOKED",
            DocumentStatus::Other(s) => s,
        }
    }

    /// Case-insensitive; `BUF` is an older spelling of `BUFFER`.
    pub fn normalize(raw: &str) -> Self {
        let up = raw.trim().to_ascii_uppercase();
        match up.as_str() {
            "BUF" | "BUFFER" => DocumentStatus::Buffer,
            "BOOKED" => DocumentStatus::Booked,
            _ => DocumentStatus::Other(up),
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DocumentStatus::normalize(s))
    }
}

macro_rules! string_serde {
    ($ty:ty, $decode:path) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok($decode(&raw))
            }
        }
    };
}

string_serde!(DocumentType, DocumentType::normalize);
string_serde!(DocumentStatus, DocumentStatus::normalize);

/// A bookkeeping document: an invoice or receipt, in the buffer or booked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: u64,
    #[serde(rename = "type", alias = "docType", alias = "doc_type")]
    pub doc_type: DocumentType,
    pub status: DocumentStatus,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "issue_date")]
    pub issue_date: Option<String>,
    #[serde(default, alias = "contractor_id", deserialize_with = "de::opt_id")]
    pub contractor_id: Option<u64>,
    #[serde(default, alias = "contractor_name")]
    pub contractor_name: Option<String>,
    #[serde(default, alias = "net_amount", deserialize_with = "de::amount")]
    pub net_amount: Option<f64>,
    #[serde(default, alias = "vat_amount", deserialize_with = "de::amount")]
    pub vat_amount: Option<f64>,
    #[serde(default, alias = "gross_amount", deserialize_with = "de::amount")]
    pub gross_amount: Option<f64>,
    #[serde(default, alias = "booked_at")]
    pub booked_at: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Document {
    pub fn is_booked(&self) -> bool {
        self.status == DocumentStatus::Booked
    }
}

/// Server-side filters of the document list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentListQuery {
    pub doc_type: Option<DocumentType>,
    pub status: Option<DocumentStatus>,
}

impl DocumentListQuery {
    pub fn query(&self) -> QueryString {
        QueryString::new()
            .push("type", self.doc_type.as_ref())
            .push("status", self.status.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCreate {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(alias = "issue_date")]
    pub issue_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "contractor_id")]
    pub contractor_id: Option<u64>,
    #[serde(alias = "net_amount")]
    pub net_amount: f64,
    #[serde(alias = "vat_amount")]
    pub vat_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCreateResponse {
    pub id: u64,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentBookResponse {
    pub id: u64,
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    #[serde(default, alias = "ledger_entry_id", deserialize_with = "de::opt_id")]
    pub ledger_entry_id: Option<u64>,
}

/// One line of the revenue and expense ledger (KPiR).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    pub id: u64,
    /// Ordinal position within the ledger.
    #[serde(default)]
    pub lp: Option<u32>,
    #[serde(default, alias = "document_id", deserialize_with = "de::opt_id")]
    pub document_id: Option<u64>,
    #[serde(default, alias = "entry_date")]
    pub entry_date: Option<String>,
    #[serde(default, alias = "document_number")]
    pub document_number: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::amount")]
    pub income: Option<f64>,
    #[serde(default, deserialize_with = "de::amount")]
    pub cost: Option<f64>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Keep documents whose description contains `needle`, ignoring case.
/// A blank needle keeps everything.
pub fn filter_by_description<'a>(docs: &'a [Document], needle: &str) -> Vec<&'a Document> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return docs.iter().collect();
    }
    docs.iter()
        .filter(|d| {
            d.description
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&needle)
        })
        .collect()
}
