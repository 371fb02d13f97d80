//! Domain records exchanged with the bookkeeping backend.
//!
//! # Design
//! The backend is inconsistent about key casing: some resources come back in
//! camelCase, others in snake_case. Every multi-word field therefore accepts
//! both spellings through a serde alias, so the rest of the crate reads one
//! normalized struct. A record may also carry both spellings at once; serde
//! rejects that as a duplicate field, so responses go through
//! [`prefer_camel_case`] first. Requests are always sent in camelCase. Keys
//! the client does not model are kept in a flattened `extra` map instead of
//! dropped.

mod company;
mod contractor;
mod document;
mod report;
mod user;

pub use company::{Company, CompanyCreate, CompanyListParams, CompanySort, CompanyUpdate, CompanyUser, SortDir};
pub use contractor::{Contractor, ContractorCreate, ContractorUpdate, IdResponse};
pub use document::{
    filter_by_description, Document, DocumentBookResponse, DocumentCreate,
    DocumentCreateResponse, DocumentListQuery, DocumentStatus, DocumentType, LedgerRow,
};
pub use report::{ContractorReportParams, KpirPeriod};
pub use user::User;

/// Unmodelled keys of a record.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Drop every snake_case key whose camelCase twin is present in the same
/// object, at any depth. The camelCase value wins.
pub(crate) fn prefer_camel_case(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            let shadowed: Vec<String> = map
                .keys()
                .filter(|key| camel_case(key).is_some_and(|camel| map.contains_key(&camel)))
                .cloned()
                .collect();
            for key in shadowed {
                map.remove(&key);
            }
            map.values_mut().for_each(prefer_camel_case);
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(prefer_camel_case),
        _ => {}
    }
}

/// `issue_date` -> `issueDate`; `None` for keys that are not snake_case.
fn camel_case(key: &str) -> Option<String> {
    let mut parts = key.split('_');
    let mut camel = parts.next().filter(|head| !head.is_empty())?.to_string();
    let mut joined = false;
    for part in parts {
        let mut chars = part.chars();
        let first = chars.next()?;
        camel.extend(first.to_uppercase());
        camel.push_str(chars.as_str());
        joined = true;
    }
    joined.then_some(camel)
}

pub(crate) mod de {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// `null` decodes as the type's default instead of failing.
    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Money as a number or a numeric string; blank and non-numeric values
    /// become `None`.
    pub fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        })
    }

    /// Identifiers sometimes arrive as strings.
    pub fn opt_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn snake_case_keys() {
        assert_eq!(camel_case("issue_date").as_deref(), Some("issueDate"));
        assert_eq!(camel_case("ledger_entry_id").as_deref(), Some("ledgerEntryId"));
        assert_eq!(camel_case("id"), None);
        assert_eq!(camel_case("_links"), None);
        assert_eq!(camel_case("net__amount"), None);
        assert_eq!(camel_case("total_"), None);
    }

    #[test]
    fn camel_case_twin_wins_at_any_depth() {
        let mut value = json!({
            "data": [
                {"issueDate": "2024-03-01", "issue_date": "2024-02-01", "net_amount": "5"},
                {"meta": {"companyId": 1, "company_id": 2}}
            ],
            "_links": {}
        });
        prefer_camel_case(&mut value);
        assert_eq!(
            value,
            json!({
                "data": [
                    {"issueDate": "2024-03-01", "net_amount": "5"},
                    {"meta": {"companyId": 1}}
                ],
                "_links": {}
            })
        );
    }
}
