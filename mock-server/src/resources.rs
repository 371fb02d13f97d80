use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::error::Failure;
use crate::state::{AppState, Company, Contractor, Document, LedgerRow, UserRecord};

// ── Companies ───────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct CompanyQuery {
    pub q: Option<String>,
    pub active: Option<bool>,
    pub sort: Option<String>,
    pub dir: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInput {
    pub name: Option<String>,
    #[serde(alias = "tax_id")]
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub active: Option<bool>,
}

/// Paginator envelope: `{data, meta, links}`.
pub async fn list_companies(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> Json<Value> {
    let db = state.db.read().await;
    let needle = query.q.as_deref().map(str::to_lowercase);
    let mut companies: Vec<Company> = db
        .companies
        .values()
        .filter(|c| query.active.is_none_or(|a| c.active == a))
        .filter(|c| {
            needle.as_deref().is_none_or(|n| {
                c.name.to_lowercase().contains(n)
                    || c.tax_id.as_deref().is_some_and(|t| t.contains(n))
            })
        })
        .cloned()
        .collect();

    match query.sort.as_deref() {
        Some("name") => companies.sort_by(|a, b| a.name.cmp(&b.name)),
        Some("taxId") => companies.sort_by(|a, b| a.tax_id.cmp(&b.tax_id)),
        Some("active") => companies.sort_by_key(|c| c.active),
        _ => companies.sort_by_key(|c| c.id),
    }
    if query.dir.as_deref() == Some("desc") {
        companies.reverse();
    }

    let total = companies.len();
    Json(json!({
        "data": companies,
        "meta": { "current_page": 1, "per_page": total.max(15), "total": total },
        "links": { "first": null, "last": null, "prev": null, "next": null },
    }))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Company>, Failure> {
    let db = state.db.read().await;
    db.companies.get(&id).cloned().map(Json).ok_or_else(Failure::not_found)
}

pub async fn create_company(
    State(state): State<AppState>,
    Json(input): Json<CompanyInput>,
) -> Result<(StatusCode, Json<Company>), Failure> {
    let name = input
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| Failure::invalid("name", "The name field is required."))?;
    let mut db = state.db.write().await;
    let company = Company {
        id: db.next_id(),
        name,
        tax_id: input.tax_id,
        address: input.address,
        active: input.active.unwrap_or(true),
    };
    db.companies.insert(company.id, company.clone());
    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<CompanyInput>,
) -> Result<Json<Company>, Failure> {
    let mut db = state.db.write().await;
    let company = db.companies.get_mut(&id).ok_or_else(Failure::not_found)?;
    if let Some(name) = input.name {
        company.name = name;
    }
    if let Some(tax_id) = input.tax_id {
        company.tax_id = Some(tax_id);
    }
    if let Some(address) = input.address {
        company.address = Some(address);
    }
    if let Some(active) = input.active {
        company.active = active;
    }
    Ok(Json(company.clone()))
}

pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, Failure> {
    let mut db = state.db.write().await;
    db.companies
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(Failure::not_found)
}

/// Bare array.
pub async fn list_company_users(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<UserRecord>>, Failure> {
    let db = state.db.read().await;
    if !db.companies.contains_key(&id) {
        return Err(Failure::not_found());
    }
    Ok(Json(db.users.iter().filter(|u| u.company_id == id).cloned().collect()))
}

// ── Contractors ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorInput {
    pub name: Option<String>,
    #[serde(alias = "tax_id")]
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

/// `{items: [...]}`.
pub async fn list_contractors(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    let items: Vec<&Contractor> = db.contractors.values().collect();
    Json(json!({ "items": items }))
}

pub async fn create_contractor(
    State(state): State<AppState>,
    Json(input): Json<ContractorInput>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let name = input
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| Failure::invalid("name", "The name field is required."))?;
    let mut db = state.db.write().await;
    let id = db.next_id();
    db.contractors.insert(
        id,
        Contractor {
            id,
            name,
            tax_id: input.tax_id,
            address: input.address,
        },
    );
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update_contractor(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<ContractorInput>,
) -> Result<Json<Value>, Failure> {
    let mut db = state.db.write().await;
    let contractor = db.contractors.get_mut(&id).ok_or_else(Failure::not_found)?;
    if let Some(name) = input.name {
        contractor.name = name;
    }
    if let Some(tax_id) = input.tax_id {
        contractor.tax_id = Some(tax_id);
    }
    if let Some(address) = input.address {
        contractor.address = Some(address);
    }
    Ok(Json(json!({ "id": id })))
}

pub async fn delete_contractor(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, Failure> {
    let mut db = state.db.write().await;
    db.contractors
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(Failure::not_found)
}

// ── Documents ───────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct DocumentQuery {
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub number: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "issue_date")]
    pub issue_date: String,
    #[serde(alias = "contractor_id")]
    pub contractor_id: Option<u64>,
    #[serde(alias = "net_amount")]
    pub net_amount: f64,
    #[serde(alias = "vat_amount")]
    pub vat_amount: f64,
}

/// `{data: [...]}` with snake_case records.
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<DocumentQuery>,
) -> Json<Value> {
    let db = state.db.read().await;
    let docs: Vec<&Document> = db
        .documents
        .values()
        .filter(|d| query.doc_type.as_deref().is_none_or(|t| d.doc_type.eq_ignore_ascii_case(t)))
        .filter(|d| query.status.as_deref().is_none_or(|s| d.status.eq_ignore_ascii_case(s)))
        .collect();
    Json(json!({ "data": docs }))
}

pub async fn create_document(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Json(input): Json<DocumentInput>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let doc_type = input.doc_type.to_ascii_uppercase();
    if doc_type != "INCOME" && doc_type != "COST" {
        return Err(Failure::invalid("type", "The selected type is invalid."));
    }
    if input.issue_date.trim().is_empty() {
        return Err(Failure::invalid("issueDate", "The issue date field is required."));
    }
    if input.net_amount < 0.0 || input.vat_amount < 0.0 {
        return Err(Failure::invalid("netAmount", "Amounts must not be negative."));
    }

    let mut db = state.db.write().await;
    let company_id = db.user(user_id).map(|u| u.company_id).unwrap_or_default();
    let contractor_name = match input.contractor_id {
        Some(cid) => Some(
            db.contractors
                .get(&cid)
                .map(|c| c.name.clone())
                .ok_or_else(|| Failure::invalid("contractorId", "The selected contractor is invalid."))?,
        ),
        None => None,
    };
    let id = db.next_id();
    db.documents.insert(
        id,
        Document {
            id,
            doc_type,
            status: "BUFFER".to_string(),
            number: input.number,
            description: input.description,
            issue_date: input.issue_date,
            contractor_id: input.contractor_id,
            contractor_name,
            net_amount: input.net_amount,
            vat_amount: input.vat_amount,
            gross_amount: input.net_amount + input.vat_amount,
            booked_at: None,
            company_id,
        },
    );
    Ok((StatusCode::CREATED, Json(json!({ "id": id, "status": "BUFFER" }))))
}

/// Managers only. Appends the document to the ledger.
pub async fn book_document(
    State(state): State<AppState>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, Failure> {
    let mut db = state.db.write().await;
    if !db.user(user_id).is_some_and(UserRecord::is_manager) {
        return Err(Failure::new(StatusCode::FORBIDDEN, "Only a manager may book documents."));
    }
    let lp = db.ledger.len() as u32 + 1;
    let entry_id = db.next_id();
    let doc = db.documents.get_mut(&id).ok_or_else(Failure::not_found)?;
    if doc.status == "BOOKED" {
        return Err(Failure::new(StatusCode::CONFLICT, "Document already booked."));
    }
    doc.status = "BOOKED".to_string();
    doc.booked_at = Some(doc.issue_date.clone());

    let (income, cost) = if doc.doc_type == "INCOME" {
        (Some(doc.net_amount), None)
    } else {
        (None, Some(doc.net_amount))
    };
    let row = LedgerRow {
        id: entry_id,
        lp,
        document_id: doc.id,
        entry_date: doc.issue_date.clone(),
        document_number: doc.number.clone(),
        description: doc.description.clone(),
        income,
        cost,
    };
    db.ledger.push(row);
    Ok(Json(json!({ "id": id, "status": "BOOKED", "ledger_entry_id": entry_id })))
}

/// `{rows: [...]}`.
pub async fn list_ledger(State(state): State<AppState>) -> Json<Value> {
    let db = state.db.read().await;
    Json(json!({ "rows": db.ledger }))
}
