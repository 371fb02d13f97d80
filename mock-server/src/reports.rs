use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::Failure;
use crate::state::{AppState, Document};

pub const PDF: &str = "application/pdf";
pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Period {
    Month { year: i32, month: u32 },
    Quarter { year: i32, quarter: u32 },
    Year { year: i32 },
}

impl Period {
    /// Inclusive `YYYY-MM` bounds.
    fn months(&self) -> Option<(i32, u32, u32)> {
        match *self {
            Period::Month { year, month } if (1..=12).contains(&month) => Some((year, month, month)),
            Period::Quarter { year, quarter } if (1..=4).contains(&quarter) => {
                Some((year, quarter * 3 - 2, quarter * 3))
            }
            Period::Year { year } => Some((year, 1, 12)),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorReportInput {
    pub date_from: String,
    pub date_to: String,
    #[serde(default)]
    pub include_income: bool,
    #[serde(default)]
    pub include_cost: bool,
    pub contractor_id: Option<u64>,
}

fn in_months(doc: &Document, year: i32, from: u32, to: u32) -> bool {
    let mut parts = doc.issue_date.splitn(3, '-');
    let y = parts.next().and_then(|p| p.parse::<i32>().ok());
    let m = parts.next().and_then(|p| p.parse::<u32>().ok());
    matches!((y, m), (Some(y), Some(m)) if y == year && (from..=to).contains(&m))
}

/// Booked documents of the period rendered as a (fake) PDF.
///
/// Only the yearly report carries a suggested filename.
pub async fn kpir(State(state): State<AppState>, Json(period): Json<Period>) -> Response {
    let Some((year, from, to)) = period.months() else {
        return Failure::invalid("period", "The selected period is invalid.").into_response();
    };
    let db = state.db.read().await;
    let mut body = format!("%PDF-1.7\n% KPiR {year} {from:02}-{to:02}\n");
    for doc in db
        .documents
        .values()
        .filter(|d| d.status == "BOOKED" && in_months(d, year, from, to))
    {
        body.push_str(&format!(
            "% {} {} {:.2}\n",
            doc.issue_date,
            doc.number.as_deref().unwrap_or("-"),
            doc.net_amount
        ));
    }
    body.push_str("%%EOF\n");

    match period {
        Period::Year { year } => {
            let name = format!("KPiR {year}.pdf");
            let disposition = format!(
                "attachment; filename*=UTF-8''{}",
                urlencoding::encode(&name)
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, PDF.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        }
        _ => (StatusCode::OK, [(header::CONTENT_TYPE, PDF)], body).into_response(),
    }
}

/// Per-contractor turnover as a (fake) XLSX.
///
/// An empty period is answered with a 200 JSON message rather than a file.
pub async fn contractors_xlsx(
    State(state): State<AppState>,
    Json(input): Json<ContractorReportInput>,
) -> Response {
    if input.date_from.is_empty() || input.date_to.is_empty() || input.date_from > input.date_to {
        return Failure::invalid("dateFrom", "The date range is invalid.").into_response();
    }
    let db = state.db.read().await;
    let rows: Vec<&Document> = db
        .documents
        .values()
        .filter(|d| d.issue_date >= input.date_from && d.issue_date <= input.date_to)
        .filter(|d| input.contractor_id.is_none_or(|id| d.contractor_id == Some(id)))
        .filter(|d| {
            (input.include_income && d.doc_type == "INCOME")
                || (input.include_cost && d.doc_type == "COST")
        })
        .collect();
    if rows.is_empty() {
        return Json(json!({ "message": "No documents in the selected period." })).into_response();
    }

    let mut body = String::from("PK\u{3}\u{4}contractor;type;net;vat;gross\n");
    for doc in rows {
        body.push_str(&format!(
            "{};{};{:.2};{:.2};{:.2}\n",
            doc.contractor_name.as_deref().unwrap_or(""),
            doc.doc_type,
            doc.net_amount,
            doc.vat_amount,
            doc.gross_amount
        ));
    }
    let disposition = format!(
        "attachment; filename=\"kontrahenci_{}_{}.xlsx\"",
        input.date_from, input.date_to
    );
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}
