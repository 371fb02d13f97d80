//! Rendering of command results.

use anyhow::Result;
use ledger_core::{Company, CompanyUser, Contractor, Document, LedgerRow, User};
use serde::Serialize;

pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

fn amount(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

pub fn user(user: &User) {
    let role = user
        .role
        .clone()
        .or_else(|| (!user.roles.is_empty()).then(|| user.roles.join(",")));
    println!(
        "#{} {} <{}> {}",
        user.id,
        or_dash(user.name.as_deref()),
        user.email,
        or_dash(role.as_deref())
    );
}

pub fn companies(companies: &[Company]) {
    for c in companies {
        println!(
            "{:>5}  {:<40} {:<12} {}",
            c.id,
            c.name,
            or_dash(c.tax_id.as_deref()),
            if c.active { "active" } else { "inactive" }
        );
    }
}

pub fn company_users(users: &[CompanyUser]) {
    for u in users {
        println!(
            "{:>5}  {:<30} {:<30} {}",
            u.id,
            or_dash(u.name.as_deref()),
            u.email,
            or_dash(u.role.as_deref())
        );
    }
}

pub fn contractors(contractors: &[Contractor]) {
    for c in contractors {
        println!(
            "{:>5}  {:<40} {:<12} {}",
            c.id,
            c.name,
            or_dash(c.tax_id.as_deref()),
            or_dash(c.address.as_deref())
        );
    }
}

pub fn documents(documents: &[&Document]) {
    for d in documents {
        println!(
            "{:>5}  {:<6} {:<7} {:<10} {:<16} {:>12} {:>12}  {}",
            d.id,
            d.doc_type.to_string(),
            d.status.to_string(),
            or_dash(d.issue_date.as_deref()),
            or_dash(d.number.as_deref()),
            amount(d.net_amount),
            amount(d.gross_amount),
            or_dash(d.description.as_deref())
        );
    }
}

pub fn ledger(rows: &[LedgerRow]) {
    for r in rows {
        println!(
            "{:>4}  {:<10} {:<16} {:>12} {:>12}  {}",
            r.lp.map_or_else(|| "-".to_string(), |lp| lp.to_string()),
            or_dash(r.entry_date.as_deref()),
            or_dash(r.document_number.as_deref()),
            amount(r.income),
            amount(r.cost),
            or_dash(r.description.as_deref())
        );
    }
}
