use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tokio::sync::RwLock;

pub const ROLE_MANAGER: &str = "ROLE_MANAGER";

#[derive(Clone, Debug, Serialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub roles: Vec<String>,
    pub company_id: u64,
}

impl UserRecord {
    pub fn is_manager(&self) -> bool {
        self.role.as_deref() == Some(ROLE_MANAGER) || self.roles.iter().any(|r| r == ROLE_MANAGER)
    }
}

/// Admin resource, serialized in camelCase.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: u64,
    pub name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub active: bool,
}

/// Serialized in snake_case, like the rest of the bookkeeping resources.
#[derive(Clone, Debug, Serialize)]
pub struct Contractor {
    pub id: u64,
    pub name: String,
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Document {
    pub id: u64,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub status: String,
    pub number: Option<String>,
    pub description: Option<String>,
    pub issue_date: String,
    pub contractor_id: Option<u64>,
    pub contractor_name: Option<String>,
    #[serde(serialize_with = "money")]
    pub net_amount: f64,
    #[serde(serialize_with = "money")]
    pub vat_amount: f64,
    #[serde(serialize_with = "money")]
    pub gross_amount: f64,
    pub booked_at: Option<String>,
    pub company_id: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct LedgerRow {
    pub id: u64,
    pub lp: u32,
    pub document_id: u64,
    pub entry_date: String,
    pub document_number: Option<String>,
    pub description: Option<String>,
    #[serde(serialize_with = "opt_money")]
    pub income: Option<f64>,
    #[serde(serialize_with = "opt_money")]
    pub cost: Option<f64>,
}

/// Amounts go out as decimal strings, the way the backend's decimal casts
/// render them.
fn money<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.2}"))
}

fn opt_money<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => money(v, serializer),
        None => serializer.serialize_none(),
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SessionRecord {
    pub xsrf: String,
    pub user_id: Option<u64>,
}

#[derive(Debug, Default)]
pub(crate) struct Db {
    pub sessions: HashMap<String, SessionRecord>,
    pub users: Vec<UserRecord>,
    pub companies: BTreeMap<u64, Company>,
    pub contractors: BTreeMap<u64, Contractor>,
    pub documents: BTreeMap<u64, Document>,
    pub ledger: Vec<LedgerRow>,
    next_id: u64,
}

impl Db {
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn user(&self, id: u64) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == id)
    }
}

#[derive(Clone, Default)]
pub struct AppState {
    pub(crate) db: Arc<RwLock<Db>>,
    csrf_requests: Arc<AtomicUsize>,
}

impl AppState {
    /// Two users of one accounting office, two companies, one contractor.
    pub fn seeded() -> Self {
        let mut db = Db {
            next_id: 100,
            ..Db::default()
        };
        db.users = vec![
            UserRecord {
                id: 1,
                name: "Anna Nowak".to_string(),
                email: "anna@saldo.pl".to_string(),
                password: "secret".to_string(),
                role: Some(ROLE_MANAGER.to_string()),
                roles: vec![ROLE_MANAGER.to_string()],
                company_id: 1,
            },
            UserRecord {
                id: 2,
                name: "Jan Kowalski".to_string(),
                email: "jan@saldo.pl".to_string(),
                password: "secret".to_string(),
                role: None,
                roles: vec!["ROLE_USER".to_string()],
                company_id: 1,
            },
        ];
        for company in [
            Company {
                id: 1,
                name: "Biuro Rachunkowe Saldo".to_string(),
                tax_id: Some("5260001246".to_string()),
                address: Some("ul. Prosta 1, Warszawa".to_string()),
                active: true,
            },
            Company {
                id: 2,
                name: "Piekarnia Kłos".to_string(),
                tax_id: Some("9570001234".to_string()),
                address: None,
                active: false,
            },
        ] {
            db.companies.insert(company.id, company);
        }
        db.contractors.insert(
            1,
            Contractor {
                id: 1,
                name: "Orlen S.A.".to_string(),
                tax_id: Some("7740001454".to_string()),
                address: Some("ul. Chemików 7, Płock".to_string()),
            },
        );
        Self {
            db: Arc::new(RwLock::new(db)),
            csrf_requests: Arc::default(),
        }
    }

    /// How many times `/sanctum/csrf-cookie` was hit.
    pub fn csrf_requests(&self) -> usize {
        self.csrf_requests.load(Ordering::SeqCst)
    }

    pub(crate) fn count_csrf_request(&self) {
        self.csrf_requests.fetch_add(1, Ordering::SeqCst);
    }
}
