//! `ledger`: command-line shell over the bookkeeping API client.
//!
//! Cookies and the signed-in user are kept in a state directory so that
//! `ledger login` followed by other commands behaves like one browser
//! session.

mod commands;
mod config;
mod output;
mod transport;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use ledger_core::{CompanySort, DocumentStatus, DocumentType, LedgerClient, Session, SortDir};
use tracing_subscriber::EnvFilter;

use crate::config::StateDir;
use crate::transport::UreqTransport;

#[derive(Parser, Debug)]
#[command(name = "ledger")]
#[command(about = "Client for the bookkeeping backend")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file (defaults to ./ledger.toml when present)
    #[arg(long, global = true, env = "LEDGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "LEDGER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session and forget the cached user
    Logout,
    /// Show the signed-in user (refreshed from the server)
    Me,
    #[command(subcommand)]
    Companies(CompanyCommand),
    #[command(subcommand)]
    Contractors(ContractorCommand),
    #[command(subcommand)]
    Documents(DocumentCommand),
    /// List ledger (KPiR) entries
    Ledger,
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand, Debug)]
pub enum CompanyCommand {
    List {
        /// Search by name or tax id
        #[arg(long)]
        q: Option<String>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long, value_enum)]
        sort: Option<SortField>,
        #[arg(long, value_enum)]
        dir: Option<Direction>,
    },
    Get {
        id: u64,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        tax_id: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        tax_id: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    Delete {
        id: u64,
    },
    /// Users attached to a company
    Users {
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContractorCommand {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        tax_id: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        tax_id: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    Delete {
        id: u64,
    },
}

#[derive(Subcommand, Debug)]
pub enum DocumentCommand {
    List {
        /// INCOME or COST
        #[arg(long = "type")]
        doc_type: Option<DocumentType>,
        /// BUFFER or BOOKED
        #[arg(long)]
        status: Option<DocumentStatus>,
        /// Keep documents whose description contains this text
        #[arg(long)]
        q: Option<String>,
    },
    Create(NewDocument),
    /// Move a buffered document into the ledger (managers only)
    Book {
        id: u64,
    },
}

#[derive(Args, Debug)]
pub struct NewDocument {
    #[arg(long = "type")]
    pub doc_type: DocumentType,
    #[arg(long)]
    pub number: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Issue date, YYYY-MM-DD
    #[arg(long)]
    pub date: String,
    #[arg(long)]
    pub contractor: Option<u64>,
    #[arg(long)]
    pub net: f64,
    #[arg(long, default_value_t = 0.0)]
    pub vat: f64,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// KPiR PDF for a month, a quarter or a whole year
    Kpir {
        #[arg(long)]
        year: i32,
        #[arg(long, conflicts_with = "quarter")]
        month: Option<u32>,
        #[arg(long)]
        quarter: Option<u32>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Per-contractor turnover XLSX
    Contractors {
        /// YYYY-MM-DD
        #[arg(long)]
        from: String,
        /// YYYY-MM-DD
        #[arg(long)]
        to: String,
        /// Only income documents
        #[arg(long, conflicts_with = "cost_only")]
        income_only: bool,
        /// Only cost documents
        #[arg(long)]
        cost_only: bool,
        #[arg(long)]
        contractor: Option<u64>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SortField {
    Id,
    Name,
    TaxId,
    Active,
}

impl From<SortField> for CompanySort {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Id => CompanySort::Id,
            SortField::Name => CompanySort::Name,
            SortField::TaxId => CompanySort::TaxId,
            SortField::Active => CompanySort::Active,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for SortDir {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Asc => SortDir::Asc,
            Direction::Desc => SortDir::Desc,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ledger=info,warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = config::load(cli.config.as_deref())?;
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    tracing::debug!(base_url = %config.base_url, "configuration loaded");

    let state = StateDir::new(&config);
    let mut session = Session::new(LedgerClient::from_config(&config), UreqTransport::new())
        .with_cookies(state.load_cookies()?)
        .with_user_cache(state.user_cache());

    let result = commands::run(&mut session, cli.command, cli.json);
    // Cookies set by a failed request are kept too.
    state.save_cookies(session.cookies())?;
    result
}
