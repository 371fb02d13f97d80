use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ledger_core::{
    filter_by_description, CompanyCreate, CompanyListParams, CompanyUpdate, ContractorCreate,
    ContractorReportParams, ContractorUpdate, DocumentCreate, DocumentListQuery, KpirPeriod,
    Report, Session, Transport,
};

use crate::output;
use crate::{Command, CompanyCommand, ContractorCommand, DocumentCommand, ReportCommand};

pub fn run<T: Transport>(session: &mut Session<T>, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let user = session.login(&email, &password)?;
            if json {
                return output::json(&user);
            }
            output::user(&user);
        }
        Command::Logout => {
            session.logout()?;
            if !json {
                println!("signed out");
            }
        }
        Command::Me => {
            let user = session.me()?;
            if json {
                return output::json(&user);
            }
            output::user(&user);
        }
        Command::Companies(cmd) => companies(session, cmd, json)?,
        Command::Contractors(cmd) => contractors(session, cmd, json)?,
        Command::Documents(cmd) => documents(session, cmd, json)?,
        Command::Ledger => {
            let rows = session.list_ledger()?;
            if json {
                return output::json(&rows);
            }
            output::ledger(&rows);
        }
        Command::Report(cmd) => report(session, cmd)?,
    }
    Ok(())
}

fn companies<T: Transport>(session: &mut Session<T>, cmd: CompanyCommand, json: bool) -> Result<()> {
    match cmd {
        CompanyCommand::List {
            q,
            active,
            sort,
            dir,
        } => {
            let params = CompanyListParams {
                q,
                active,
                sort: sort.map(Into::into),
                dir: dir.map(Into::into),
            };
            let list = session.list_companies(&params)?;
            if json {
                return output::json(&list);
            }
            output::companies(&list);
        }
        CompanyCommand::Get { id } => {
            let company = session.get_company(id)?;
            if json {
                return output::json(&company);
            }
            output::companies(std::slice::from_ref(&company));
        }
        CompanyCommand::Create {
            name,
            tax_id,
            address,
            active,
        } => {
            let company = session.create_company(&CompanyCreate {
                name,
                tax_id,
                address,
                active,
            })?;
            if json {
                return output::json(&company);
            }
            output::companies(std::slice::from_ref(&company));
        }
        CompanyCommand::Update {
            id,
            name,
            tax_id,
            address,
            active,
        } => {
            let update = CompanyUpdate {
                name,
                tax_id,
                address,
                active,
            };
            if update == CompanyUpdate::default() {
                bail!("nothing to update");
            }
            let company = session.update_company(id, &update)?;
            if json {
                return output::json(&company);
            }
            output::companies(std::slice::from_ref(&company));
        }
        CompanyCommand::Delete { id } => {
            session.delete_company(id)?;
            if !json {
                println!("deleted company {id}");
            }
        }
        CompanyCommand::Users { id } => {
            let users = session.list_company_users(id)?;
            if json {
                return output::json(&users);
            }
            output::company_users(&users);
        }
    }
    Ok(())
}

fn contractors<T: Transport>(
    session: &mut Session<T>,
    cmd: ContractorCommand,
    json: bool,
) -> Result<()> {
    match cmd {
        ContractorCommand::List => {
            let list = session.list_contractors()?;
            if json {
                return output::json(&list);
            }
            output::contractors(&list);
        }
        ContractorCommand::Create {
            name,
            tax_id,
            address,
        } => {
            let created = session.create_contractor(&ContractorCreate {
                name,
                tax_id,
                address,
            })?;
            if json {
                return output::json(&created);
            }
            println!("created contractor {}", created.id);
        }
        ContractorCommand::Update {
            id,
            name,
            tax_id,
            address,
        } => {
            let update = ContractorUpdate {
                name,
                tax_id,
                address,
            };
            if update == ContractorUpdate::default() {
                bail!("nothing to update");
            }
            let updated = session.update_contractor(id, &update)?;
            if json {
                return output::json(&updated);
            }
            println!("updated contractor {}", updated.id);
        }
        ContractorCommand::Delete { id } => {
            session.delete_contractor(id)?;
            if !json {
                println!("deleted contractor {id}");
            }
        }
    }
    Ok(())
}

fn documents<T: Transport>(session: &mut Session<T>, cmd: DocumentCommand, json: bool) -> Result<()> {
    match cmd {
        DocumentCommand::List {
            doc_type,
            status,
            q,
        } => {
            let docs = session.list_documents(&DocumentListQuery { doc_type, status })?;
            let shown = filter_by_description(&docs, q.as_deref().unwrap_or_default());
            if json {
                return output::json(&shown);
            }
            output::documents(&shown);
        }
        DocumentCommand::Create(doc) => {
            let created = session.create_document(&DocumentCreate {
                doc_type: doc.doc_type,
                number: doc.number,
                description: doc.description,
                issue_date: doc.date,
                contractor_id: doc.contractor,
                net_amount: doc.net,
                vat_amount: doc.vat,
            })?;
            if json {
                return output::json(&created);
            }
            println!("created document {}", created.id);
        }
        DocumentCommand::Book { id } => {
            let is_manager = session.current_user().is_some_and(|u| u.is_manager());
            if !is_manager {
                bail!("only a manager can book documents; sign in as one first");
            }
            let booked = session.book_document(id)?;
            if json {
                return output::json(&booked);
            }
            match booked.ledger_entry_id {
                Some(entry) => println!("booked document {} as ledger entry {entry}", booked.id),
                None => println!("booked document {}", booked.id),
            }
        }
    }
    Ok(())
}

fn report<T: Transport>(session: &mut Session<T>, cmd: ReportCommand) -> Result<()> {
    let (report, out) = match cmd {
        ReportCommand::Kpir {
            year,
            month,
            quarter,
            out,
        } => {
            let period = match (month, quarter) {
                (Some(month), _) => KpirPeriod::Month { year, month },
                (None, Some(quarter)) => KpirPeriod::Quarter { year, quarter },
                (None, None) => KpirPeriod::Year { year },
            };
            (session.kpir_report(&period)?, out)
        }
        ReportCommand::Contractors {
            from,
            to,
            income_only,
            cost_only,
            contractor,
            out,
        } => {
            let params = ContractorReportParams {
                date_from: from,
                date_to: to,
                include_income: !cost_only,
                include_cost: !income_only,
                contractor_id: contractor,
            };
            (session.contractors_report(&params)?, out)
        }
    };
    let path = write_report(&out, &report)?;
    println!("saved {} ({} bytes)", path.display(), report.bytes.len());
    Ok(())
}

/// `out` is a directory (the report keeps its own name) or a file path.
fn write_report(out: &Path, report: &Report) -> Result<PathBuf> {
    let path = if out.is_dir() {
        // Only the final component of a server-suggested name is used.
        let name = Path::new(&report.filename)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("report"));
        out.join(name)
    } else {
        out.to_path_buf()
    };
    fs::write(&path, &report.bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
