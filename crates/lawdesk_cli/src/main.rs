//! `lawdesk` command-line front end.
//!
//! # Responsibility
//! - Parse commands and delegate to `lawdesk_core` services.
//! - Own process concerns: config loading, logging init, exit codes.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use lawdesk_core::config::AppConfig;
use lawdesk_core::export::{clients_csv, volumetry_csv, write_export};
use lawdesk_core::lookup::LookupClient;
use lawdesk_core::model::client::Client;
use lawdesk_core::model::contract::{Contract, ContractStatus};
use lawdesk_core::model::crm::{CrmContact, GiftType};
use lawdesk_core::model::kanban::{KanbanStatus, KanbanTask, Priority};
use lawdesk_core::model::partner::Partner;
use lawdesk_core::model::{EntityId, Gender};
use lawdesk_core::proposal::form::ProposalForm;
use lawdesk_core::repo::audit_repo::SqliteAuditRepository;
use lawdesk_core::repo::client_repo::{ClientListQuery, ClientRepository, SqliteClientRepository};
use lawdesk_core::repo::contract_repo::{ContractListQuery, ContractRepository, SqliteContractRepository};
use lawdesk_core::repo::crm_repo::SqliteCrmRepository;
use lawdesk_core::repo::kanban_repo::SqliteKanbanRepository;
use lawdesk_core::repo::partner_repo::{PartnerRepository, SqlitePartnerRepository};
use lawdesk_core::repo::preference_repo::SqlitePreferenceRepository;
use lawdesk_core::service::audit_service::AuditLogger;
use lawdesk_core::service::backup_service::{AutoBackupOutcome, BackupService};
use lawdesk_core::service::client_service::{merge_company_info, ClientService};
use lawdesk_core::service::contract_service::ContractService;
use lawdesk_core::service::crm_service::CrmService;
use lawdesk_core::service::kanban_service::KanbanService;
use lawdesk_core::service::proposal_service::{ProposalService, RenderRequest};
use lawdesk_core::text::{extenso, masks, money};
use lawdesk_core::{init_logging, open_db};
use log::error;
use rusqlite::Connection;
use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliResult<T = ()> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "lawdesk")]
#[command(about = "Law-firm back-office tools", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// E-mail recorded as the acting user in the audit log.
    #[arg(long, global = true)]
    user: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spell an amount in Portuguese words.
    Words {
        #[arg(value_enum)]
        kind: WordsKind,
        value: String,
    },
    /// Apply an input mask.
    Mask {
        #[arg(value_enum)]
        kind: MaskKind,
        value: String,
    },
    Partner {
        #[command(subcommand)]
        command: PartnerCommand,
    },
    Client {
        #[command(subcommand)]
        command: ClientCommand,
    },
    Contract {
        #[command(subcommand)]
        command: ContractCommand,
    },
    Kanban {
        #[command(subcommand)]
        command: KanbanCommand,
    },
    Crm {
        #[command(subcommand)]
        command: CrmCommand,
    },
    Proposal {
        #[command(subcommand)]
        command: ProposalCommand,
    },
    Backup {
        #[command(subcommand)]
        command: BackupCommand,
    },
    Lookup {
        #[arg(value_enum)]
        kind: LookupKind,
        value: String,
    },
    Log {
        #[command(subcommand)]
        command: LogCommand,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum WordsKind {
    Money,
    Percent,
}

#[derive(Clone, Copy, ValueEnum)]
enum MaskKind {
    Date,
    Cpf,
    Cnpj,
    Document,
    Cep,
    Phone,
    Cnj,
    Hon,
    Rg,
    Money,
}

#[derive(Clone, Copy, ValueEnum)]
enum LookupKind {
    Cnpj,
    Cep,
}

#[derive(Subcommand)]
enum PartnerCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        cpf: Option<String>,
        /// `M` or `F`.
        #[arg(long, value_parser = parse_gender)]
        gender: Option<Gender>,
        #[arg(long)]
        civil_status: Option<String>,
        #[arg(long)]
        nationality: Option<String>,
        #[arg(long)]
        oab_number: Option<String>,
        #[arg(long)]
        oab_state: Option<String>,
    },
    List {
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum ClientCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        cnpj: Option<String>,
        /// Natural person (CPF instead of CNPJ).
        #[arg(long)]
        person: bool,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        partner: Option<EntityId>,
        /// Fill blank fields from the company registry.
        #[arg(long)]
        lookup: bool,
    },
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Export {
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum ContractCommand {
    Add {
        /// Defaults to the linked client's name.
        #[arg(long)]
        client_name: Option<String>,
        #[arg(long)]
        client: Option<EntityId>,
        /// CPF or CNPJ; defaults to the linked client's document.
        #[arg(long)]
        cnpj: Option<String>,
        #[arg(long)]
        partner: Option<EntityId>,
        #[arg(long, value_parser = parse_contract_status, default_value = "analysis")]
        status: ContractStatus,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        observations: Option<String>,
    },
    Status {
        id: EntityId,
        #[arg(value_parser = parse_contract_status)]
        to: ContractStatus,
        /// ISO date; defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    List {
        #[arg(long, value_parser = parse_contract_status)]
        status: Option<ContractStatus>,
    },
    Volumetry {
        /// Write the matrix as CSV instead of printing rows.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum KanbanCommand {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_kanban_status, default_value = "todo")]
        status: KanbanStatus,
        #[arg(long, value_parser = parse_priority, default_value = "medium")]
        priority: Priority,
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        contract: Option<EntityId>,
    },
    List,
    Move {
        id: EntityId,
        #[arg(value_parser = parse_kanban_status)]
        to: KanbanStatus,
        /// Zero-based index in the destination column; end when omitted.
        #[arg(long)]
        position: Option<usize>,
    },
    Delete {
        id: EntityId,
    },
}

#[derive(Subcommand)]
enum CrmCommand {
    Add {
        #[arg(long)]
        client: EntityId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        main: bool,
        #[arg(long, value_parser = parse_gift_type)]
        gift: Option<GiftType>,
        #[arg(long)]
        gift_other: Option<String>,
    },
    List {
        #[arg(long)]
        client: Option<EntityId>,
    },
    Summary,
    Incomplete,
}

#[derive(Subcommand)]
enum ProposalCommand {
    Render {
        /// JSON proposal form.
        #[arg(long)]
        form: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        preview: Option<PathBuf>,
        /// Contract whose data pre-fills the form and receives the proposal code.
        #[arg(long)]
        contract: Option<EntityId>,
    },
}

#[derive(Subcommand)]
enum BackupCommand {
    Run {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    Auto {
        /// Turn the daily backup on or off before checking.
        #[arg(long)]
        enable: Option<bool>,
    },
}

#[derive(Subcommand)]
enum LogCommand {
    List {
        #[arg(long)]
        module: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
}

fn parse_gender(value: &str) -> Result<Gender, String> {
    Gender::parse(value).ok_or_else(|| format!("unknown gender `{value}`"))
}

fn parse_contract_status(value: &str) -> Result<ContractStatus, String> {
    ContractStatus::parse(value).ok_or_else(|| {
        let known: Vec<&str> = ContractStatus::ALL.iter().map(|s| s.as_db()).collect();
        format!("unknown status `{value}`, expected one of {}", known.join(", "))
    })
}

fn parse_kanban_status(value: &str) -> Result<KanbanStatus, String> {
    KanbanStatus::parse(value).ok_or_else(|| format!("unknown column `{value}`"))
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::parse(value).ok_or_else(|| format!("unknown priority `{value}`"))
}

fn parse_gift_type(value: &str) -> Result<GiftType, String> {
    GiftType::parse(value).ok_or_else(|| {
        let known: Vec<&str> = GiftType::ALL.iter().map(|g| g.label()).collect();
        format!("unknown gift type `{value}`, expected one of {}", known.join(", "))
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    let config = AppConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging.level, &config.logging.dir)?;
    let user = cli.user.as_deref();

    match cli.command {
        Commands::Words { kind, value } => words(kind, &value),
        Commands::Mask { kind, value } => {
            println!("{}", mask(kind, &value));
            Ok(())
        }
        Commands::Lookup { kind, value } => lookup(&config, kind, &value),
        Commands::Partner { command } => partner(&open_store(&config)?, command),
        Commands::Client { command } => client(&open_store(&config)?, &config, user, command),
        Commands::Contract { command } => contract(&open_store(&config)?, user, command),
        Commands::Kanban { command } => kanban(&open_store(&config)?, user, command),
        Commands::Crm { command } => crm(&open_store(&config)?, user, command),
        Commands::Proposal { command } => proposal(&open_store(&config)?, &config, user, command),
        Commands::Backup { command } => backup(&open_store(&config)?, &config, user, command),
        Commands::Log { command } => audit_log(&open_store(&config)?, command),
    }
}

fn open_store(config: &AppConfig) -> CliResult<Connection> {
    Ok(open_db(&config.storage.db_path)?)
}

fn audit_logger<'c>(conn: &'c Connection, user: Option<&str>) -> CliResult<AuditLogger<SqliteAuditRepository<'c>>> {
    Ok(AuditLogger::new(SqliteAuditRepository::try_new(conn)?, user))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn words(kind: WordsKind, value: &str) -> CliResult {
    let (amount, spelled) = match kind {
        WordsKind::Money => {
            let amount = money::parse_brl_amount(value);
            (amount, amount.map(extenso::currency_in_words))
        }
        WordsKind::Percent => {
            let amount = money::parse_percent_amount(value);
            (amount, amount.map(extenso::percent_in_words))
        }
    };
    match (amount, spelled) {
        (Some(_), Some(spelled)) if !spelled.is_empty() => {
            println!("{spelled}");
            Ok(())
        }
        _ => Err(format!("cannot read `{value}` as an amount").into()),
    }
}

fn mask(kind: MaskKind, value: &str) -> String {
    match kind {
        MaskKind::Date => masks::mask_date(value),
        MaskKind::Cpf => masks::mask_cpf(value),
        MaskKind::Cnpj => masks::mask_cnpj(value),
        MaskKind::Document => masks::mask_cpf_or_cnpj(value),
        MaskKind::Cep => masks::mask_cep(value),
        MaskKind::Phone => masks::mask_phone(value),
        MaskKind::Cnj => masks::mask_cnj(value),
        MaskKind::Hon => masks::mask_hon(value),
        MaskKind::Rg => masks::mask_rg(value),
        MaskKind::Money => masks::mask_money(value),
    }
}

fn lookup(config: &AppConfig, kind: LookupKind, value: &str) -> CliResult {
    let client = LookupClient::new(&config.lookup)?;
    let rendered = match kind {
        LookupKind::Cnpj => serde_json::to_string_pretty(&client.lookup_cnpj(value)?)?,
        LookupKind::Cep => serde_json::to_string_pretty(&client.lookup_cep(value)?)?,
    };
    println!("{rendered}");
    Ok(())
}

fn partner(conn: &Connection, command: PartnerCommand) -> CliResult {
    let repo = SqlitePartnerRepository::try_new(conn)?;
    match command {
        PartnerCommand::Add {
            name,
            email,
            cpf,
            gender,
            civil_status,
            nationality,
            oab_number,
            oab_state,
        } => {
            let mut partner = Partner::new(name);
            partner.email = email;
            partner.cpf = cpf.map(|cpf| masks::digits_only(&cpf));
            partner.gender = gender;
            partner.civil_status = civil_status;
            partner.nationality = nationality;
            partner.oab_number = oab_number;
            partner.oab_state = oab_state;
            let partner = partner.normalized();
            let id = repo.create_partner(&partner)?;
            println!("{id}");
        }
        PartnerCommand::List { all } => {
            for partner in repo.list_partners(!all)? {
                println!(
                    "{}\t{}\t{}",
                    partner.id,
                    partner.name,
                    partner.oab_number.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

fn client(conn: &Connection, config: &AppConfig, user: Option<&str>, command: ClientCommand) -> CliResult {
    let service = ClientService::new(SqliteClientRepository::try_new(conn)?, audit_logger(conn, user)?);
    match command {
        ClientCommand::Add {
            name,
            cnpj,
            person,
            email,
            phone,
            partner,
            lookup,
        } => {
            let mut client = Client::new(name);
            client.cnpj = cnpj.map(|cnpj| masks::digits_only(&cnpj));
            client.is_person = person;
            client.email = email;
            client.phone = phone;
            client.partner_id = partner;
            if lookup && !person {
                if let Some(cnpj) = client.cnpj.clone() {
                    let info = LookupClient::new(&config.lookup)?.lookup_cnpj(&cnpj)?;
                    client = merge_company_info(client, &info);
                }
            }
            let client = service.create_client(client)?;
            println!("{}", client.id);
        }
        ClientCommand::List { search } => {
            let query = ClientListQuery {
                search,
                ..ClientListQuery::default()
            };
            for client in service.list_clients(&query)? {
                println!(
                    "{}\t{}\t{}",
                    client.id,
                    client.name,
                    client
                        .cnpj
                        .as_deref()
                        .map(masks::mask_cpf_or_cnpj)
                        .unwrap_or_default()
                );
            }
        }
        ClientCommand::Export { out } => {
            let clients = service.list_clients(&ClientListQuery::default())?;
            let partner_names: HashMap<EntityId, String> = SqlitePartnerRepository::try_new(conn)?
                .list_partners(false)?
                .into_iter()
                .map(|partner| (partner.id, partner.name))
                .collect();
            write_export(&out, &clients_csv(&clients, &partner_names))?;
            println!("{}", out.display());
        }
    }
    Ok(())
}

fn contract(conn: &Connection, user: Option<&str>, command: ContractCommand) -> CliResult {
    let service = ContractService::new(SqliteContractRepository::try_new(conn)?, audit_logger(conn, user)?);
    match command {
        ContractCommand::Add {
            client_name,
            client,
            cnpj,
            partner,
            status,
            reference,
            observations,
        } => {
            let mut contract = Contract::new(client_name.unwrap_or_default(), status);
            contract.cnpj = cnpj;
            contract.partner_id = partner;
            if let Some(id) = client {
                let linked = SqliteClientRepository::try_new(conn)?
                    .get_client(id)?
                    .ok_or_else(|| format!("client not found: {id}"))?;
                contract.fill_from_client(&linked);
            }
            contract.reference = reference;
            contract.observations = observations;
            let contract = service.create_contract(contract, today())?;
            println!("{}\t#{}", contract.id, contract.seq_id);
        }
        ContractCommand::Status { id, to, date } => {
            let contract = service.change_status(id, to, date.unwrap_or_else(today))?;
            println!("#{}\t{}", contract.seq_id, contract.status.label());
            if let Some(duration) = service.total_duration(id)? {
                println!("{duration}");
            }
        }
        ContractCommand::List { status } => {
            let query = ContractListQuery {
                status,
                ..ContractListQuery::default()
            };
            for contract in service.list_contracts(&query)? {
                println!(
                    "{}\t#{}\t{}\t{}\t{}",
                    contract.id,
                    contract.seq_id,
                    contract.client_name,
                    contract.status.label(),
                    contract.effective_date().unwrap_or("-")
                );
            }
        }
        ContractCommand::Volumetry { out } => {
            let rows = service.volumetry()?;
            match out {
                Some(path) => {
                    write_export(&path, &volumetry_csv(&rows))?;
                    println!("{}", path.display());
                }
                None => {
                    for row in rows {
                        println!(
                            "{}\t{}\t{}",
                            row.status.label(),
                            row.partner_name.as_deref().unwrap_or("Sem sócio"),
                            row.count
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

fn kanban(conn: &Connection, user: Option<&str>, command: KanbanCommand) -> CliResult {
    let service = KanbanService::new(SqliteKanbanRepository::try_new(conn)?, audit_logger(conn, user)?);
    match command {
        KanbanCommand::Add {
            title,
            description,
            status,
            priority,
            due,
            contract,
        } => {
            let mut task = KanbanTask::new(title, status);
            task.description = description;
            task.priority = priority;
            task.due_date = due.map(|date| date.to_string());
            task.contract_id = contract;
            let task = service.create_task(task)?;
            println!("{}\t{}", task.id, task.position);
        }
        KanbanCommand::List => {
            for column in service.board()? {
                println!("== {} ({})", column.status.label(), column.tasks.len());
                for task in column.tasks {
                    println!(
                        "  {}\t{}\t{}\t{}",
                        task.position,
                        task.id,
                        task.priority.label(),
                        task.title
                    );
                }
            }
        }
        KanbanCommand::Move { id, to, position } => {
            let task = service.move_task(id, to, position)?;
            println!("{}\t{}", task.status.label(), task.position);
        }
        KanbanCommand::Delete { id } => service.delete_task(id)?,
    }
    Ok(())
}

fn crm(conn: &Connection, user: Option<&str>, command: CrmCommand) -> CliResult {
    let service = CrmService::new(SqliteCrmRepository::try_new(conn)?, audit_logger(conn, user)?);
    match command {
        CrmCommand::Add {
            client,
            name,
            role,
            email,
            phone,
            main,
            gift,
            gift_other,
        } => {
            let mut contact = CrmContact::new(client, name);
            contact.role = role;
            contact.email = email;
            contact.phone = phone;
            contact.is_main_contact = main;
            contact.gift_type = gift;
            contact.gift_other = gift_other;
            let contact = service.create_contact(contact)?;
            println!("{}", contact.id);
        }
        CrmCommand::List { client } => {
            for profile in service.list_contacts(client)? {
                println!(
                    "{}\t{}{}\t{}\t{}",
                    profile.contact.id,
                    profile.contact.name,
                    if profile.contact.is_main_contact { " *" } else { "" },
                    profile.client_name,
                    profile.contact.gift_type.map(GiftType::label).unwrap_or("-")
                );
            }
        }
        CrmCommand::Summary => {
            let summary = service.summary()?;
            println!("total\t{}", summary.total_contacts);
            for (gift, count) in summary.by_gift_type {
                println!("{}\t{count}", gift.map(GiftType::label).unwrap_or("Sem brinde"));
            }
            for (partner, count) in summary.by_partner {
                println!("{}\t{count}", partner.as_deref().unwrap_or("Sem sócio"));
            }
        }
        CrmCommand::Incomplete => {
            for item in service.incomplete_contacts()? {
                let missing: Vec<&str> = item.missing.iter().map(|field| field.label()).collect();
                println!(
                    "{}\t{}\t{}",
                    item.profile.contact.id,
                    item.profile.contact.name,
                    missing.join(", ")
                );
            }
        }
    }
    Ok(())
}

fn read_form(path: &Path) -> CliResult<ProposalForm> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| format!("cannot read form `{}`: {err}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

fn proposal(conn: &Connection, config: &AppConfig, user: Option<&str>, command: ProposalCommand) -> CliResult {
    let ProposalCommand::Render {
        form,
        out,
        preview,
        contract,
    } = command;

    let contracts = SqliteContractRepository::try_new(conn)?;
    let mut form = read_form(&form)?;
    if let Some(id) = contract {
        let stored = contracts
            .get_contract(id)?
            .ok_or_else(|| format!("contract not found: {id}"))?;
        let partners_repo = SqlitePartnerRepository::try_new(conn)?;
        let signing: Vec<Partner> = match stored.partner_id {
            Some(partner_id) => partners_repo.get_partner(partner_id)?.into_iter().collect(),
            None => Vec::new(),
        };
        form = form.with_defaults_from(ProposalForm::from_contract(&stored, &signing));
    }
    if form.location.is_none() {
        form.location = Some(config.firm.default_location.clone());
    }

    let service = ProposalService::new(
        contracts,
        audit_logger(conn, user)?,
        config.firm.clone(),
        &config.proposal,
    );
    let rendered = service.render(&RenderRequest {
        form: &form,
        contract_id: contract,
        docx_path: &out,
        preview_path: preview.as_deref(),
        today: today(),
    })?;
    println!("{}\t{} página(s)\t{}", rendered.code, rendered.page_count, rendered.docx_path.display());
    if let Some(path) = rendered.preview_path {
        println!("{}", path.display());
    }
    Ok(())
}

fn backup(conn: &Connection, config: &AppConfig, user: Option<&str>, command: BackupCommand) -> CliResult {
    let service = BackupService::new(
        conn,
        SqlitePreferenceRepository::try_new(conn)?,
        audit_logger(conn, user)?,
        config.backup.auto_hour,
    );
    let now = Local::now().naive_local();
    match command {
        BackupCommand::Run { out } => {
            let dir = out.unwrap_or_else(|| config.backup.dir.clone());
            let path = service.write_backup(&dir, now)?;
            println!("{}", path.display());
        }
        BackupCommand::Auto { enable } => {
            if let Some(enabled) = enable {
                service.set_automatic_enabled(enabled)?;
            }
            match service.check_and_run_automatic_backup(&config.backup.dir, now)? {
                AutoBackupOutcome::Disabled => println!("automatic backup disabled"),
                AutoBackupOutcome::TooEarly => {
                    println!("waiting until {:02}:00", config.backup.auto_hour)
                }
                AutoBackupOutcome::AlreadyDoneToday => println!("already done today"),
                AutoBackupOutcome::Written(path) => println!("{}", path.display()),
            }
        }
    }
    Ok(())
}

fn audit_log(conn: &Connection, command: LogCommand) -> CliResult {
    let LogCommand::List { module, limit } = command;
    let logger = audit_logger(conn, None)?;
    for entry in logger.recent(module.as_deref(), limit)? {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            entry.created_at, entry.user_email, entry.action, entry.module, entry.details.info
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawdesk_core::open_db_in_memory;

    fn add_command(client: Option<EntityId>, cnpj: Option<&str>) -> ContractCommand {
        ContractCommand::Add {
            client_name: None,
            client,
            cnpj: cnpj.map(str::to_string),
            partner: None,
            status: ContractStatus::Analysis,
            reference: None,
            observations: None,
        }
    }

    #[test]
    fn contract_add_copies_linked_client_document() {
        let conn = open_db_in_memory().unwrap();
        let mut client = Client::new("Maria Souza");
        client.is_person = true;
        client.cnpj = Some("12345678901".to_string());
        SqliteClientRepository::try_new(&conn)
            .unwrap()
            .create_client(&client)
            .unwrap();

        contract(&conn, None, add_command(Some(client.id), None)).unwrap();

        let stored = SqliteContractRepository::try_new(&conn)
            .unwrap()
            .list_contracts(&ContractListQuery::default())
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].client_id, Some(client.id));
        assert_eq!(stored[0].client_name, "Maria Souza");
        assert_eq!(stored[0].cnpj.as_deref(), Some("12345678901"));
    }

    #[test]
    fn contract_add_rejects_unknown_client() {
        let conn = open_db_in_memory().unwrap();
        let unknown = EntityId::new_v4();
        let err = contract(&conn, None, add_command(Some(unknown), Some("12345678000190")))
            .unwrap_err();
        assert!(err.to_string().contains("client not found"));
    }
}
