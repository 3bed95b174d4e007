use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::LedgerService;
use crate::domain::{
    DebtType, NewParty, NewTransaction, Party, PartyId, PartyKind, PartyPatch, SettingsPatch,
    format_amount, format_money, parse_amount,
};
use crate::storage::{CorruptionPolicy, DEFAULT_DATA_FILE};

/// Kinash - shop bookkeeping for customers, suppliers and debts
#[derive(Parser)]
#[command(name = "kinash")]
#[command(about = "Track customer and supplier debts in a single JSON ledger")]
#[command(version)]
pub struct Cli {
    /// Ledger file path
    #[arg(short, long, env = "KINASH_DATA", default_value = DEFAULT_DATA_FILE)]
    pub data: String,

    /// Fail on an unreadable ledger instead of resetting it to defaults
    #[arg(long, global = true)]
    pub strict: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the ledger file with default settings
    Init,

    /// Customer management commands
    #[command(subcommand)]
    Customer(PartyCommands),

    /// Supplier management commands
    #[command(subcommand)]
    Supplier(PartyCommands),

    /// Debt transactions
    #[command(subcommand)]
    Tx(TxCommands),

    /// Shop overview: counts, outstanding debts, newest parties
    Dashboard,

    /// List party categories
    Categories {
        /// Only categories for: customer, supplier
        #[arg(long)]
        kind: Option<String>,
    },

    /// Show or change shop settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Verify stored balances against transaction history
    Check,

    /// Export data to CSV or JSON
    Export {
        /// What to export: transactions, customers, suppliers, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PartyCommands {
    /// Add a new party
    Add {
        /// Display name
        name: String,

        #[arg(short, long)]
        phone: Option<String>,

        /// Category name (see `kinash categories`)
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Update fields of a party; omitted fields are kept, an empty value clears one
    Update {
        id: PartyId,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        phone: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete a party (its transactions are kept)
    Delete { id: PartyId },

    /// Show a party and its transactions
    Show { id: PartyId },

    /// List all parties
    List,
}

#[derive(Subcommand)]
pub enum TxCommands {
    /// Record a debt movement
    Add {
        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Customer id
        #[arg(long, conflicts_with = "supplier", required_unless_present = "supplier")]
        customer: Option<PartyId>,

        /// Supplier id
        #[arg(long)]
        supplier: Option<PartyId>,

        /// Debt type: taken (balance grows) or given (balance shrinks)
        #[arg(long, default_value = "taken")]
        debt: String,

        /// Date of the debt (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        #[arg(short, long)]
        notes: Option<String>,

        /// Record even if the party does not exist (no balance is changed)
        #[arg(long)]
        allow_orphan: bool,
    },

    /// List all transactions
    List,
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show current settings
    Show,

    /// Change settings; omitted values are kept
    Set {
        #[arg(long)]
        theme: Option<String>,

        #[arg(long)]
        language: Option<String>,

        #[arg(long)]
        currency: Option<String>,

        #[arg(long)]
        shop_name: Option<String>,

        /// Hide balances on screen: true or false
        #[arg(long)]
        hide_balance: Option<bool>,
    },
}

impl Cli {
    /// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
    pub fn init_tracing(&self) {
        let default_level = if self.verbose { "kinash=debug" } else { "kinash=warn" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    fn policy(&self) -> CorruptionPolicy {
        if self.strict {
            CorruptionPolicy::Fail
        } else {
            CorruptionPolicy::ReinitializeOnCorruption
        }
    }

    pub async fn run(self) -> Result<()> {
        let (service, created) = LedgerService::init(&self.data, self.policy())
            .await
            .with_context(|| format!("Failed to open ledger {}", self.data))?;

        run_command(&service, created, self.command).await
    }
}

/// Dispatch one command. `created` tells whether opening the ledger wrote a fresh document.
async fn run_command(service: &LedgerService, created: bool, command: Commands) -> Result<()> {
    match command {
        Commands::Init => {
            let path = service.path().display();
            if created {
                println!("Ledger initialized: {}", path);
            } else {
                println!("Ledger already exists: {}", path);
            }
        }

        Commands::Customer(cmd) => run_party_command(service, PartyKind::Customer, cmd).await?,

        Commands::Supplier(cmd) => run_party_command(service, PartyKind::Supplier, cmd).await?,

        Commands::Tx(cmd) => run_tx_command(service, cmd).await?,

        Commands::Dashboard => run_dashboard_command(service).await?,

        Commands::Categories { kind } => {
            let kind = kind.as_deref().map(parse_kind).transpose()?;
            let categories = service.categories(kind).await?;
            println!("{:<4} {:<20} {:<10}", "ID", "NAME", "TYPE");
            println!("{}", "-".repeat(36));
            for category in categories {
                println!("{:<4} {:<20} {:<10}", category.id, category.name, category.kind.as_str());
            }
        }

        Commands::Settings(cmd) => run_settings_command(service, cmd).await?,

        Commands::Check => run_check_command(service).await?,

        Commands::Export {
            export_type,
            output,
        } => run_export_command(service, &export_type, output.as_deref()).await?,
    }
    Ok(())
}

async fn run_party_command(service: &LedgerService, kind: PartyKind, cmd: PartyCommands) -> Result<()> {
    match cmd {
        PartyCommands::Add {
            name,
            phone,
            category,
            notes,
        } => {
            let fields = NewParty {
                name,
                phone,
                category,
                notes,
            };
            let party = service.create_party(kind, fields).await?;
            println!("Added {} #{}: {}", kind, party.id, party.name);
        }

        PartyCommands::Update {
            id,
            name,
            phone,
            category,
            notes,
        } => {
            let patch = PartyPatch {
                name,
                phone,
                category,
                notes,
            };
            let party = service.update_party(kind, id, patch).await?;
            println!("Updated {} #{}: {}", kind, party.id, party.name);
        }

        PartyCommands::Delete { id } => {
            service.delete_party(kind, id).await?;
            println!("Deleted {} #{}", kind, id);
        }

        PartyCommands::Show { id } => {
            let settings = service.settings().await?;
            let detail = service.get_party_detail(kind, id).await?;
            let party = &detail.party;

            print_party(kind, party);
            if !settings.hide_balance {
                println!("  Balance:   {}", format_money(party.balance, &settings.currency));
            }
            println!();

            if detail.transactions.is_empty() {
                println!("No transactions.");
            } else {
                println!("{:<6} {:<12} {:<8} {:>12} NOTES", "ID", "DATE", "DEBT", "AMOUNT");
                println!("{}", "-".repeat(52));
                for tx in &detail.transactions {
                    println!(
                        "{:<6} {:<12} {:<8} {:>12} {}",
                        tx.id,
                        tx.date
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| tx.created_at.format("%Y-%m-%d").to_string()),
                        tx.debt_type,
                        format_amount(tx.amount),
                        tx.notes.as_deref().unwrap_or("")
                    );
                }
            }
        }

        PartyCommands::List => {
            let settings = service.settings().await?;
            let parties = service.list_parties(kind).await?;
            if parties.is_empty() {
                println!("No {}s found.", kind);
            } else {
                println!("{:<6} {:<24} {:<14} {:>14}", "ID", "NAME", "PHONE", "BALANCE");
                println!("{}", "-".repeat(60));
                for party in parties {
                    let balance = if settings.hide_balance {
                        "***".to_string()
                    } else {
                        format_amount(party.balance)
                    };
                    println!(
                        "{:<6} {:<24} {:<14} {:>14}",
                        party.id,
                        party.name,
                        party.phone.as_deref().unwrap_or(""),
                        balance
                    );
                }
            }
        }
    }
    Ok(())
}

fn print_party(kind: PartyKind, party: &Party) {
    println!("{} #{}: {}", capitalize(kind.as_str()), party.id, party.name);
    if let Some(phone) = &party.phone {
        println!("  Phone:     {}", phone);
    }
    if let Some(category) = &party.category {
        println!("  Category:  {}", category);
    }
    if let Some(notes) = &party.notes {
        println!("  Notes:     {}", notes);
    }
    println!("  Created:   {}", party.created_at.format("%Y-%m-%d %H:%M:%S"));
}

async fn run_tx_command(service: &LedgerService, cmd: TxCommands) -> Result<()> {
    match cmd {
        TxCommands::Add {
            amount,
            customer,
            supplier,
            debt,
            date,
            notes,
            allow_orphan,
        } => {
            let amount = parse_amount(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
            let debt_type = DebtType::from_str(&debt).ok_or_else(|| {
                anyhow::anyhow!("Invalid debt type '{}'. Valid types: taken, given", debt)
            })?;
            let (kind, person_id) = match (customer, supplier) {
                (Some(id), _) => (PartyKind::Customer, id),
                (None, Some(id)) => (PartyKind::Supplier, id),
                (None, None) => anyhow::bail!("Either --customer or --supplier is required"),
            };

            let mut fields = NewTransaction::new(kind, person_id, debt_type, amount);
            if let Some(date_str) = date {
                fields = fields.with_date(parse_date(&date_str)?);
            }
            if let Some(notes) = notes {
                fields = fields.with_notes(notes);
            }

            let tx = service.record_transaction(fields, allow_orphan).await?;
            println!(
                "Recorded transaction #{}: {} {} {} #{}",
                tx.id,
                format_amount(tx.amount),
                tx.debt_type,
                kind,
                tx.person_id
            );
        }

        TxCommands::List => {
            let transactions = service.list_transactions().await?;
            if transactions.is_empty() {
                println!("No transactions found.");
            } else {
                println!(
                    "{:<6} {:<14} {:<8} {:<8} {:>12} NOTES",
                    "ID", "TYPE", "PARTY", "DEBT", "AMOUNT"
                );
                println!("{}", "-".repeat(60));
                for tx in transactions {
                    println!(
                        "{:<6} {:<14} {:<8} {:<8} {:>12} {}",
                        tx.id,
                        tx.tx_type,
                        tx.person_id,
                        tx.debt_type,
                        format_amount(tx.amount),
                        tx.notes.as_deref().unwrap_or("")
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_dashboard_command(service: &LedgerService) -> Result<()> {
    let dashboard = service.dashboard().await?;
    let money = |amount| {
        if dashboard.hide_balance {
            "***".to_string()
        } else {
            format_money(amount, &dashboard.currency)
        }
    };

    println!("{}", dashboard.shop_name);
    if dashboard.in_trial {
        println!(
            "Trial ends {}",
            dashboard.trial_end_date.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
    println!("Customers:       {:>6}", dashboard.customers_count);
    println!("Suppliers:       {:>6}", dashboard.suppliers_count);
    println!("Customers debt:  {:>18}", money(dashboard.customers_debt));
    println!("Suppliers debt:  {:>18}", money(dashboard.suppliers_debt));
    println!("Cash balance:    {:>18}", money(dashboard.cash_balance));

    for (title, parties) in [
        ("Recent customers", &dashboard.recent_customers),
        ("Recent suppliers", &dashboard.recent_suppliers),
    ] {
        if parties.is_empty() {
            continue;
        }
        println!();
        println!("{}:", title);
        for party in parties {
            println!("  #{:<5} {:<24} {:>14}", party.id, party.name, money(party.balance));
        }
    }
    Ok(())
}

async fn run_settings_command(service: &LedgerService, cmd: SettingsCommands) -> Result<()> {
    let settings = match cmd {
        SettingsCommands::Show => service.settings().await?,
        SettingsCommands::Set {
            theme,
            language,
            currency,
            shop_name,
            hide_balance,
        } => {
            let patch = SettingsPatch {
                theme,
                language,
                currency,
                shop_name,
                hide_balance,
            };
            service.update_settings(patch).await?
        }
    };

    println!("Shop name:     {}", settings.shop_name);
    println!("Currency:      {}", settings.currency);
    println!("Language:      {}", settings.language);
    println!("Theme:         {}", settings.theme);
    println!("Hide balance:  {}", if settings.hide_balance { "yes" } else { "no" });
    println!("Activated:     {}", if settings.is_activated { "yes" } else { "no" });
    println!(
        "Trial ends:    {}",
        settings.trial_end_date.format("%Y-%m-%d %H:%M:%S")
    );
    Ok(())
}

async fn run_check_command(service: &LedgerService) -> Result<()> {
    println!("Checking ledger integrity...\n");

    let report = service.check_integrity().await?;

    println!("Customers:    {}", report.customer_count);
    println!("Suppliers:    {}", report.supplier_count);
    println!("Transactions: {}", report.transaction_count);
    println!();

    if report.is_healthy() {
        println!("Ledger is consistent.");
        return Ok(());
    }

    println!("Issues found:");
    for m in &report.balance_mismatches {
        println!(
            "  - {} #{} ({}): stored balance {}, transactions sum to {}",
            m.kind,
            m.party_id,
            m.name,
            format_amount(m.stored),
            format_amount(m.computed)
        );
    }
    for id in &report.orphaned_transactions {
        println!("  - transaction #{} references a missing party", id);
    }
    for (kind, id) in &report.duplicate_party_ids {
        println!("  - duplicate {} id #{}", kind, id);
    }
    for id in &report.duplicate_transaction_ids {
        println!("  - duplicate transaction id #{}", id);
    }
    for id in &report.invalid_amounts {
        println!("  - transaction #{} has a non-positive amount", id);
    }
    anyhow::bail!("Ledger integrity check failed");
}

/// What `kinash export` writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportTarget {
    Transactions,
    Parties(PartyKind),
    Full,
}

impl ExportTarget {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "transactions" => Ok(ExportTarget::Transactions),
            "customers" => Ok(ExportTarget::Parties(PartyKind::Customer)),
            "suppliers" => Ok(ExportTarget::Parties(PartyKind::Supplier)),
            "full" => Ok(ExportTarget::Full),
            _ => anyhow::bail!(
                "Invalid export type '{}'. Valid types: transactions, customers, suppliers, full",
                s
            ),
        }
    }
}

async fn run_export_command(
    service: &LedgerService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    // Validate before touching the output file
    let target = ExportTarget::parse(export_type)?;
    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match target {
        ExportTarget::Transactions => {
            let count = exporter.export_transactions_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} transactions", count);
            }
        }
        ExportTarget::Parties(kind) => {
            let count = exporter.export_parties_csv(kind, writer).await?;
            if output.is_some() {
                eprintln!("Exported {} {}s", count, kind);
            }
        }
        ExportTarget::Full => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full ledger: {} customers, {} suppliers, {} transactions",
                    snapshot.ledger.customers.len(),
                    snapshot.ledger.suppliers.len(),
                    snapshot.ledger.transactions.len()
                );
            }
        }
    }

    Ok(())
}

fn parse_kind(s: &str) -> Result<PartyKind> {
    PartyKind::from_str(s)
        .ok_or_else(|| anyhow::anyhow!("Invalid kind '{}'. Valid kinds: customer, supplier", s))
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
