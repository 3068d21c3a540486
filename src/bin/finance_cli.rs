use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use finance_tracker::application::tracker::FinanceTracker;
use finance_tracker::data::http_gateway::HttpGateway;
use finance_tracker::data::session_storage::FileSessionStorage;
use finance_tracker::domain::models::{Amount, Category, PaymentMethod, RecordDraft, RecordPatch};
use finance_tracker::infrastructure::config::ClientConfig;
use finance_tracker::infrastructure::logging::init_cli_logging;

type Tracker = FinanceTracker<HttpGateway, HttpGateway, FileSessionStorage>;

/// Track personal income and expenses against a finance API.
#[derive(Parser, Debug)]
#[command(name = "finance-cli", version, about, long_about = None)]
struct Cli {
    /// Base URL of the finance API. Overrides FINANCE_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where the logged-in session is kept. Overrides FINANCE_SESSION_FILE.
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and log in as it.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// List your transactions.
    List,
    /// Record a transaction. Use a negative amount for an expense.
    Add(AddArgs),
    /// Change some fields of a transaction.
    Update(UpdateArgs),
    Delete {
        id: String,
    },
    /// Totals for the dashboard.
    Summary,
}

#[derive(Args, Debug)]
struct AddArgs {
    #[arg(long, allow_hyphen_values = true)]
    amount: Amount,
    #[arg(long)]
    category: String,
    #[arg(long, default_value = "")]
    description: String,
    /// YYYY-MM-DD, defaults to today.
    #[arg(long, value_parser = parse_date)]
    date: Option<DateTime<Utc>>,
    #[arg(long, default_value = "Cash")]
    payment_method: String,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    id: String,
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<Amount>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, value_parser = parse_date)]
    date: Option<DateTime<Utc>>,
    #[arg(long)]
    payment_method: Option<String>,
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("'{raw}' is not a YYYY-MM-DD date"))?;
    Ok(midnight_utc(date))
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

#[tokio::main]
async fn main() -> ExitCode {
    init_cli_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(session_file) = cli.session_file {
        config.session_file = session_file;
    }

    let mut tracker = FinanceTracker::over_http(
        HttpGateway::new(config.api_url),
        FileSessionStorage::new(config.session_file),
    );

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let session = tracker.register(&username, &email, &password).await?;
            println!("Registered and logged in as {}", session.username);
        }
        Command::Login { username, password } => {
            let session = tracker.login(&username, &password).await?;
            println!(
                "Logged in as {} ({} records)",
                session.username,
                tracker.records().len()
            );
        }
        Command::Logout => {
            tracker.logout();
            println!("Logged out");
        }
        Command::Whoami => match tracker.session() {
            Some(session) => println!("{} <{}> id={}", session.username, session.email, session.id),
            None => println!("Not logged in"),
        },
        Command::List => {
            load(&mut tracker).await?;
            print_records(&tracker);
        }
        Command::Add(args) => {
            load(&mut tracker).await?;
            let draft = RecordDraft {
                date: args.date.unwrap_or_else(|| midnight_utc(Utc::now().date_naive())),
                description: args.description,
                amount: args.amount,
                category: Category::from(args.category),
                payment_method: PaymentMethod::from(args.payment_method),
            };
            let record = tracker.add_record(draft).await?;
            println!("Added {} ({})", record.id, record.amount);
        }
        Command::Update(args) => {
            load(&mut tracker).await?;
            let patch = RecordPatch {
                date: args.date,
                description: args.description,
                amount: args.amount,
                category: args.category.map(Category::from),
                payment_method: args.payment_method.map(PaymentMethod::from),
            };
            if patch.is_empty() {
                bail!("nothing to update; pass at least one field");
            }
            tracker.update_record(&args.id, patch).await?;
            println!("Updated {}", args.id);
        }
        Command::Delete { id } => {
            load(&mut tracker).await?;
            tracker.delete_record(&id).await?;
            println!("Deleted {id}");
        }
        Command::Summary => {
            load(&mut tracker).await?;
            let summary = tracker.summary();
            println!("Total:    {:>12}", summary.total);
            println!("Income:   {:>12}", summary.income);
            println!("Expenses: {:>12}", summary.expenses);
            println!("Records:  {:>12}", summary.count);
            for (category, amount) in &summary.by_category {
                println!("  {category:<20} {amount:>12}");
            }
        }
    }
    Ok(())
}

/// Requires a session and loads its records. A failed fetch only warns,
/// leaving an empty list, like the dashboard does.
async fn load(tracker: &mut Tracker) -> Result<()> {
    if !tracker.is_authenticated() {
        bail!("not logged in; run `finance-cli login` first");
    }
    if let Err(e) = tracker.start().await {
        eprintln!("warning: could not load records: {e}");
    }
    Ok(())
}

fn print_records(tracker: &Tracker) {
    let records = tracker.records();
    if records.is_empty() {
        println!("No records");
        return;
    }
    println!(
        "{:<36}  {:<10}  {:<24}  {:<18}  {:<14}  {:>12}",
        "ID", "DATE", "DESCRIPTION", "CATEGORY", "PAYMENT", "AMOUNT"
    );
    for record in records {
        println!(
            "{:<36}  {:<10}  {:<24}  {:<18}  {:<14}  {:>12}",
            record.id,
            record.date.format("%Y-%m-%d"),
            record.description,
            record.category,
            record.payment_method,
            record.amount
        );
    }
    println!("Total: {}", tracker.summary().total);
}
