//! txsearch main entry point

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use txsearch_client::{OpenSearchStore, StoreRef};
use txsearch_config::Config;
use txsearch_core::{Merchant, Transaction, TransactionService};

#[derive(Parser, Debug)]
#[command(name = "txsearch")]
#[command(version = "0.1.0")]
#[command(about = "Transaction search and persistence over a document store", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List transactions, optionally bounded by inclusive calendar dates
    List {
        /// Earliest date to include (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Latest date to include (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Run a raw query DSL fragment against the store
    Query {
        /// JSON query fragment, either a bare clause or a {"query": ...} envelope
        fragment: String,
    },
    /// Fetch a single transaction by id
    Get { id: String },
    /// Create a transaction; the id is generated when omitted
    Create {
        #[arg(long)]
        id: Option<String>,
        /// Timestamp (YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        date: Option<NaiveDateTime>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        merchant_name: Option<String>,
        #[arg(long)]
        merchant_category: Option<String>,
    },
    /// Patch a transaction; omitted fields stay unchanged
    Update {
        id: String,
        /// Timestamp (YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        date: Option<NaiveDateTime>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        merchant_name: Option<String>,
        #[arg(long)]
        merchant_category: Option<String>,
    },
    /// Delete a transaction by id
    Delete { id: String },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let rt = Runtime::new()?;

    rt.block_on(run(args))
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::load(args.config)?;
    log::info!(
        "store configured at {} (index {})",
        config.store_url(),
        config.store.index
    );

    let store: StoreRef = Arc::new(OpenSearchStore::new(&config)?);
    let service = TransactionService::new(store, &config);

    match args.command {
        Command::List {
            start_date,
            end_date,
            limit,
            offset,
        } => {
            let transactions = service
                .find_by_filters(start_date, end_date, limit, offset)
                .await?;
            print_json(&transactions)
        }
        Command::Query { fragment } => {
            let transactions = service.search_by_dsl(&fragment).await?;
            print_json(&transactions)
        }
        Command::Get { id } => match service.get_by_id(&id).await? {
            Some(transaction) => print_json(&transaction),
            None => {
                eprintln!("transaction {} not found", id);
                Ok(())
            }
        },
        Command::Create {
            id,
            date,
            amount,
            description,
            merchant_name,
            merchant_category,
        } => {
            let transaction = Transaction {
                id,
                date,
                amount,
                description,
                merchant: merchant(merchant_name, merchant_category),
            };
            let stored = service.create(transaction).await?;
            print_json(&stored)
        }
        Command::Update {
            id,
            date,
            amount,
            description,
            merchant_name,
            merchant_category,
        } => {
            let patch = Transaction {
                id: None,
                date,
                amount,
                description,
                merchant: merchant(merchant_name, merchant_category),
            };
            match service.update(&id, patch).await? {
                Some(updated) => print_json(&updated),
                None => {
                    eprintln!("transaction {} not found", id);
                    Ok(())
                }
            }
        }
        Command::Delete { id } => {
            service.delete(&id).await?;
            Ok(())
        }
    }
}

fn merchant(name: Option<String>, category: Option<String>) -> Option<Merchant> {
    if name.is_none() && category.is_none() {
        None
    } else {
        Some(Merchant { name, category })
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
