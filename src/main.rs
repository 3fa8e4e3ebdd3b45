use cardbank::application::engine::{BankEngine, DEFAULT_GENERATION_ATTEMPTS};
use cardbank::domain::generator::{CardFormat, ChecksumMode, NumberGenerator};
use cardbank::domain::ports::AccountStoreBox;
use cardbank::infrastructure::in_memory::InMemoryAccountStore;
#[cfg(feature = "storage-rocksdb")]
use cardbank::infrastructure::rocksdb::RocksDBStore;
use cardbank::interfaces::cli::Session;
use cardbank::interfaces::csv::account_writer::AccountWriter;
use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Major Industry Identifier: first digit of issued card numbers
    #[arg(long, global = true, default_value_t = 4)]
    mii: u8,

    /// Issuer Identification Number following the MII
    #[arg(long, global = true, default_value = "00000")]
    iin: String,

    /// Total length of issued card numbers, check digit included
    #[arg(long, global = true, default_value_t = 16)]
    length: usize,

    /// How the check digit of issued cards is chosen
    #[arg(long, global = true, value_enum, default_value_t = Checksum::Luhn)]
    checksum: Checksum,

    /// Card numbers drawn before account opening gives up on collisions
    #[arg(long, global = true, default_value_t = DEFAULT_GENERATION_ATTEMPTS)]
    max_attempts: usize,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Interactive banking menu (the default)
    Menu,
    /// Print every stored account as CSV
    Accounts,
}

#[derive(ValueEnum, Clone, Copy)]
enum Checksum {
    Luhn,
    Random,
}

impl From<Checksum> for ChecksumMode {
    fn from(checksum: Checksum) -> Self {
        match checksum {
            Checksum::Luhn => ChecksumMode::Luhn,
            Checksum::Random => ChecksumMode::Random,
        }
    }
}

fn open_store(db_path: Option<PathBuf>) -> Result<AccountStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryAccountStore::new()))
        }
        None => Ok(Box::new(InMemoryAccountStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the menu dialogue.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let format =
        CardFormat::new(cli.mii, cli.iin, cli.length, cli.checksum.into()).into_diagnostic()?;
    let engine = BankEngine::new(open_store(cli.db_path)?, NumberGenerator::new(format))
        .with_generation_attempts(cli.max_attempts);

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let session = Session::new(&engine, io::stdin().lock(), io::stdout().lock());
            session.run().await.into_diagnostic()?;
        }
        Command::Accounts => {
            let accounts = engine.accounts().await.into_diagnostic()?;
            let mut writer = AccountWriter::new(io::stdout().lock());
            writer.write_accounts(accounts).into_diagnostic()?;
        }
    }

    Ok(())
}
