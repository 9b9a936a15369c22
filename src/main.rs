use clap::Parser;
use comanda::application::engine::FloorEngine;
use comanda::config::EngineConfig;
use comanda::domain::ports::SharedOrderStore;
use comanda::infrastructure::in_memory::InMemoryOrderStore;
use comanda::interfaces::csv::script_reader::ScriptReader;
use comanda::interfaces::csv::summary_writer::SummaryWriter;
use comanda::interfaces::script::ScriptRunner;
use comanda::telemetry;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Floor script CSV file
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "COMANDA_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Retries for a mutation that lost a concurrent write race
    #[arg(long, env = "COMANDA_MAX_RETRIES", default_value_t = EngineConfig::default().max_conflict_retries)]
    max_conflict_retries: u32,

    /// Park closed dine-in orders until the table is cleaned
    #[arg(long, env = "COMANDA_CLEANING_STEP")]
    cleaning_step: bool,
}

impl Cli {
    fn config(&self) -> EngineConfig {
        EngineConfig {
            max_conflict_retries: self.max_conflict_retries,
            cleaning_step: self.cleaning_step,
            ..EngineConfig::default()
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(cli: &Cli, config: &EngineConfig) -> Result<SharedOrderStore> {
    use comanda::infrastructure::rocksdb::RocksDBStore;

    if let Some(db_path) = &cli.db_path {
        let store = RocksDBStore::open(db_path, config.feed_capacity).into_diagnostic()?;
        return Ok(Arc::new(store));
    }
    Ok(Arc::new(InMemoryOrderStore::with_capacity(config.feed_capacity)))
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(cli: &Cli, config: &EngineConfig) -> Result<SharedOrderStore> {
    if cli.db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(Arc::new(InMemoryOrderStore::with_capacity(config.feed_capacity)))
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();
    let config = cli.config();

    let store = open_store(&cli, &config)?;
    let engine = FloorEngine::new(store, config);
    let runner = ScriptRunner::new(engine.clone());

    // Replay the script
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = ScriptReader::new(file);
    for (index, row) in reader.rows().enumerate() {
        // Header is line 1
        let line = index + 2;
        match row {
            Ok(row) => {
                if let Err(e) = runner.run(row).await {
                    eprintln!("Error processing row {line}: {e}");
                }
            }
            Err(e) => {
                eprintln!("Error reading row {line}: {e}");
            }
        }
    }

    // Output final state
    let orders = engine.orders().all_orders().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = SummaryWriter::new(stdout.lock());
    writer.write_orders(&orders).into_diagnostic()?;

    Ok(())
}
