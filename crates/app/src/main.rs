mod config;
mod logger;
mod terminal;

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{BankService, Clock, JsonFileSource, QuizLoopService, SessionStore};
use storage::repository::Storage;
use tracing::info;

use config::{Config, prepare_sqlite_file, print_usage};
use terminal::Terminal;

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()
        .with_args(std::env::args().skip(1))
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;
    let settings = config.settings()?;

    // Storage is opened in the binary glue so core/services stay free of I/O setup.
    let storage = if config.in_memory {
        Storage::in_memory()
    } else {
        prepare_sqlite_file(&config.db_url)?;
        Storage::sqlite(&config.db_url).await?
    };

    let bank = BankService::new(Arc::new(JsonFileSource::new(&config.questions)));
    // Fail before the menu if the question file is unusable.
    bank.ensure_loaded().await?;

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    info!(
        questions = %config.questions.display(),
        db = if config.in_memory { "memory" } else { config.db_url.as_str() },
        seed = ?config.seed,
        "trainer starting"
    );

    let service = QuizLoopService::new(bank, SessionStore::new(storage.kv))
        .with_clock(Clock::default())
        .with_settings(settings);
    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut terminal = Terminal::new(service, rng, input, std::io::stdout());
    terminal.run().await
}

#[tokio::main]
async fn main() {
    logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
