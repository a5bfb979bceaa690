use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use shared_config::AppConfig;
use shared_database::{Database, PostgresDatabase};
use shared_models::AppError;
use shared_utils::Console;

#[derive(Parser, Debug)]
#[command(name = "hospital-desk")]
#[command(version = "0.1.0")]
#[command(about = "Console front end for the hospital appointment database")]
struct CliArgs {
    #[arg(value_name = "DBNAME")]
    db_name: String,

    #[arg(value_name = "PORT")]
    port: u16,

    #[arg(value_name = "USER")]
    user: String,

    /// Database host, overrides DB_HOST
    #[arg(long, value_name = "HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Loading Env Vars
    dotenv().ok();

    // Logs go to stderr, the menu owns stdout
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error - {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().with_target(&args.db_name, args.port, &args.user);
    if let Some(host) = args.host.as_deref() {
        config = config.with_host(host);
    }
    anyhow::ensure!(config.is_configured(), "incomplete connection settings: {}", config.connection_summary());

    let mut console = Console::stdio(config.prompt_max_attempts);

    if config.db_password.is_none() {
        config = config.with_password(read_password(&mut console).context("no password given")?);
    }

    console.print("Connecting to database...")?;
    console.println(&format!("Connection URL: {}\n", config.connection_url()))?;

    let db: Arc<dyn Database> = Arc::new(
        PostgresDatabase::open(&config)
            .await
            .with_context(|| format!("Unable to Connect to Database {}", config.connection_summary()))?,
    );
    console.println("Done")?;
    info!("Session started for {}", config.connection_summary());

    let outcome = router::run_menu(Arc::clone(&db), &mut console).await;

    console.print("Disconnecting from database...")?;
    db.close().await;
    console.println("Done\n\nBye !")?;

    outcome.context("console session ended unexpectedly")
}

/// The console cannot mask keystrokes, so the prompt says so.
fn read_password(console: &mut Console) -> Result<String, AppError> {
    console.read_line("Password (input is visible): ")
}
