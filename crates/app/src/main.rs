mod args;
mod exam_cli;
mod render;

use args::{Args, Command, ProgressAction, print_usage};
use services::{ApiConfig, AppServices, Clock, ExamApi, ExamConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout stays clean for the exam transcript.
fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

/// Make sure the directory of a file-backed database exists; `SQLite`
/// creates the file itself.
fn prepare_sqlite_dir(db_url: &str) -> std::io::Result<()> {
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    match std::path::Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.is_empty() || matches!(argv[0].as_str(), "--help" | "-h" | "help") {
        print_usage();
        return Ok(());
    }

    let parsed = Args::parse(argv, std::env::var("NIHONGO_DB_URL").ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    setup_logging(parsed.verbose);

    let mut api_config = ApiConfig::from_env()?;
    if let Some(base_url) = &parsed.api_base_url {
        let token_config = api_config;
        api_config = ApiConfig::new(base_url)?;
        if let Some(token) = token_config.token() {
            api_config = api_config.with_token(token);
        }
    }
    let media_base = api_config.base_url().clone();

    prepare_sqlite_dir(&parsed.db_url)?;
    let services = AppServices::new_sqlite(
        &parsed.db_url,
        api_config,
        ExamConfig::from_env(),
        Clock::default(),
    )
    .await?;
    info!(db = %parsed.db_url, api = %media_base, "services ready");

    match parsed.command {
        Command::Tests { level } => {
            let summaries = services.api().list_tests(level).await?;
            render::print_test_list(&summaries);
        }
        Command::Exam { test_id } => {
            exam_cli::run_exam(services.exam_session(), test_id, &media_base).await?;
        }
        Command::Review { attempt_id } => {
            let review = services.api().fetch_attempt(attempt_id).await?;
            render::print_review(&review, &media_base);
        }
        Command::Progress { lesson_id, action } => {
            let progress = services.lesson_progress();
            let record = match action {
                ProgressAction::Show => progress.load(lesson_id).await,
                ProgressAction::Advance { total_items } => {
                    progress.advance(lesson_id, total_items).await
                }
                ProgressAction::Reset => {
                    progress.reset(lesson_id).await;
                    progress.load(lesson_id).await
                }
            };
            render::print_progress(&record);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
