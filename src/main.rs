use clap::Parser;
use gsheet_csv::api::{SheetsApi, spreadsheet_id_from};
use gsheet_csv::cli::Cli;
use gsheet_csv::config::Config;
use gsheet_csv::google_oauth::{Authenticator, LoopbackConsent};
use gsheet_csv::service::{ExportOptions, ExportOutcome, Exporter};
use gsheet_csv::{GsheetError, http::build_http_client};
use mimalloc::MiMalloc;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let cfg = match Config::load(&cli.config, cli.overrides()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        spreadsheet = %cfg.export.spreadsheet_id,
        range = %cfg.export.range,
        output = %cfg.export.output.display(),
        token = %cfg.auth.token_path.display(),
        proxy = %cfg.basic.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>")
    );

    match run(&cfg).await {
        Ok(ExportOutcome::Written { path, rows, .. }) => {
            info!(path = %path.display(), rows, "export finished");
            ExitCode::SUCCESS
        }
        Ok(ExportOutcome::EmptyRange) => {
            info!("range is empty; no file written");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "export failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cfg: &Config) -> Result<ExportOutcome, GsheetError> {
    let http = build_http_client(&cfg.basic)?;

    let consent = LoopbackConsent::new(
        http.clone(),
        cfg.auth.callback_port,
        Duration::from_secs(cfg.auth.consent_timeout_secs),
        cfg.auth.open_browser,
    );
    let credential = Authenticator::new(&cfg.auth, http.clone(), consent)
        .load_or_refresh()
        .await?;

    let exporter = Exporter::new(
        http,
        SheetsApi::new(cfg.basic.sheets_api_url.clone()),
        ExportOptions::from(cfg),
    );
    exporter
        .export(
            &credential,
            &spreadsheet_id_from(&cfg.export.spreadsheet_id),
            &cfg.export.range,
            &cfg.export.output,
        )
        .await
}
