use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use reana_api::ReanaClient;
use reana_util::{DashboardConfig, default_data_file, expand_tilde};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "tui.log";

/// Terminal dashboard for one REANA workflow.
#[derive(Debug, Parser)]
#[command(name = "reana", version, about)]
struct Cli {
    /// Workflow UUID or `name.run_number` reference
    workflow: String,

    /// REANA server base URL (overrides REANA_SERVER_URL and the config file)
    #[arg(long)]
    server_url: Option<String>,

    /// Access token (overrides REANA_ACCESS_TOKEN and the config file)
    #[arg(long)]
    access_token: Option<String>,

    /// Seconds between refreshes; 0 disables polling
    #[arg(long)]
    polling_secs: Option<u64>,

    /// Log file; the terminal belongs to the dashboard
    #[arg(long, env = "REANA_TUI_LOG_PATH")]
    log_file: Option<String>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut DashboardConfig) {
        if let Some(url) = self.server_url.as_deref().filter(|url| !url.trim().is_empty()) {
            config.server_url = url.trim().to_string();
        }
        if let Some(token) = self.access_token.as_deref().filter(|token| !token.is_empty()) {
            config.access_token = Some(token.to_string());
        }
        if let Some(secs) = self.polling_secs {
            config.polling_secs = Some(secs);
        }
    }

    fn log_path(&self) -> PathBuf {
        match self.log_file.as_deref().filter(|path| !path.trim().is_empty()) {
            Some(path) => expand_tilde(path),
            None => default_data_file(LOG_FILE_NAME),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_path());

    let mut config = DashboardConfig::load().context("load dashboard configuration")?;
    cli.apply_overrides(&mut config);
    info!(server_url = %config.server_url, workflow = %cli.workflow, "starting dashboard");

    let client = ReanaClient::new(&config.server_url, config.access_token.clone())
        .with_context(|| format!("create client for {}", config.server_url))?;
    reana_tui::run(config, Arc::new(client), cli.workflow).await
}

/// Send tracing output to `path`. Logging stays off when the file cannot
/// be opened, since stderr is covered by the dashboard.
fn init_tracing(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}
