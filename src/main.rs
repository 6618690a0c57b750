mod api;
mod app;
mod config;
mod models;
mod services;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use api::{HttpMessageSource, MessageSource};
use app::App;
use services::{ClientSettings, Database, SettingsService};

#[derive(Parser, Debug)]
#[command(name = "scarlet")]
#[command(about = "Terminal chat client for ScarletAgent", long_about = None)]
struct Cli {
    /// Server base URL
    #[arg(long, env = "SCARLET_SERVER")]
    server: Option<String>,

    /// Account to log in with
    #[arg(long, short, env = "SCARLET_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "SCARLET_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Seconds between notification polls
    #[arg(long)]
    poll_secs: Option<u64>,

    /// Transcript width in columns
    #[arg(long)]
    width: Option<u16>,

    /// Hide the role avatars
    #[arg(long)]
    no_avatars: bool,

    /// Settings database path
    #[arg(long)]
    db: Option<PathBuf>,
}

impl Cli {
    fn apply_to(&self, settings: &mut ClientSettings) {
        if let Some(server) = &self.server {
            settings.server_url = server.clone();
        }
        if let Some(username) = &self.username {
            settings.last_username = Some(username.trim().to_lowercase());
        }
        if let Some(secs) = self.poll_secs {
            settings.poll_secs = secs;
        }
        if let Some(width) = self.width {
            settings.bubble_width = width;
        }
        if self.no_avatars {
            settings.show_avatars = false;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let db = Database::open(cli.db.as_deref()).await?;
    let mut settings = SettingsService::load(&db).await;
    cli.apply_to(&mut settings);
    if let Err(e) = SettingsService::save(&db, &settings).await {
        tracing::warn!("Failed to save settings: {}", e);
    }

    let source = HttpMessageSource::new(&settings.server_url)?;
    tracing::info!(server = %source.base_url(), "Connecting");

    let credentials = (settings.last_username.as_deref(), cli.password.as_deref());
    if let (Some(username), Some(password)) = credentials {
        source
            .login(username, password)
            .await
            .with_context(|| format!("Login as {} failed", username))?;
    }

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let app = App::new(Arc::new(source), &settings, cmd_tx);
    app.run(cmd_rx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_stored_settings() {
        let cli = Cli::parse_from([
            "scarlet",
            "--server",
            "https://scarlet.example",
            "-u",
            " Alex ",
            "--width",
            "60",
            "--no-avatars",
        ]);
        let mut settings = ClientSettings::default();
        cli.apply_to(&mut settings);
        assert_eq!(settings.server_url, "https://scarlet.example");
        assert_eq!(settings.last_username.as_deref(), Some("alex"));
        assert_eq!(settings.bubble_width, 60);
        assert!(!settings.show_avatars);
        assert_eq!(settings.poll_secs, crate::config::DEFAULT_POLL_SECS);
    }
}
