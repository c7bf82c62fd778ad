mod accel;
mod app;
mod commands;
mod config;
mod db;
mod event;
mod query;
mod tracker;
mod ui;

use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sm9s")]
#[command(about = "A terminal dashboard for scrum masters, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/sm9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Product whose releases and iterations to show
  #[arg(short, long)]
  product: Option<String>,
}

/// Log filter from the SM9S_LOG environment variable, defaulting to info.
fn log_filter() -> EnvFilter {
  EnvFilter::try_from_env("SM9S_LOG").unwrap_or_else(|_| EnvFilter::new("sm9s=info"))
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Log to a file, tracing output on stdout would corrupt the TUI
  let log_dir = dirs::data_dir()
    .ok_or_else(|| eyre!("Failed to determine data directory"))?
    .join("sm9s");
  std::fs::create_dir_all(&log_dir).map_err(|e| eyre!("Failed to create log directory: {}", e))?;

  let appender = tracing_appender::rolling::daily(&log_dir, "sm9s.log");
  let (writer, _guard) = tracing_appender::non_blocking(appender);
  tracing_subscriber::fmt()
    .with_env_filter(log_filter())
    .with_writer(writer)
    .with_ansi(false)
    .init();

  let config = config::Config::load(args.config.as_deref())?;

  let mut app = app::App::new(config, args.product)?;
  app.run().await?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_log_filter_reads_sm9s_log() {
    std::env::remove_var("SM9S_LOG");
    assert_eq!(log_filter().to_string(), "sm9s=info");

    std::env::set_var("SM9S_LOG", "sm9s=debug");
    assert_eq!(log_filter().to_string(), "sm9s=debug");
    std::env::remove_var("SM9S_LOG");
  }
}
