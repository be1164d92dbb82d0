mod app;
mod cache;
mod commands;
mod config;
mod event;
mod favorites;
mod logging;
mod query;
mod remote;
mod resources;
#[cfg(test)]
mod testing;
mod ui;
mod upload;
mod workspace;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "deskbase")]
#[command(about = "A terminal workspace for a hosted Postgres REST backend")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/deskbase/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Signed-in user id, overrides session.user_id from the config
  #[arg(short, long)]
  user: Option<String>,

  /// View to open on start
  #[arg(long, default_value = "tasks")]
  view: String,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  let _guard = logging::init()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let session = args.user.or_else(|| config.session.user_id.clone());

  let ws = workspace::Workspace::connect(&config, session)?;
  tracing::info!(view = %args.view, "starting deskbase");

  let mut app = app::App::new(&config, ws, &args.view)?;
  app.run().await?;

  Ok(())
}
