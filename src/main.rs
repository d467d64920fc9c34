use clap::Parser;
use color_eyre::Result;
use shutter::app::App;
use shutter::cache::{CacheLayer, NoopStorage, SqliteStorage};
use shutter::config::Config;
use shutter::db::{self, Database};
use shutter::engine::Engine;
use shutter::history::{History, HistoryStore, MemoryHistory, SqliteHistory};
use shutter::unsplash::{FetchGateway, UnsplashClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shutter")]
#[command(about = "Browse and search Unsplash photos from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./shutter.yaml, then $XDG_CONFIG_HOME/shutter/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Start with this search instead of browsing
  #[arg(short, long)]
  search: Option<String>,

  /// Always hit the network; nothing is read from or written to the response cache
  #[arg(long)]
  no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Keep the guard alive so buffered log lines are flushed on exit
  let _log_guard = setup_logging()?;

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let access_key = Config::get_access_key()?;

  let database = open_database(&config);

  let storage_cache = match &database {
    Some(db) if config.cache.enabled && !args.no_cache => {
      CacheLayer::new(SqliteStorage::new(db.clone()))
    }
    _ => CacheLayer::new(NoopStorage),
  };
  let cache = storage_cache.with_max_age(config.cache_max_age());

  let history_store: Box<dyn HistoryStore> = match &database {
    Some(db) => Box::new(SqliteHistory::new(db.clone())),
    None => Box::new(MemoryHistory::default()),
  };

  let client = UnsplashClient::new(&config, access_key)?;
  let gateway = FetchGateway::new(Arc::new(client), cache, &config);
  let engine = Engine::new(gateway, History::load(history_store));

  info!(api = %config.api.url, "starting");

  // Initialize and run the app
  let mut app = App::new(config, engine);
  app.run(args.search).await?;

  Ok(())
}

/// Log to a daily file; the terminal belongs to the UI
fn setup_logging() -> Result<WorkerGuard> {
  let log_dir = db::data_dir()?.join("logs");
  let appender = tracing_appender::rolling::daily(log_dir, "shutter.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter =
    EnvFilter::try_from_env("SHUTTER_LOG").unwrap_or_else(|_| EnvFilter::new("shutter=info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .with_target(true)
    .init();

  Ok(guard)
}

/// Open the database, or run without persistence if that fails
fn open_database(config: &Config) -> Option<Database> {
  let opened = match &config.cache.path {
    Some(path) => Database::open_at(path),
    None => Database::open(),
  };

  match opened {
    Ok(db) => Some(db),
    Err(e) => {
      warn!(error = %e, "database unavailable, cache and history will not persist");
      None
    }
  }
}
