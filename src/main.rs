use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use langcache::cache::{ExpiryPolicy, PersistentStore, SqliteStore, SystemClock};
use langcache::config::Config;
use langcache::content;

#[derive(Parser, Debug)]
#[command(name = "langcache")]
#[command(about = "Inspect and manage the portal's locale content cache")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/langcache/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show each resource kind's last write and freshness
  Status,
  /// Print a kind's persisted JSON
  Dump {
    /// Resource kind (e.g. game-list, blog, navigation)
    kind: String,
  },
  /// Remove cached data for one kind, or everything
  Clear {
    /// Resource kind; omit to clear all kinds
    kind: Option<String>,
  },
}

fn main() -> Result<()> {
  color_eyre::install()?;
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;
  let store = SqliteStore::open_at(&config.db_path()?)?;

  match args.command {
    Command::Status => status(&store, &config),
    Command::Dump { kind } => dump(&store, &kind),
    Command::Clear { kind } => clear(&store, kind.as_deref()),
  }
}

fn status(store: &SqliteStore, config: &Config) -> Result<()> {
  let clock = SystemClock;
  for kind in content::ALL_KINDS.iter().copied() {
    let policy = ExpiryPolicy::new(kind).with_ttl(config.ttl(kind));
    match store.read(&format!("{}-timestamp", kind)) {
      Some(raw) => {
        let state = if policy.is_expired(store, &clock) {
          "stale"
        } else {
          "fresh"
        };
        println!("{:<14} written at {} ({})", kind, format_timestamp(&raw), state);
      }
      None => println!("{:<14} empty", kind),
    }
  }
  Ok(())
}

fn dump(store: &SqliteStore, kind: &str) -> Result<()> {
  if !content::ALL_KINDS.contains(&kind) {
    return Err(eyre!(
      "Unknown resource kind '{}'. Known kinds: {}",
      kind,
      content::ALL_KINDS.join(", ")
    ));
  }

  match store.read(&format!("{}-value", kind)) {
    Some(raw) => {
      let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| eyre!("Persisted {} is unreadable: {}", kind, e))?;
      println!("{}", serde_json::to_string_pretty(&value)?);
      Ok(())
    }
    None => Err(eyre!("No cached data for '{}'", kind)),
  }
}

fn clear(store: &SqliteStore, kind: Option<&str>) -> Result<()> {
  let kinds: Vec<&str> = match kind {
    Some(k) => {
      if !content::ALL_KINDS.contains(&k) {
        return Err(eyre!(
          "Unknown resource kind '{}'. Known kinds: {}",
          k,
          content::ALL_KINDS.join(", ")
        ));
      }
      vec![k]
    }
    None => content::ALL_KINDS.to_vec(),
  };

  for kind in kinds {
    store.remove(&format!("{}-value", kind));
    store.remove(&format!("{}-timestamp", kind));
    println!("cleared {}", kind);
  }
  Ok(())
}

fn format_timestamp(raw: &str) -> String {
  raw
    .trim()
    .parse::<i64>()
    .ok()
    .and_then(chrono::DateTime::from_timestamp_millis)
    .map(|dt| dt.to_rfc3339())
    .unwrap_or_else(|| format!("invalid timestamp '{}'", raw))
}
