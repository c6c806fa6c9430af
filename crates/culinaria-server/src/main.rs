//! culinaria-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `CULINARIA_*` environment variables, opens the SQLite store and serves
//! the site API. Operator tasks run as subcommands:
//!
//! ```text
//! culinaria-server serve
//! culinaria-server migrate [--force]
//! culinaria-server sitemap [--out sitemap.xml]
//! culinaria-server create-admin --username chef [--role super_admin]
//! culinaria-server hash-password
//! ```
//!
//! Nested keys use a double underscore, e.g.
//! `CULINARIA_FUNCTIONS__TEXT__API_KEY`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use culinaria_api::auth::hash_password;
use culinaria_core::{
  profile::{NewProfile, Role},
  store::SchoolStore as _,
};
use culinaria_functions::{Functions, MigrateRequest};
use culinaria_server::{AppState, ServerConfig};
use culinaria_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Culinaria culinary school directory server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve HTTP (the default).
  Serve,
  /// Load the bundled school dataset into the store.
  Migrate {
    /// Run even if the migration has already been recorded.
    #[arg(long)]
    force: bool,
  },
  /// Render the sitemap to stdout or a file.
  Sitemap {
    #[arg(long)]
    out: Option<PathBuf>,
  },
  /// Create an admin profile; the password is read from stdin.
  CreateAdmin {
    #[arg(long)]
    username: String,
    #[arg(long, default_value = "admin")]
    role:     Role,
  },
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let command = cli.command.unwrap_or(Command::Serve);

  if let Command::HashPassword = command {
    let password = rpassword_or_stdin()?;
    let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(culinaria_server::environment())
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in filesystem paths.
  server_cfg.store_path = expand_tilde(&server_cfg.store_path);
  server_cfg.bucket.dir = expand_tilde(&server_cfg.bucket.dir);

  // Open SQLite store.
  let store_path = &server_cfg.store_path;
  if let Some(parent) = store_path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = Arc::new(
    SqliteStore::open(store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?,
  );

  let providers =
    culinaria_server::providers(&server_cfg).context("failed to build HTTP providers")?;
  let functions = Functions::new(store.clone(), providers, server_cfg.function_settings());

  match command {
    Command::Serve => serve(&server_cfg, store, functions).await,
    Command::Migrate { force } => {
      let report = functions
        .migrate_static_schools(MigrateRequest { force })
        .await
        .context("migration failed")?;
      println!("{}", serde_json::to_string_pretty(&report)?);
      Ok(())
    }
    Command::Sitemap { out } => {
      let xml = functions.sitemap().await.context("failed to render sitemap")?;
      match out {
        Some(path) => std::fs::write(&path, xml)
          .with_context(|| format!("failed to write {path:?}"))?,
        None => println!("{xml}"),
      }
      Ok(())
    }
    Command::CreateAdmin { username, role } => {
      let password = rpassword_or_stdin()?;
      anyhow::ensure!(!password.is_empty(), "password must not be empty");
      let password_hash =
        hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
      let profile = store
        .add_profile(NewProfile { username, password_hash, role })
        .await
        .context("failed to create profile")?;
      tracing::info!(username = %profile.username, role = %profile.role, "profile created");
      Ok(())
    }
    Command::HashPassword => Ok(()),
  }
}

async fn serve(
  cfg: &ServerConfig,
  store: Arc<SqliteStore>,
  functions: Functions<SqliteStore>,
) -> anyhow::Result<()> {
  let bucket_dir = cfg.bucket.dir.clone();
  std::fs::create_dir_all(&bucket_dir)
    .with_context(|| format!("failed to create bucket dir {bucket_dir:?}"))?;

  let app = culinaria_server::router(AppState { store, functions, bucket_dir });
  let address = format!("{}:{}", cfg.host, cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn rpassword_or_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
