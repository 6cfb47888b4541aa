//! sealdrop: encrypt-before-upload file locker client
//!
//! Commands:
//!   upload <files...>      - encrypt and upload files as one batch
//!   download <name> [-o]   - fetch, decrypt, and write a file locally
//!   rm <name>              - remove local metadata, best-effort remote delete
//!   ls                     - list known files and their upload state
//!   config show            - display the active configuration
//!
//! The master secret comes from SEALDROP_MASTER_KEY (secret string) or
//! --key-file (raw bytes); it is imported once per invocation and never
//! written anywhere.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sealdrop_client::{
    download_file, remove_file, upload_batch, HttpTransport, KeyService, StatusSink,
};
use sealdrop_core::config::SealdropConfig;
use sealdrop_core::SealdropError;
use sealdrop_crypto::MasterSecret;
use sealdrop_store::MetadataStore;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sealdrop",
    version,
    about = "Encrypt files locally, store only ciphertext remotely",
    long_about = "sealdrop: client-side envelope encryption for a dumb storage server.\n\
                  The server never sees plaintext or keys."
)]
struct Cli {
    /// Path to sealdrop.toml configuration file
    #[arg(long, short = 'c', env = "SEALDROP_CONFIG", default_value = "sealdrop.toml")]
    config: PathBuf,

    /// Read the master secret from this file (raw bytes) instead of
    /// the SEALDROP_MASTER_KEY environment variable
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt local files and upload them as one batch
    Upload {
        /// Files to encrypt and upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Download and decrypt a file by its original name
    Download {
        /// Original file name (as shown by `ls`)
        file_name: String,
        /// Destination path (default: the original name in the current dir)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Remove a file: local metadata first, then best-effort remote delete
    Rm {
        /// Original file name
        file_name: String,
    },

    /// List known files and their upload state
    Ls,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;
    init_logging(&config.log.level);
    tracing::debug!(
        config = %cli.config.display(),
        endpoint = %config.server.endpoint,
        "configuration loaded"
    );

    match &cli.command {
        Commands::Upload { files } => cmd_upload(&cli, &config, files).await,
        Commands::Download { file_name, output } => {
            cmd_download(&cli, &config, file_name, output.as_deref()).await
        }
        Commands::Rm { file_name } => cmd_rm(&config, file_name).await,
        Commands::Ls => cmd_ls(&config),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn cmd_upload(cli: &Cli, config: &SealdropConfig, paths: &[PathBuf]) -> Result<()> {
    let keys = init_keys(cli).await?;
    let mut store = open_store(config);
    let transport = build_transport(config)?;

    let mut files: Vec<(String, Vec<u8>)> = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("not a file path: {}", path.display()))?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        files.push((name, bytes));
    }

    let sink: StatusSink = Box::new(|event| {
        println!("{}: {}", event.file_name, event.status);
    });

    match upload_batch(&keys, &mut store, &transport, &files, Some(&sink)).await {
        Ok(outcomes) => {
            for outcome in &outcomes {
                if let Some(stored) = &outcome.stored_name {
                    if stored != &outcome.file_name {
                        println!("{} stored as {}", outcome.file_name, stored);
                    }
                }
            }
            Ok(())
        }
        Err(e) => {
            // Batch-level failure: nothing was confirmed. Drop the staged
            // records so they don't linger as unusable pending entries.
            let pruned = store.prune_pending().unwrap_or(0);
            if pruned > 0 {
                eprintln!("upload failed; discarded {pruned} staged record(s)");
            }
            Err(e).context("batch upload failed")
        }
    }
}

async fn cmd_download(
    cli: &Cli,
    config: &SealdropConfig,
    file_name: &str,
    output: Option<&Path>,
) -> Result<()> {
    let keys = init_keys(cli).await?;
    let store = open_store(config);
    let transport = build_transport(config)?;

    let plaintext = download_file(&keys, &store, &transport, file_name)
        .await
        .map_err(|e| match e {
            SealdropError::AuthenticationFailure => {
                anyhow::anyhow!("\"{file_name}\" is corrupted or was tampered with")
            }
            other => anyhow::Error::from(other),
        })?;

    let destination = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(file_name));
    tokio::fs::write(&destination, &plaintext)
        .await
        .with_context(|| format!("writing {}", destination.display()))?;

    println!("{} -> {}", file_name, destination.display());
    Ok(())
}

async fn cmd_rm(config: &SealdropConfig, file_name: &str) -> Result<()> {
    let mut store = open_store(config);
    let transport = build_transport(config)?;

    let outcome = remove_file(&mut store, &transport, file_name).await?;
    if outcome.remote_deleted {
        println!("{file_name} removed");
    } else if let Some(error) = outcome.remote_error {
        println!("{file_name} removed locally; remote delete failed: {error}");
    } else {
        println!("{file_name} removed (never reached the server)");
    }
    Ok(())
}

fn cmd_ls(config: &SealdropConfig) -> Result<()> {
    let store = open_store(config);
    if store.is_empty() {
        println!("no files");
        return Ok(());
    }
    for meta in store.list() {
        match &meta.stored_name {
            Some(stored) => println!("{}\tUploaded\t{}", meta.file_name, stored),
            None => println!("{}\tPending\t-", meta.file_name),
        }
    }
    Ok(())
}

fn cmd_config_show(config: &SealdropConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("serializing configuration")?;
    print!("{rendered}");
    Ok(())
}

// ── Wiring ────────────────────────────────────────────────────────────────────

async fn init_keys(cli: &Cli) -> Result<KeyService> {
    let keys = KeyService::new();
    let key_file = cli.key_file.clone();
    keys.init_with(|| async move {
        if let Some(path) = key_file {
            let bytes = tokio::fs::read(&path).await?;
            MasterSecret::from_bytes(bytes)
        } else {
            match std::env::var("SEALDROP_MASTER_KEY") {
                Ok(value) => MasterSecret::from_passphrase(&SecretString::from(value)),
                Err(_) => Err(SealdropError::InvalidKeyMaterial(
                    "set SEALDROP_MASTER_KEY or pass --key-file".into(),
                )),
            }
        }
    })
    .await?;
    Ok(keys)
}

fn open_store(config: &SealdropConfig) -> MetadataStore {
    MetadataStore::open(&expand_tilde(&config.store.path))
}

fn build_transport(config: &SealdropConfig) -> Result<HttpTransport> {
    Ok(HttpTransport::new(
        &config.server.endpoint,
        Duration::from_secs(config.server.request_timeout_secs),
    )?)
}

async fn load_config(path: &Path) -> Result<SealdropConfig> {
    if path.exists() {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config: {}", path.display()))
    } else {
        Ok(SealdropConfig::default())
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
