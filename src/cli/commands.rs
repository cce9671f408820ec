//! Implementation of the cachedhash CLI commands.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use crate::key::{cache_key, key_material};
use crate::store::{CacheStore, LruStore, MemoryStore, SqliteStore};
use crate::types::config::{Config, StoreBackend};
use crate::{CachedHash, CachedHashError, CachedHashResult};

use super::ParamArgs;

/// Store holding command output, as configured.
pub type OutputStore = dyn CacheStore<String>;

/// Opens the store selected by the configuration.
pub fn open_store(config: &Config) -> CachedHashResult<Arc<OutputStore>> {
    let store: Arc<OutputStore> = match config.store.backend {
        StoreBackend::Sqlite => {
            tracing::debug!("Opening SQLite store at {}", config.store.db_path.display());
            Arc::new(SqliteStore::<String>::open(&config.store.db_path)?)
        }
        StoreBackend::Lru => {
            tracing::warn!("The lru backend does not persist between invocations");
            Arc::new(LruStore::<String>::new(config.store.capacity))
        }
        StoreBackend::Memory => {
            tracing::warn!("The memory backend does not persist between invocations");
            Arc::new(MemoryStore::<String>::new())
        }
    };
    Ok(store)
}

fn facade(config: &Config) -> CachedHashResult<CachedHash<String, OutputStore>> {
    CachedHash::builder()
        .store(open_store(config)?)
        .label("cli")
        .build()
}

/// Initializes configuration in the specified directory.
pub fn init(path: Option<PathBuf>) -> CachedHashResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join("cachedhash.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("Configuration created at: {}", config_path.display());
    println!("Store backend: {}", config.store.backend);
    println!("Database: {}", config.store.db_path.display());

    Ok(())
}

/// Prints the derived key, optionally preceded by the hashed material.
pub fn key(params: &ParamArgs, material: bool) {
    let params = params.to_params();
    if material {
        println!("{}", key_material(&params));
    }
    println!("{}", cache_key(&params));
}

/// Prints the cached value. Returns `false` on a miss.
pub fn get(params: &ParamArgs, config: &Config) -> CachedHashResult<bool> {
    let cache = facade(config)?;

    match cache.peek(&params.to_params())? {
        Some(value) => {
            print!("{}", value);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Prints the cached output for the parameters, running `command` on a miss.
pub fn run(params: &ParamArgs, command: &[String], config: &Config) -> CachedHashResult<()> {
    let cache = facade(config)?;
    let output = cache.try_get_or_compute(&params.to_params(), || run_command(command))?;
    print!("{}", output);
    Ok(())
}

/// Runs a command and returns its stdout. A non-zero exit is an error.
fn run_command(command: &[String]) -> CachedHashResult<String> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| CachedHashError::Command("no command given".to_string()))?;

    tracing::info!("Running {}", command.join(" "));
    let output = Command::new(program).args(args).output()?;

    if !output.status.success() {
        return Err(CachedHashError::Command(format!(
            "`{}` exited with {}: {}",
            command.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    String::from_utf8(output.stdout).map_err(|_| {
        CachedHashError::Command(format!("`{}` produced non-UTF-8 output", command.join(" ")))
    })
}

/// Removes the cached value for the parameters.
pub fn remove(params: &ParamArgs, config: &Config) -> CachedHashResult<()> {
    let cache = facade(config)?;
    cache.remove(&params.to_params())?;
    println!("Removed {}", cache.key(&params.to_params()));
    Ok(())
}

/// Lists the entries of the SQLite store.
pub fn list(config: &Config) -> CachedHashResult<()> {
    if config.store.backend != StoreBackend::Sqlite {
        println!(
            "The {} backend keeps nothing between invocations.",
            config.store.backend
        );
        return Ok(());
    }

    let store: SqliteStore<String> = SqliteStore::open(&config.store.db_path)?;
    let entries = store.entries()?;

    if entries.is_empty() {
        println!("No cached entries.");
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  {}  {} bytes",
            entry.key,
            entry.stored_at.format("%Y-%m-%d %H:%M:%S"),
            entry.value_json.len()
        );
    }

    Ok(())
}

/// Shows version information.
pub fn version() {
    println!("cachedhash {}", env!("CARGO_PKG_VERSION"));
}
