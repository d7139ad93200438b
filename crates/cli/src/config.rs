//! CLI configuration utilities

use anyhow::{Context, Result};
use parlor_client::{ClientConfig, FileTokenStore};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.json";

/// Data directory: the flag, else `PARLOR_STATE_DIR`, else the platform data dir
pub fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir.unwrap_or_else(|| {
        if let Ok(state_dir) = std::env::var("PARLOR_STATE_DIR") {
            PathBuf::from(state_dir)
        } else {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("parlor")
        }
    })
}

/// Load client settings from a file, then `PARLOR_*` variables, then flags
///
/// An explicit `path` must exist; the default `<data_dir>/config.toml` is optional.
pub fn load_client_config(
    path: Option<&Path>,
    data_dir: &Path,
    base_url: Option<String>,
) -> Result<ClientConfig> {
    let file = match path {
        Some(path) => config::File::from(path),
        None => config::File::from(data_dir.join(CONFIG_FILE)).required(false),
    };

    let settings = config::Config::builder()
        .add_source(file)
        .add_source(config::Environment::with_prefix("PARLOR").try_parsing(true))
        .build()
        .context("Failed to read configuration")?;

    let mut client_config: ClientConfig = settings
        .try_deserialize()
        .context("Invalid configuration")?;
    if let Some(base_url) = base_url {
        client_config.base_url = base_url;
    }
    Ok(client_config)
}

/// Token store persisted next to the other CLI state
pub fn open_token_store(data_dir: &Path) -> Result<FileTokenStore> {
    let path = data_dir.join(SESSION_FILE);
    FileTokenStore::open(&path)
        .with_context(|| format!("Failed to open session file {}", path.display()))
}
