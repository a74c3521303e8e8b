use std::path::{Path, PathBuf};

use anyhow::Context;
use certchain_core::CertConfig;
use tracing::debug;

use super::args::GlobalArgs;

pub mod config;
pub mod decode;
mod dispatch;
pub mod issue;
mod output;
pub mod verify;

pub use dispatch::dispatch;

const CONFIG_FILE: &str = "config.yaml";

/// `<config dir>/certchain/config.yaml`.
pub(crate) fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("certchain").join(CONFIG_FILE))
}

/// Effective config: file (explicit, else default when present), then
/// `CERTCHAIN_*` env vars, then global flags.
pub(crate) fn load_config(global: &GlobalArgs) -> anyhow::Result<CertConfig> {
    let mut config = match &global.config {
        Some(path) => from_file(path)?,
        None => match default_config_path().filter(|p| p.is_file()) {
            Some(path) => from_file(&path)?,
            None => CertConfig::from_env(),
        },
    };

    if let Some(network) = global.network {
        config.network = network;
    }
    if let Some(url) = &global.node_url {
        config.node_url = Some(url.clone());
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn from_file(path: &Path) -> anyhow::Result<CertConfig> {
    debug!(path = %path.display(), "loading config file");
    CertConfig::from_yaml_file(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}
