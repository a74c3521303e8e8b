use serde::Serialize;

use certchain_core::CertConfig;

use super::super::args::GlobalArgs;
use super::output::print_json;
use super::{default_config_path, load_config};
use crate::exit_codes::EXIT_SUCCESS;

#[derive(Serialize)]
struct EffectiveConfig<'a> {
    /// Node URL after the network default is applied.
    effective_node_url: String,
    config_file: Option<String>,
    #[serde(flatten)]
    config: &'a CertConfig,
}

pub fn run(global: &GlobalArgs) -> anyhow::Result<i32> {
    let config = load_config(global)?;
    let config_file = global
        .config
        .clone()
        .or_else(|| default_config_path().filter(|p| p.is_file()))
        .map(|p| p.display().to_string());

    let report = EffectiveConfig {
        effective_node_url: config.node_url(),
        config_file,
        config: &config,
    };

    if global.json {
        print_json(&report)?;
    } else {
        print!("{}", serde_yaml::to_string(&report)?);
    }
    Ok(EXIT_SUCCESS)
}
