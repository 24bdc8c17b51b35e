//! Print the effective configuration.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Debug, Serialize)]
struct EffectiveConfig<'a> {
    #[serde(flatten)]
    config: &'a Config,
    user_config_file: Option<String>,
    repositories_file: String,
}

/// Print the merged configuration and the files it resolves to.
pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let effective = EffectiveConfig {
        config,
        user_config_file: ConfigLoader::user_config_file().map(|p| p.display().to_string()),
        repositories_file: config.storage.repositories_file().display().to_string(),
    };

    if json_mode {
        println!("{}", serde_json::to_string_pretty(&effective)?);
    } else {
        print!(
            "{}",
            serde_yaml::to_string(&effective).context("Failed to render configuration")?
        );
    }
    Ok(())
}
