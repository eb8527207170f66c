mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use tracing::debug;

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(&config_path).await?;
    let mut config = parse(&config_str)?;
    apply_env_overrides(&mut config, |key| env::var(key).ok());
    validate(&config)?;

    Ok(config)
}

pub fn parse(yaml: &str) -> Result<Config> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Connection settings may come from the environment instead of the file.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("SUPABASE_URL") {
        debug!("Store URL taken from SUPABASE_URL");
        config.store.url = url;
    }
    if let Some(key) = lookup("SUPABASE_ANON_KEY") {
        debug!("Store API key taken from SUPABASE_ANON_KEY");
        config.store.api_key = key;
    }
    if let Some(path) = lookup("CHAT_DB_PATH") {
        config.store.database_path = path;
    }
}

pub fn validate(config: &Config) -> Result<()> {
    if config.store.backend == StoreBackend::Rest {
        if config.store.url.trim().is_empty() {
            return Err(Error::config(
                "store.url (or SUPABASE_URL) is required for the rest backend",
            ));
        }
        if config.store.api_key.trim().is_empty() {
            return Err(Error::config(
                "store.api_key (or SUPABASE_ANON_KEY) is required for the rest backend",
            ));
        }
    }

    if config.store.table.trim().is_empty() {
        return Err(Error::config("store.table must not be empty"));
    }

    if !config.chat.reply_template.contains(MESSAGE_PLACEHOLDER) {
        return Err(Error::config(format!(
            "chat.reply_template must contain {MESSAGE_PLACEHOLDER}"
        )));
    }

    Ok(())
}
