use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use std::{env, fs};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";

#[derive(Deserialize)]
pub struct SSLConfig {
    pub private_key_file: PathBuf,
    pub certificate_chain_file: PathBuf,
}

/// Location and access key of the hosted record store.
#[derive(Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub key: String,
}

#[derive(Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    pub session_secret: Option<String>,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_signups_enabled")]
    pub signups_enabled: bool,
    pub honeycomb_api_key: Option<String>,
    pub ssl: Option<SSLConfig>,
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_owned()
}

fn default_signups_enabled() -> bool {
    true
}

impl Config {
    pub fn from_file(path: PathBuf) -> Result<Config, anyhow::Error> {
        let config = fs::read_to_string(path).context("Unable to read config file")?;
        Config::from_toml(&config)
    }

    pub fn from_toml(config: &str) -> Result<Config, anyhow::Error> {
        let config: Config = toml::from_str(config).with_context(|| "Unable to parse config")?;
        Ok(config)
    }

    pub fn from_env() -> Result<Config, anyhow::Error> {
        let store = StoreConfig {
            url: read_env("SUPABASE_URL")?,
            key: read_env("SUPABASE_KEY")?,
        };
        let signups_enabled = match read_optional_env("SIGNUPS_ENABLED") {
            Some(value) => value
                .parse()
                .context("Unable to parse SIGNUPS_ENABLED value")?,
            None => default_signups_enabled(),
        };

        let config = Config {
            store,
            session_secret: read_optional_env("SESSION_SECRET"),
            bind_address: read_optional_env("BIND_ADDRESS").unwrap_or_else(default_bind_address),
            signups_enabled,
            honeycomb_api_key: read_optional_env("HONEYCOMB_API_KEY"),
            ssl: None,
        };
        Ok(config)
    }
}

fn read_env(key: &str) -> Result<String, anyhow::Error> {
    let value = env::var(key).with_context(|| format!("Unable to read env var: {}", key))?;
    if value.trim().is_empty() {
        anyhow::bail!("Env var {} is empty", key);
    }
    Ok(value)
}

fn read_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
