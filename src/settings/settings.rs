use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub http: Http,
    pub log: Log,
    #[serde(default)]
    pub relationship: Relationship,
    pub storage: Storage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    pub backend: String, // "fake" or "jwt"
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub audience: String,
    /// Name of the environment variable holding the HS256 key.
    #[serde(default = "default_signing_key_env")]
    pub signing_key_env: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Http {
    pub address: String,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Relationship {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for Relationship {
    fn default() -> Self {
        Relationship {
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub backend: String, // "memory" or "mysql"
    pub mysql_dsn: Option<String>,
    /// Memory backend only: accounts are created active and verified.
    #[serde(default)]
    pub auto_verify: bool,
}

fn default_signing_key_env() -> String {
    "JWT_SIGNING_KEY".to_string()
}

fn default_max_attempts() -> u32 {
    crate::application_impl::DEFAULT_MAX_ATTEMPTS
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Load settings from `path` (or the build's default file), then apply
/// `AMITY__SECTION__KEY` environment overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::with_prefix("AMITY").separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
