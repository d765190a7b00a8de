// Application configuration loaded from config/default.toml plus
// LEADBOARD__-prefixed environment overrides
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub data_api: DataApiSettings,
    pub auth: AuthSettings,
    pub upload: UploadSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Enables POST /api/seed-sample-data. Off in production.
    #[serde(default)]
    pub enable_seed: bool,
}

/// Which backend the repositories talk to. `memory` is for local
/// development and tests; `http` is the hosted data API.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    Memory,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataApiSettings {
    pub mode: BackendMode,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Domain appended to usernames to form the synthetic email.
    pub email_domain: String,
    /// Fixed suffix appended to the 4-digit PIN to satisfy the auth
    /// provider's password length rule.
    pub password_suffix: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadSettings {
    #[serde(default = "default_upload_dir")]
    pub dir: String,
    pub public_base_url: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_bytes: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_upload_bytes() -> u64 {
    2 * 1024 * 1024
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::Environment::with_prefix("LEADBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
