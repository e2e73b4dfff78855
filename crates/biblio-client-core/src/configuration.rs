//! Settings for native clients
//!
//! Read from (later sources win):
//! 1. built in defaults
//! 2. an optional `biblio.toml` in the working directory
//! 3. environment variables such as `BIBLIO_BASE_URL` or `BIBLIO_SESSION_DIR`

use std::path::PathBuf;

use biblio_shared::const_config::client::{CLIENT_DEFAULT_API_URL, CLIENT_ENV_PREFIX};

pub const CONFIG_FILE_NAME: &str = "biblio";
pub const DEFAULT_SESSION_DIR: &str = ".biblio-session";

#[derive(serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Every request path is appended to this
    pub base_url: String,
    /// Folder the session is persisted in
    pub session_dir: PathBuf,
}

pub fn get_configuration() -> Result<ClientConfig, config::ConfigError> {
    build_configuration(None)
}

fn build_configuration(
    env_override: Option<config::Map<String, String>>,
) -> Result<ClientConfig, config::ConfigError> {
    let mut result: ClientConfig = config::Config::builder()
        .set_default("base_url", CLIENT_DEFAULT_API_URL)?
        .set_default("session_dir", DEFAULT_SESSION_DIR)?
        .add_source(config::File::with_name(CONFIG_FILE_NAME).required(false))
        .add_source(
            config::Environment::with_prefix(CLIENT_ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(env_override),
        )
        .build()?
        .try_deserialize()?;
    result.base_url = result.base_url.trim_end_matches('/').to_string();
    Ok(result)
}
