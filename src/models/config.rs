//! Configuration model loaded from external sources.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// External document editor settings.
#[derive(Clone, Debug, Deserialize)]
pub struct EditorConfig {
    /// Base URL of the document service, e.g. `http://localhost:8080`.
    pub document_server_url: String,
    /// URL under which the document service reaches this application.
    pub public_base_url: String,
    /// Shared secret used to sign editor configurations and callback tokens.
    pub jwt_secret: String,
}

impl EditorConfig {
    /// Location of the editor's loader script.
    pub fn script_url(&self) -> String {
        format!(
            "{}/web-apps/apps/api/documents/api.js",
            self.document_server_url.trim_end_matches('/')
        )
    }
}

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    /// Secret shared with the auth service; signs session tokens and cookies.
    pub secret: String,
    pub auth_service_url: String,
    /// Directory for uploaded contracts, templates and generated documents.
    pub upload_dir: String,
    pub zmq_emailer_pub: String,
    pub editor: EditorConfig,
    /// Look-ahead window of the due date reminder worker.
    #[serde(default = "default_reminder_days")]
    pub reminder_days: i64,
}

fn default_reminder_days() -> i64 {
    3
}

impl ServerConfig {
    /// Reads `config/default.yaml`, then `config/{APP_ENV}.yaml` when present,
    /// then `APP_*` environment variables.
    pub fn load(app_env: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }
}
