use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "SHELF_ENV";
const CONFIG_DIR_ENV: &str = "SHELF_CONFIG_DIR";
const ENV_PREFIX: &str = "SHELF";

/// Development-only JWT secret. Refused when running in production.
pub const DEFAULT_JWT_SECRET: &str = "shelf-local-development-secret";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub scraper: ScraperSettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, environment overlay
    /// and `SHELF_*` variables.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = Environment::parse(&environment)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Reject combinations that are only acceptable during development.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.environment == Environment::Production && self.auth.jwt_secret == DEFAULT_JWT_SECRET
        {
            bail!("auth.jwt_secret must be set explicitly in production");
        }
        if self.scraper.pages == 0 {
            bail!("scraper.pages must be at least 1");
        }
        let prefix = self.server.api_prefix.as_str();
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
            bail!(
                "server.api_prefix must start with '/' and name a path (got '{}')",
                prefix
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Path every module router is nested under.
    #[serde(default = "ServerSettings::default_api_prefix")]
    pub api_prefix: String,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }

    fn default_api_prefix() -> String {
        "/api/v1".to_string()
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
            api_prefix: Self::default_api_prefix(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_url")]
    pub url: String,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseSettings {
    fn default_url() -> String {
        "sqlite://data/books.db?mode=rwc".to_string()
    }

    fn default_max_connections() -> u32 {
        5
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "TelemetrySettings::default_filter")]
    pub filter: String,
}

impl TelemetrySettings {
    fn default_filter() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: Self::default_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "AuthSettings::default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "AuthSettings::default_issuer")]
    pub issuer: String,
    #[serde(default = "AuthSettings::default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
}

impl AuthSettings {
    fn default_jwt_secret() -> String {
        DEFAULT_JWT_SECRET.to_string()
    }

    fn default_issuer() -> String {
        "shelf".to_string()
    }

    fn default_token_ttl_minutes() -> i64 {
        60
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: Self::default_jwt_secret(),
            issuer: Self::default_issuer(),
            token_ttl_minutes: Self::default_token_ttl_minutes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScraperSettings {
    /// Catalog root; index and detail links are resolved against it.
    #[serde(default = "ScraperSettings::default_base_url")]
    pub base_url: String,
    #[serde(default = "ScraperSettings::default_pages")]
    pub pages: u32,
    #[serde(default = "ScraperSettings::default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ScraperSettings {
    fn default_base_url() -> String {
        "https://books.toscrape.com/catalogue/".to_string()
    }

    fn default_pages() -> u32 {
        50
    }

    fn default_output_dir() -> PathBuf {
        PathBuf::from("data")
    }
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            pages: Self::default_pages(),
            output_dir: Self::default_output_dir(),
            user_agent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_environment_is_local() {
        let settings = Settings::default();
        assert_eq!(settings.environment, Environment::Local);
    }

    #[test]
    fn default_database_url_is_local_sqlite_file() {
        let settings = Settings::default();
        assert_eq!(settings.database.url, "sqlite://data/books.db?mode=rwc");
    }

    #[test]
    fn default_scraper_walks_fifty_pages() {
        let settings = Settings::default();
        assert_eq!(settings.scraper.pages, 50);
        assert_eq!(
            settings.scraper.base_url,
            "https://books.toscrape.com/catalogue/"
        );
    }

    #[test]
    fn unknown_environment_is_rejected() {
        assert!(Environment::parse("qa").is_err());
        assert_eq!(
            Environment::parse("production").unwrap(),
            Environment::Production
        );
    }

    #[test]
    fn production_requires_explicit_jwt_secret() {
        let mut settings = Settings {
            environment: Environment::Production,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        settings.auth.jwt_secret = "a-real-secret".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn api_prefix_must_be_a_nestable_path() {
        for prefix in ["", "/", "api", "/api/"] {
            let mut settings = Settings::default();
            settings.server.api_prefix = prefix.to_string();
            assert!(settings.validate().is_err(), "accepted '{}'", prefix);
        }

        let mut settings = Settings::default();
        settings.server.api_prefix = "/api/v2".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn zero_pages_is_rejected() {
        let mut settings = Settings::default();
        settings.scraper.pages = 0;
        assert!(settings.validate().is_err());
    }
}
