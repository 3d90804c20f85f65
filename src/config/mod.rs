use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

/// Identity is supplied by an authenticating reverse proxy in front of liftlog.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Request header carrying the opaque user id set by the proxy
    #[serde(default = "default_user_header")]
    pub user_header: String,
    /// Shared secret the proxy sends in `x-auth-secret`; unset disables the check
    #[serde(default)]
    pub proxy_secret: Option<String>,
    /// Fixed identity used when the header is missing (local development only)
    #[serde(default)]
    pub dev_user: Option<String>,
    /// Where pages send visitors without an identity
    #[serde(default = "default_sign_in_url")]
    pub sign_in_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_header: default_user_header(),
            proxy_secret: None,
            dev_user: None,
            sign_in_url: default_sign_in_url(),
        }
    }
}

fn default_user_header() -> String {
    "x-auth-user".to_string()
}

fn default_sign_in_url() -> String {
    "/sign-in".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).with_context(|| "Failed to parse configuration file")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.auth.user_header.trim().is_empty() {
            anyhow::bail!("auth.user_header must not be empty");
        }
        if axum::http::HeaderName::from_bytes(self.auth.user_header.as_bytes()).is_err() {
            anyhow::bail!("auth.user_header is not a valid header name: {}", self.auth.user_header);
        }
        if matches!(&self.auth.proxy_secret, Some(s) if s.is_empty()) {
            anyhow::bail!("auth.proxy_secret must not be empty when set");
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.server.data_dir.join("liftlog.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.user_header, "x-auth-user");
        assert_eq!(config.auth.sign_in_url, "/sign-in");
        assert!(config.auth.dev_user.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8088

[auth]
dev_user = "user_dev"
proxy_secret = "s3cret"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.auth.dev_user.as_deref(), Some("user_dev"));
        assert_eq!(config.auth.proxy_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.database_path(), PathBuf::from("./data/liftlog.db"));
    }

    #[test]
    fn test_rejects_bad_header_name() {
        let err = Config::parse("[auth]\nuser_header = \"bad header\"\n").unwrap_err();
        assert!(err.to_string().contains("not a valid header name"));
    }

    #[test]
    fn test_rejects_empty_proxy_secret() {
        assert!(Config::parse("[auth]\nproxy_secret = \"\"\n").is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(Config::parse("[server\nport = 1").is_err());
    }
}
