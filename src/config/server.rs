use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const JWT_SECRET_FILE: &str = ".jwt_secret";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Public base URL for external access (e.g., "https://tasks.example.com").
    /// Used for CalDAV hrefs. If not set, paths are relative.
    pub public_base_url: Option<String>,
    pub service: ServiceConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Secret for signing link share tokens. Read from `<data_dir>/.jwt_secret` when empty.
    pub jwt_secret: String,
    pub link_share_token_ttl_secs: i64,
    pub max_items_per_page: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub openid: OpenIdConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenIdConfig {
    pub enabled: bool,
    /// Prefix for provider callback urls; the provider key is appended.
    pub redirect_url: String,
    pub providers: Vec<OpenIdProviderConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenIdProviderConfig {
    pub name: String,
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl ServerConfig {
    /// Reads a TOML config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("tasklane.db")
    }

    #[must_use]
    pub fn jwt_secret_path(&self) -> PathBuf {
        self.data_dir.join(JWT_SECRET_FILE)
    }

    /// The configured link share secret, falling back to the secret file
    /// written by `admin init`.
    pub fn resolve_jwt_secret(&self) -> Result<String> {
        if !self.service.jwt_secret.is_empty() {
            return Ok(self.service.jwt_secret.clone());
        }

        let path = self.jwt_secret_path();
        let secret = std::fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!(
                "no jwt_secret configured and {} is unreadable: {e}",
                path.display()
            ))
        })?;

        let secret = secret.trim().to_string();
        if secret.is_empty() {
            return Err(Error::Config(format!("{} is empty", path.display())));
        }
        Ok(secret)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3456,
            data_dir: PathBuf::from("./data"),
            public_base_url: None,
            service: ServiceConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            link_share_token_ttl_secs: 259_200,
            max_items_per_page: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
port = 9000

[service]
max_items_per_page = 20

[auth.openid]
enabled = true
redirect_url = "https://tasks.example.com/auth/openid/"

[[auth.openid.providers]]
name = "Corp"
auth_url = "https://sso.example.com"
client_id = "tasklane"
"#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.service.max_items_per_page, 20);
        assert_eq!(config.service.link_share_token_ttl_secs, 259_200);
        assert!(config.auth.openid.enabled);
        assert_eq!(config.auth.openid.providers[0].name, "Corp");
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = \"not a number\"").unwrap();

        assert!(matches!(ServerConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_jwt_secret() {
        let dir = TempDir::new().unwrap();
        let mut config = ServerConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        assert!(config.resolve_jwt_secret().is_err());

        std::fs::write(config.jwt_secret_path(), "from-file\n").unwrap();
        assert_eq!(config.resolve_jwt_secret().unwrap(), "from-file");

        config.service.jwt_secret = "configured".to_string();
        assert_eq!(config.resolve_jwt_secret().unwrap(), "configured");
    }
}
