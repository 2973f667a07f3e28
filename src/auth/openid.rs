use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::config::OpenIdConfig;
use crate::error::{Error, Result};

/// An OpenID Connect provider as offered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provider {
    pub name: String,
    pub key: String,
    pub auth_url: String,
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: String,
    pub redirect_url: String,
}

/// Lazily built, process-lifetime cache of the configured providers.
///
/// Providers are derived from configuration once, on the first call to
/// [`ProviderCache::ensure_providers_loaded`], and never refreshed.
pub struct ProviderCache {
    config: OpenIdConfig,
    providers: OnceLock<BTreeMap<String, Provider>>,
}

impl ProviderCache {
    #[must_use]
    pub fn new(config: OpenIdConfig) -> Self {
        Self {
            config,
            providers: OnceLock::new(),
        }
    }

    pub fn ensure_providers_loaded(&self) -> &BTreeMap<String, Provider> {
        self.providers.get_or_init(|| {
            if !self.config.enabled {
                return BTreeMap::new();
            }

            let providers: BTreeMap<String, Provider> = self
                .config
                .providers
                .iter()
                .map(|p| {
                    let key = provider_key(&p.name);
                    let provider = Provider {
                        name: p.name.clone(),
                        key: key.clone(),
                        auth_url: p.auth_url.clone(),
                        client_id: p.client_id.clone(),
                        client_secret: p.client_secret.clone(),
                        redirect_url: format!("{}{}", self.config.redirect_url, key),
                    };
                    (key, provider)
                })
                .collect();

            tracing::info!("Loaded {} openid provider(s)", providers.len());
            providers
        })
    }

    #[must_use]
    pub fn providers(&self) -> Vec<Provider> {
        self.ensure_providers_loaded().values().cloned().collect()
    }

    pub fn get_provider(&self, key: &str) -> Result<Provider> {
        self.ensure_providers_loaded()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::OpenIdProviderDoesNotExist {
                key: key.to_string(),
            })
    }
}

/// Lowercase alphanumerics of the provider name.
fn provider_key(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenIdProviderConfig;

    fn config(enabled: bool) -> OpenIdConfig {
        OpenIdConfig {
            enabled,
            redirect_url: "https://tasks.example.com/auth/openid/".to_string(),
            providers: vec![OpenIdProviderConfig {
                name: "Corp SSO-2".to_string(),
                auth_url: "https://sso.example.com".to_string(),
                client_id: "tasklane".to_string(),
                client_secret: "s3cret".to_string(),
            }],
        }
    }

    #[test]
    fn test_provider_key_and_redirect() {
        let cache = ProviderCache::new(config(true));
        let provider = cache.get_provider("corpsso2").unwrap();
        assert_eq!(provider.name, "Corp SSO-2");
        assert_eq!(
            provider.redirect_url,
            "https://tasks.example.com/auth/openid/corpsso2"
        );
    }

    #[test]
    fn test_disabled_yields_no_providers() {
        let cache = ProviderCache::new(config(false));
        assert!(cache.providers().is_empty());
        assert!(matches!(
            cache.get_provider("corpsso2"),
            Err(Error::OpenIdProviderDoesNotExist { .. })
        ));
    }

    #[test]
    fn test_secret_not_serialized() {
        let cache = ProviderCache::new(config(true));
        let json = serde_json::to_value(cache.providers()).unwrap();
        assert!(json[0].get("client_secret").is_none());
        assert_eq!(json[0]["key"], "corpsso2");
    }
}
