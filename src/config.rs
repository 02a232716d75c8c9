//! Dispatcher configuration.
use crate::constants::{
    DEFAULT_ENDPOINT, DEFAULT_EXISTS_API, DEFAULT_ITEMS_API, DEFAULT_NETWORK, DEFAULT_PAGE_SIZE,
    DEFAULT_TOKEN_ATTEMPTS, DEFAULT_TOKEN_BACKOFF_MS,
};
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use url::Url;

/// Dispatcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Ledger JSON-RPC endpoint transactions are submitted to.
    #[serde(default = "default_endpoint")]
    pub endpoint: Url,
    /// Item listing endpoint for claim mode.
    #[serde(default = "default_items_api")]
    pub items_api: Url,
    /// Existence-check endpoint for unique token generation.
    #[serde(default = "default_exists_api")]
    pub exists_api: Url,
    /// Network scope for item listing queries.
    #[serde(default = "default_network")]
    pub network: String,
    /// Items fetched per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Attempt budget for unique token generation.
    #[serde(default = "default_token_attempts")]
    pub token_attempts: u32,
    /// Delay between token generation attempts, in milliseconds.
    #[serde(default = "default_token_backoff_ms")]
    pub token_backoff_ms: u64,
}

fn default_endpoint() -> Url {
    DEFAULT_ENDPOINT.parse().expect("default endpoint is a valid URL")
}

fn default_items_api() -> Url {
    DEFAULT_ITEMS_API.parse().expect("default items API is a valid URL")
}

fn default_exists_api() -> Url {
    DEFAULT_EXISTS_API.parse().expect("default exists API is a valid URL")
}

fn default_network() -> String {
    DEFAULT_NETWORK.to_string()
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_token_attempts() -> u32 {
    DEFAULT_TOKEN_ATTEMPTS
}

fn default_token_backoff_ms() -> u64 {
    DEFAULT_TOKEN_BACKOFF_MS
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            items_api: default_items_api(),
            exists_api: default_exists_api(),
            network: default_network(),
            page_size: default_page_size(),
            token_attempts: default_token_attempts(),
            token_backoff_ms: default_token_backoff_ms(),
        }
    }
}

impl DispatcherConfig {
    /// Sets the ledger endpoint.
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the item listing endpoint.
    pub fn with_items_api(mut self, items_api: Url) -> Self {
        self.items_api = items_api;
        self
    }

    /// Sets the existence-check endpoint.
    pub fn with_exists_api(mut self, exists_api: Url) -> Self {
        self.exists_api = exists_api;
        self
    }

    /// Sets the listing network scope.
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    /// Sets the listing page size.
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to open config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path.as_ref(), content)
            .wrap_err_with(|| format!("failed to write config file: {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Loads the configuration from `path`, falling back to defaults and
    /// storing them when the file does not exist yet.
    pub fn load_or_init<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_file(path)
        } else {
            info!(path = %path.display(), "no config file, writing defaults");
            let config = Self::default();
            config.save_to_file(path)?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_yaml() {
        let config = DispatcherConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let from_yaml = serde_yaml::from_str::<DispatcherConfig>(&yaml).unwrap();
        assert_eq!(config.endpoint, from_yaml.endpoint);
        assert_eq!(config.page_size, from_yaml.page_size);
        assert_eq!(config.network, from_yaml.network);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config =
            serde_yaml::from_str::<DispatcherConfig>("endpoint: http://localhost:8545/").unwrap();
        assert_eq!(config.endpoint.as_str(), "http://localhost:8545/");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.token_attempts, DEFAULT_TOKEN_ATTEMPTS);
    }

    #[test]
    fn builders_override_defaults() {
        let config = DispatcherConfig::default()
            .with_endpoint("http://localhost:8545/".parse().unwrap())
            .with_network("eip155:1")
            .with_page_size(25);
        assert_eq!(config.endpoint.as_str(), "http://localhost:8545/");
        assert_eq!(config.network, "eip155:1");
        assert_eq!(config.page_size, 25);
    }
}
