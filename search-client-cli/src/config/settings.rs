//! Client settings read from the environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::CliError;
use search_client::{ClientConfig, NodeConfig};

/// Default search node URL.
const DEFAULT_NODES: &str = "http://localhost:8108";

/// Settings the CLI builds its [`ClientConfig`] from.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub nodes: Vec<String>,
    pub api_key: String,
    pub connection_timeout: Option<Duration>,
    pub num_retries: Option<u32>,
    pub cache_ttl: Option<Duration>,
    pub use_server_cache: bool,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_NODES`: Comma-separated node URLs (default: http://localhost:8108)
    /// - `SEARCH_API_KEY`: API key (required)
    /// - `SEARCH_CONNECTION_TIMEOUT_SECONDS`: Per-attempt request timeout
    /// - `SEARCH_NUM_RETRIES`: Retries after a failed attempt
    /// - `SEARCH_CACHE_TTL_SECONDS`: Default search cache lifetime
    /// - `SEARCH_USE_SERVER_CACHE`: Ask the server to use its search cache
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - Parsed settings
    /// * `Err(CliError)` - If a variable is missing or malformed
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let nodes = lookup("SEARCH_NODES")
            .unwrap_or_else(|| DEFAULT_NODES.to_string())
            .split(',')
            .map(str::trim)
            .filter(|node| !node.is_empty())
            .map(str::to_string)
            .collect();

        let api_key = lookup("SEARCH_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| CliError::config("SEARCH_API_KEY is required"))?;

        let connection_timeout =
            parse_var::<u64, _>(&lookup, "SEARCH_CONNECTION_TIMEOUT_SECONDS")?
                .map(Duration::from_secs);
        let num_retries = parse_var(&lookup, "SEARCH_NUM_RETRIES")?;
        let cache_ttl =
            parse_var::<u64, _>(&lookup, "SEARCH_CACHE_TTL_SECONDS")?.map(Duration::from_secs);
        let use_server_cache = parse_var(&lookup, "SEARCH_USE_SERVER_CACHE")?.unwrap_or(false);

        Ok(Self {
            nodes,
            api_key,
            connection_timeout,
            num_retries,
            cache_ttl,
            use_server_cache,
        })
    }

    /// Build the client configuration.
    pub fn client_config(&self) -> Result<ClientConfig, CliError> {
        let nodes = self
            .nodes
            .iter()
            .map(|url| NodeConfig::parse(url))
            .collect::<Result<Vec<_>, _>>()?;

        let mut config = ClientConfig::new(nodes, self.api_key.clone())
            .with_server_side_search_cache(self.use_server_cache);
        if let Some(timeout) = self.connection_timeout {
            config = config.with_connection_timeout(timeout);
        }
        if let Some(num_retries) = self.num_retries {
            config = config.with_num_retries(num_retries);
        }
        if let Some(ttl) = self.cache_ttl {
            config = config.with_cache_search_results_for(ttl);
        }

        info!(
            nodes = ?self.nodes,
            num_retries = config.num_retries,
            server_side_cache = self.use_server_cache,
            "Loaded client configuration"
        );

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, CliError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| CliError::config(format!("Invalid {}={:?}: {}", key, raw, e))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(lookup(&[("SEARCH_API_KEY", "xyz")])).unwrap();

        assert_eq!(settings.nodes, vec!["http://localhost:8108".to_string()]);
        assert_eq!(settings.api_key, "xyz");
        assert_eq!(settings.cache_ttl, None);
        assert!(!settings.use_server_cache);

        let config = settings.client_config().unwrap();
        assert_eq!(config.nodes, vec![NodeConfig::new("http", "localhost", 8108)]);
        assert_eq!(config.cache_search_results_for, Duration::ZERO);
    }

    #[test]
    fn test_missing_api_key() {
        let result = Settings::from_lookup(lookup(&[]));

        assert!(matches!(result, Err(CliError::ConfigError(_))));
    }

    #[test]
    fn test_all_variables() {
        let settings = Settings::from_lookup(lookup(&[
            ("SEARCH_API_KEY", "xyz"),
            ("SEARCH_NODES", "http://a:8108, https://b.example.com"),
            ("SEARCH_CONNECTION_TIMEOUT_SECONDS", "10"),
            ("SEARCH_NUM_RETRIES", "5"),
            ("SEARCH_CACHE_TTL_SECONDS", "60"),
            ("SEARCH_USE_SERVER_CACHE", "true"),
        ]))
        .unwrap();

        let config = settings.client_config().unwrap();
        assert_eq!(config.nodes.len(), 2);
        assert_eq!(config.nodes[1].port, 443);
        assert_eq!(config.connection_timeout, Duration::from_secs(10));
        assert_eq!(config.num_retries, 5);
        assert_eq!(config.cache_search_results_for, Duration::from_secs(60));
        assert!(config.use_server_side_search_cache);
    }

    #[test]
    fn test_malformed_number() {
        let result = Settings::from_lookup(lookup(&[
            ("SEARCH_API_KEY", "xyz"),
            ("SEARCH_NUM_RETRIES", "many"),
        ]));

        assert!(matches!(result, Err(CliError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_node_url() {
        let settings = Settings::from_lookup(lookup(&[
            ("SEARCH_API_KEY", "xyz"),
            ("SEARCH_NODES", "not a url"),
        ]))
        .unwrap();

        assert!(matches!(
            settings.client_config(),
            Err(CliError::ClientError(_))
        ));
    }
}
