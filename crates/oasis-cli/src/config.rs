//! CLI configuration.

use oasis_client::ClientConfig;

/// Resolved settings for one CLI invocation.
pub struct Config {
    /// API client settings.
    pub client: ClientConfig,

    /// Page size for list commands.
    pub page_limit: u32,

    /// Print raw JSON instead of tables.
    pub json: bool,
}

impl Config {
    pub fn new(api_url: String, timeout_secs: u64, page_limit: u32, json: bool) -> Self {
        Self {
            client: ClientConfig {
                base_url: api_url,
                timeout_secs,
                ..ClientConfig::default()
            },
            page_limit: page_limit.max(1),
            json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_clamped() {
        let config = Config::new("http://example.org/api".into(), 5, 0, false);
        assert_eq!(config.page_limit, 1);
        assert_eq!(config.client.timeout_secs, 5);
        assert_eq!(config.client.base_url, "http://example.org/api");
    }
}
