use std::time::Duration;

/// Default base URL of the remote API.
pub const DEFAULT_API_URL: &str = "https://backend-equipamento.onrender.com";

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "OFS_API_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "OFS_REQUEST_TIMEOUT_SECS";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL, without trailing slash (default: [`DEFAULT_API_URL`]).
    pub api_url: String,
    /// Timeout applied to each request (default: 30 s).
    pub request_timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected} (got {value:?})")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load `.env` (if present), then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                                   |
    /// |----------------------------|-------------------------------------------|
    /// | `OFS_API_URL`              | `https://backend-equipamento.onrender.com` |
    /// | `OFS_REQUEST_TIMEOUT_SECS` | `30`                                      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup(ENV_API_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: ENV_API_URL,
                expected: "an http(s) URL",
                value: api_url,
            });
        }

        let timeout_secs = match lookup(ENV_REQUEST_TIMEOUT_SECS) {
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: ENV_REQUEST_TIMEOUT_SECS,
                        expected: "a positive integer",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self::new(api_url).with_timeout(Duration::from_secs(timeout_secs)))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_applied_and_trailing_slash_trimmed() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "http://localhost:5000/"),
            (ENV_REQUEST_TIMEOUT_SECS, "10"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_REQUEST_TIMEOUT_SECS, "0")]));
        assert!(matches!(
            err,
            Err(ConfigError::Invalid { var: ENV_REQUEST_TIMEOUT_SECS, .. })
        ));
    }

    #[test]
    fn rejects_non_http_url() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_API_URL, "ftp://host")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "OFS_API_URL must be an http(s) URL (got \"ftp://host\")"
        );
    }
}
