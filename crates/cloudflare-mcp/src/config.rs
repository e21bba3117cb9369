//! Startup configuration: the Cloudflare API token and where to send requests.

use std::fmt;
use std::str::FromStr;

/// Environment variable holding the bearer token.
pub const API_TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";

/// Base URL of the Cloudflare v4 API.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Bearer credential for the Cloudflare API.
///
/// `Debug` and `Display` only ever show the length and the masked form.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw secret, for the `Authorization` header only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First four and last four characters joined by `...`.
    ///
    /// Tokens shorter than four characters are shown whole on both sides.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let head: String = chars.iter().take(4).collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiToken")
            .field("length", &self.len())
            .field("masked", &self.masked())
            .finish()
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Which implementation of the Cloudflare capability to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Typed API client (primary).
    #[default]
    Client,
    /// Raw JSON requests against the base URL (fallback).
    Direct,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Client => write!(f, "client"),
            Transport::Direct => write!(f, "direct"),
        }
    }
}

impl FromStr for Transport {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Transport::Client),
            "direct" => Ok(Transport::Direct),
            _ => Err(format!("Unknown transport '{}': must be client or direct", s)),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cloudflare API token not found in environment variables ({0} is not set)")]
    MissingToken(&'static str),
    #[error("Cloudflare API token is empty ({0})")]
    EmptyToken(&'static str),
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: ApiToken,
    pub base_url: String,
    pub transport: Transport,
}

impl Config {
    /// Read the token from the process environment.
    pub fn from_env(base_url: &str, transport: Transport) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), base_url, transport)
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, base_url: &str, transport: Transport) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(API_TOKEN_ENV).ok_or(ConfigError::MissingToken(API_TOKEN_ENV))?;
        let token = token.trim();
        if token.is_empty() {
            return Err(ConfigError::EmptyToken(API_TOKEN_ENV));
        }

        Ok(Self {
            api_token: ApiToken::new(token),
            base_url: normalize_base_url(base_url)?,
            transport,
        })
    }
}

/// Check the base URL is an absolute http(s) URL and drop trailing slashes.
fn normalize_base_url(url: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = reqwest::Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    Ok(url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(value: Option<&str>) -> impl Fn(&str) -> Option<String> {
        let value = value.map(str::to_string);
        move |key: &str| {
            assert_eq!(key, API_TOKEN_ENV);
            value.clone()
        }
    }

    #[test]
    fn test_masked_token() {
        let token = ApiToken::new("abcd1234efgh");
        assert_eq!(token.len(), 12);
        assert_eq!(token.masked(), "abcd...efgh");
    }

    #[test]
    fn test_masked_short_token() {
        assert_eq!(ApiToken::new("abc").masked(), "abc...abc");
        assert_eq!(ApiToken::new("abcdef").masked(), "abcd...cdef");
    }

    #[test]
    fn test_debug_never_leaks_secret() {
        let token = ApiToken::new("abcd-secret-middle-wxyz");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("abcd...wxyz"));
        assert!(!format!("{}", token).contains("middle"));
    }

    #[test]
    fn test_config_from_lookup() {
        let config = Config::from_lookup(lookup(Some("tok-123456")), DEFAULT_BASE_URL, Transport::Client).unwrap();
        assert_eq!(config.api_token.expose(), "tok-123456");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.transport, Transport::Client);
    }

    #[test]
    fn test_config_missing_token() {
        let err = Config::from_lookup(lookup(None), DEFAULT_BASE_URL, Transport::Client).unwrap_err();
        assert_eq!(err, ConfigError::MissingToken(API_TOKEN_ENV));
    }

    #[test]
    fn test_config_blank_token() {
        let err = Config::from_lookup(lookup(Some("   ")), DEFAULT_BASE_URL, Transport::Client).unwrap_err();
        assert_eq!(err, ConfigError::EmptyToken(API_TOKEN_ENV));
    }

    #[test]
    fn test_base_url_normalized() {
        let config = Config::from_lookup(lookup(Some("t")), "http://127.0.0.1:9000/client/v4/", Transport::Direct).unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000/client/v4");
    }

    #[test]
    fn test_base_url_rejected() {
        for url in ["not a url", "ftp://example.com"] {
            let err = Config::from_lookup(lookup(Some("t")), url, Transport::Client).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
        }
    }

    #[test]
    fn test_transport_from_str() {
        assert_eq!("client".parse::<Transport>(), Ok(Transport::Client));
        assert_eq!("direct".parse::<Transport>(), Ok(Transport::Direct));
        assert!("http".parse::<Transport>().is_err());
        assert_eq!(Transport::Direct.to_string(), "direct");
    }
}
