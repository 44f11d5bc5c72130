use anyhow::Context;
use axum::http::StatusCode;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    /// Prefix of every short URL handed out, without a trailing slash
    pub base_url: String,
    #[serde(default)]
    pub redirect_status: RedirectMode,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// HTTP status used for redirects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectMode {
    /// 301
    #[default]
    MovedPermanently,
    /// 302
    Found,
    /// 307
    TemporaryRedirect,
    /// 308
    PermanentRedirect,
}

impl RedirectMode {
    pub fn status_code(self) -> StatusCode {
        match self {
            RedirectMode::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
            RedirectMode::Found => StatusCode::FOUND,
            RedirectMode::TemporaryRedirect => StatusCode::TEMPORARY_REDIRECT,
            RedirectMode::PermanentRedirect => StatusCode::PERMANENT_REDIRECT,
        }
    }

    pub fn from_status(value: &str) -> Option<Self> {
        match value.trim() {
            "301" => Some(RedirectMode::MovedPermanently),
            "302" => Some(RedirectMode::Found),
            "307" => Some(RedirectMode::TemporaryRedirect),
            "308" => Some(RedirectMode::PermanentRedirect),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustedProxyMode {
    /// Record the socket peer address as-is
    #[default]
    None,
    /// Trust the Forwarded / X-Forwarded-For headers
    Standard,
    /// Trust CF-Connecting-IP
    Cloudflare,
}

/// How the requester address recorded with each visit is resolved
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub trusted_proxy_mode: TrustedProxyMode,
    /// Proxy networks whose forwarding headers are believed (standard mode)
    #[serde(default)]
    pub trusted_proxies: Vec<IpNet>,
    /// Fixed number of proxy hops in front of the service (standard mode)
    #[serde(default)]
    pub num_trusted_proxies: Option<usize>,
}

/// Values supplied on the command line; they take precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            base_url: default_base_url(DEFAULT_PORT),
            redirect_status: RedirectMode::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

fn default_base_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::load(ConfigOverrides::default())
    }

    pub fn load(overrides: ConfigOverrides) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = match overrides.host {
            Some(host) => host,
            None => std::env::var("HASHLINK_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
        };

        let port = match overrides.port {
            Some(port) => port,
            None => match std::env::var("HASHLINK_PORT") {
                Ok(v) => v
                    .parse::<u16>()
                    .with_context(|| format!("HASHLINK_PORT must be a port number, got '{v}'"))?,
                Err(_) => DEFAULT_PORT,
            },
        };

        let base_url = overrides
            .base_url
            .or_else(|| std::env::var("HASHLINK_BASE_URL").ok())
            .unwrap_or_else(|| default_base_url(port))
            .trim_end_matches('/')
            .to_string();

        let redirect_status = match std::env::var("REDIRECT_STATUS") {
            Ok(v) => RedirectMode::from_status(&v).unwrap_or_else(|| {
                tracing::warn!(
                    "Unknown REDIRECT_STATUS '{v}', falling back to 301. Supported values: 301, 302, 307, 308"
                );
                RedirectMode::default()
            }),
            Err(_) => RedirectMode::default(),
        };

        let trusted_proxy_mode = match std::env::var("TRUSTED_PROXY_MODE")
            .unwrap_or_else(|_| "none".to_string())
            .to_lowercase()
            .as_str()
        {
            "none" => TrustedProxyMode::None,
            "standard" => TrustedProxyMode::Standard,
            "cloudflare" => TrustedProxyMode::Cloudflare,
            other => {
                tracing::warn!(
                    "Unknown TRUSTED_PROXY_MODE '{other}', falling back to 'none'. Supported values: none, standard, cloudflare"
                );
                TrustedProxyMode::None
            }
        };

        let trusted_proxies = match std::env::var("TRUSTED_PROXIES") {
            Ok(v) => parse_trusted_proxies(&v).context("TRUSTED_PROXIES must be a list of CIDRs")?,
            Err(_) => Vec::new(),
        };

        let num_trusted_proxies = std::env::var("NUM_TRUSTED_PROXIES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());

        Ok(Config {
            server: ServerConfig { host, port },
            base_url,
            redirect_status,
            analytics: AnalyticsConfig {
                trusted_proxy_mode,
                trusted_proxies,
                num_trusted_proxies,
            },
        })
    }

    /// Full short URL for a code
    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}/{}", self.base_url, short_code)
    }
}

/// Parse a comma-separated list of networks. Bare addresses are taken as single-host networks.
pub fn parse_trusted_proxies(value: &str) -> anyhow::Result<Vec<IpNet>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IpNet>()
                .or_else(|_| s.parse::<std::net::IpAddr>().map(IpNet::from))
                .with_context(|| format!("invalid network '{s}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(
            config.redirect_status.status_code(),
            StatusCode::MOVED_PERMANENTLY
        );
        assert_eq!(config.analytics.trusted_proxy_mode, TrustedProxyMode::None);
    }

    #[test]
    fn test_short_url() {
        let config = Config {
            base_url: "https://sho.rt".to_string(),
            ..Config::default()
        };
        assert_eq!(config.short_url("f0e6a6a9"), "https://sho.rt/f0e6a6a9");
    }

    #[test]
    fn test_redirect_mode_from_status() {
        assert_eq!(
            RedirectMode::from_status("302"),
            Some(RedirectMode::Found)
        );
        assert_eq!(
            RedirectMode::from_status(" 308 "),
            Some(RedirectMode::PermanentRedirect)
        );
        assert_eq!(RedirectMode::from_status("200"), None);
        assert_eq!(
            RedirectMode::TemporaryRedirect.status_code(),
            StatusCode::TEMPORARY_REDIRECT
        );
    }

    #[test]
    fn test_parse_trusted_proxies() {
        let nets = parse_trusted_proxies("10.0.0.0/8, 192.168.1.1,,2001:db8::/32").unwrap();
        assert_eq!(nets.len(), 3);
        assert!(nets[1].contains(&"192.168.1.1".parse::<std::net::IpAddr>().unwrap()));
        assert_eq!(nets[1].prefix_len(), 32);

        assert!(parse_trusted_proxies("not-a-network").is_err());
        assert!(parse_trusted_proxies("").unwrap().is_empty());
    }
}
