use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use httpkit_core::ConfigError;
use httpkit_core::headers::DEFAULT_ALLOWED_ORIGIN;

use crate::middleware::CorsPolicy;

pub const HTTP_HOST_ENV: &str = "HTTP_HOST";
pub const HTTP_PORT_ENV: &str = "HTTP_PORT";
pub const APP_NAME_ENV: &str = "APP_NAME";
pub const CORS_ALLOWED_ORIGIN_ENV: &str = "CORS_ALLOWED_ORIGIN";

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_APP_NAME: &str = "httpkit";

/// Listener and CORS settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub app_name: String,
    pub cors_allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            app_name: DEFAULT_APP_NAME.to_string(),
            cors_allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset or blank keys fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get(HTTP_HOST_ENV) {
            config.host = host
                .trim()
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::invalid(HTTP_HOST_ENV, e.to_string()))?;
        }
        if let Some(port) = get(HTTP_PORT_ENV) {
            config.port = port
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::invalid(HTTP_PORT_ENV, e.to_string()))?;
        }
        if let Some(name) = get(APP_NAME_ENV) {
            config.app_name = name;
        }
        if let Some(origin) = get(CORS_ALLOWED_ORIGIN_ENV) {
            config.cors_allowed_origin = origin;
        }

        // Fail at startup rather than on the first request.
        config.cors_policy()?;
        Ok(config)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn cors_policy(&self) -> Result<CorsPolicy, ConfigError> {
        CorsPolicy::default()
            .with_origin(&self.cors_allowed_origin)
            .map_err(|e| match e {
                ConfigError::Missing(_) => ConfigError::missing(CORS_ALLOWED_ORIGIN_ENV),
                ConfigError::Invalid { reason, .. } => {
                    ConfigError::invalid(CORS_ALLOWED_ORIGIN_ENV, reason)
                }
            })
    }
}
