//! Server configuration loaded from environment variables.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use tracing::warn;

pub const DEV_SECRET: &str = "it's a secret";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Env: `WARBLER_DB_PATH`
    pub db_path: PathBuf,
    /// Env: `WARBLER_HOST`
    pub host: IpAddr,
    /// Env: `WARBLER_PORT`
    pub port: u16,
    /// Signs session tokens. Env: `WARBLER_SECRET_KEY`
    pub secret_key: String,
    /// Env: `WARBLER_SESSION_DAYS`
    pub session_days: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("warbler.db"),
            host: IpAddr::from([0, 0, 0, 0]),
            port: 5000,
            secret_key: DEV_SECRET.to_string(),
            session_days: 30,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("WARBLER_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(host) = lookup("WARBLER_HOST") {
            match host.parse() {
                Ok(parsed) => config.host = parsed,
                Err(_) => warn!(value = %host, "Invalid WARBLER_HOST, using default"),
            }
        }

        if let Some(port) = lookup("WARBLER_PORT") {
            match port.parse() {
                Ok(parsed) => config.port = parsed,
                Err(_) => warn!(value = %port, "Invalid WARBLER_PORT, using default"),
            }
        }

        match lookup("WARBLER_SECRET_KEY") {
            Some(secret) if !secret.is_empty() => config.secret_key = secret,
            _ => warn!("WARBLER_SECRET_KEY not set, using the development secret"),
        }

        if let Some(days) = lookup("WARBLER_SESSION_DAYS") {
            match days.parse::<i64>() {
                Ok(parsed) if parsed > 0 => config.session_days = parsed,
                _ => warn!(value = %days, "Invalid WARBLER_SESSION_DAYS, using default"),
            }
        }

        config
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config.addr(), ([0, 0, 0, 0], 5000).into());
        assert_eq!(config.db_path, PathBuf::from("warbler.db"));
        assert_eq!(config.secret_key, DEV_SECRET);
        assert_eq!(config.session_days, 30);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("WARBLER_DB_PATH", "/tmp/w.db"),
            ("WARBLER_HOST", "127.0.0.1"),
            ("WARBLER_PORT", "8080"),
            ("WARBLER_SECRET_KEY", "s3cr3t"),
            ("WARBLER_SESSION_DAYS", "7"),
        ]));
        assert_eq!(config.addr(), ([127, 0, 0, 1], 8080).into());
        assert_eq!(config.db_path, PathBuf::from("/tmp/w.db"));
        assert_eq!(config.secret_key, "s3cr3t");
        assert_eq!(config.session_days, 7);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("WARBLER_HOST", "not-an-ip"),
            ("WARBLER_PORT", "99999"),
            ("WARBLER_SESSION_DAYS", "-1"),
        ]));
        assert_eq!(config.addr(), ([0, 0, 0, 0], 5000).into());
        assert_eq!(config.session_days, 30);
    }
}
