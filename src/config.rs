use std::net::SocketAddr;
use std::path::PathBuf;

use leptos::logging::log;

pub const DEFAULT_DB_PATH: &str = "confabstracts.db";
pub const DEFAULT_SITE_ADDR: &str = "127.0.0.1:3004";
pub const DEFAULT_STORAGE_DIR: &str = "storage";

/// Server settings, read from `CONFABSTRACTS_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: String,
    pub site_addr: SocketAddr,
    /// Directory holding uploaded abstract attachments.
    pub storage_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let db_path = lookup("CONFABSTRACTS_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let raw_addr =
            lookup("CONFABSTRACTS_SITE_ADDR").unwrap_or_else(|| DEFAULT_SITE_ADDR.to_string());
        let site_addr: SocketAddr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|e| format!("invalid CONFABSTRACTS_SITE_ADDR '{}': {}", raw_addr, e))?;
        let storage_dir = lookup("CONFABSTRACTS_STORAGE_DIR")
            .unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_string())
            .into();

        let config = AppConfig {
            db_path,
            site_addr,
            storage_dir,
        };
        log!("[CONFIG] Loaded {:?}", config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
        assert_eq!(config.site_addr.port(), 3004);
        assert_eq!(config.storage_dir, PathBuf::from(DEFAULT_STORAGE_DIR));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CONFABSTRACTS_DB_PATH", "/tmp/test.db"),
            ("CONFABSTRACTS_SITE_ADDR", "0.0.0.0:8000"),
        ]
        .into_iter()
        .collect();
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.db_path, "/tmp/test.db");
        assert_eq!(config.site_addr.port(), 8000);
    }

    #[test]
    fn test_invalid_addr() {
        let err = AppConfig::from_lookup(|k| {
            (k == "CONFABSTRACTS_SITE_ADDR").then(|| "localhost".to_string())
        })
        .unwrap_err();
        assert!(err.contains("CONFABSTRACTS_SITE_ADDR"));
    }
}
