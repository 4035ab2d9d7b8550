use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use crate::error::{AppError, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    /// Directory holding `pages.json` and `settings.json`.
    pub data_dir: PathBuf,
    /// Largest request body accepted; full-page captures can be several megabytes.
    pub max_body_bytes: usize,
}

pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let data_dir = env::var("PAGE_QA_DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let mut config = Self::from_parts(&host, &port, &data_dir)?;
        if let Ok(limit) = env::var("PAGE_QA_MAX_BODY_BYTES") {
            config.max_body_bytes = parse_body_limit(&limit)?;
        }
        Ok(config)
    }

    pub fn from_parts(host: &str, port: &str, data_dir: &str) -> Result<Self> {
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;
        if data_dir.trim().is_empty() {
            return Err(AppError::ConfigError("PAGE_QA_DATA_DIR must not be empty".to_string()));
        }

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            data_dir: PathBuf::from(data_dir),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }
}

fn parse_body_limit(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(AppError::ConfigError("PAGE_QA_MAX_BODY_BYTES must be positive".to_string())),
        Ok(n) => Ok(n),
        Err(e) => Err(AppError::ConfigError(format!("Invalid PAGE_QA_MAX_BODY_BYTES: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_socket_addr_from_parts() {
        let config = Config::from_parts("0.0.0.0", "8080", "/tmp/qa").unwrap();
        assert_eq!(config.server_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/qa"));
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn body_limit_must_be_a_positive_number() {
        assert_eq!(parse_body_limit(" 1048576 ").unwrap(), 1_048_576);
        assert!(matches!(parse_body_limit("0"), Err(AppError::ConfigError(_))));
        assert!(matches!(parse_body_limit("lots"), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn rejects_bad_port_and_host() {
        assert!(matches!(
            Config::from_parts("127.0.0.1", "http", "data"),
            Err(AppError::ConfigError(_))
        ));
        assert!(matches!(
            Config::from_parts("localhost", "3000", "data"),
            Err(AppError::ConfigError(_))
        ));
    }
}
