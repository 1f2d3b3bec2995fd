//! Configuration management for the gateway
//!
//! Supports configuration via:
//! - Environment variables (primary)
//! - Optional TOML config file (secondary)
//!
//! Environment variables take precedence over config file values. Provider
//! credentials are deliberately not validated here: absent variables yield
//! empty strings and the storage calls fail when they are first used.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Request timeout in seconds (default: 300)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_bind_address() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Provider account and bucket settings
///
/// All fields are plain strings. Empty values are allowed and surface as
/// call-time failures from the storage client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KodoConfig {
    /// Storage region identifier
    #[serde(default)]
    pub region: String,

    /// Endpoint, also the base for public download links
    #[serde(default)]
    pub endpoint: String,

    /// Bucket name
    #[serde(default)]
    pub bucket: String,

    /// Account access key
    #[serde(default)]
    pub access_key: String,

    /// Account secret key
    #[serde(default)]
    pub secret_key: String,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Provider configuration
    #[serde(default)]
    pub kodo: KodoConfig,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - PORT: listen port (default: 8080, silently kept on parse failure)
    /// - QINIU_REGION: storage region
    /// - QINIU_ENDPOINT: endpoint and public link base
    /// - QINIU_BUCKET: bucket name
    /// - QINIU_ACCESSKEY (or QINIU_SECRETID): account access key
    /// - QINIU_SECRETKEY: account secret key
    /// - KODO_GATEWAY_TIMEOUT_SECS: request timeout (default: 300)
    /// - KODO_GATEWAY_CONFIG_FILE: optional path to TOML config file
    pub fn from_env() -> anyhow::Result<Self> {
        // Try to load from config file first if specified
        let mut config = match std::env::var("KODO_GATEWAY_CONFIG_FILE") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        // Override with environment variables
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.server.bind_address = SocketAddr::from(([0, 0, 0, 0], port));
            }
        }

        if let Ok(timeout) = std::env::var("KODO_GATEWAY_TIMEOUT_SECS") {
            config.server.timeout_secs = timeout
                .parse()
                .context("KODO_GATEWAY_TIMEOUT_SECS must be an integer")?;
        }

        if let Ok(region) = std::env::var("QINIU_REGION") {
            config.kodo.region = region;
        }

        if let Ok(endpoint) = std::env::var("QINIU_ENDPOINT") {
            config.kodo.endpoint = endpoint;
        }

        if let Ok(bucket) = std::env::var("QINIU_BUCKET") {
            config.kodo.bucket = bucket;
        }

        // Two spellings of the access key variable survive in deployments
        if let Ok(key) = std::env::var("QINIU_ACCESSKEY").or_else(|_| std::env::var("QINIU_SECRETID")) {
            config.kodo.access_key = key;
        }

        if let Ok(secret) = std::env::var("QINIU_SECRETKEY") {
            config.kodo.secret_key = secret;
        }

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {path}"))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {path}"))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.server.timeout_secs, 300);
        assert!(config.kodo.bucket.is_empty());
        assert!(config.kodo.access_key.is_empty());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[server]
bind_address = "127.0.0.1:9000"
timeout_secs = 30

[kodo]
region = "cn-east-1"
endpoint = "https://media.example.com"
bucket = "media"
access_key = "ak"
secret_key = "sk"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.kodo.region, "cn-east-1");
        assert_eq!(config.kodo.bucket, "media");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[kodo]\nbucket = \"media\"\n").unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.timeout_secs, 300);
        assert_eq!(config.kodo.bucket, "media");
        assert!(config.kodo.region.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        // The only test touching the process environment, so parallel test
        // threads cannot observe partial state through from_env.
        std::env::set_var("PORT", "not-a-port");
        std::env::set_var("QINIU_BUCKET", "from-env");

        let config = Config::from_env().unwrap();
        // Unparseable PORT keeps the default bind address
        assert_eq!(config.server.bind_address, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.kodo.bucket, "from-env");

        std::env::remove_var("PORT");
        std::env::remove_var("QINIU_BUCKET");
    }
}
