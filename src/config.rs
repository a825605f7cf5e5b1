//! Configuration Management Module
//!
//! Handles loading and validating the swap client configuration: cluster
//! connection, escrow program id, signer settings, and the offer polling
//! interval.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::error::SwapError;

/// Main configuration structure for the swap client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapConfig {
    /// Cluster connection and program location
    pub cluster: ClusterConfig,
    /// Signer settings
    pub signer: SignerConfig,
    /// Service-level settings (polling, timeouts)
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Cluster connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Human-readable name for the cluster (e.g., "devnet")
    pub name: String,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Program ID of the swap escrow program (base58)
    pub program_id: String,
}

/// Signer configuration.
///
/// The private key itself never lives in config files; config holds the name
/// of an environment variable containing the base58-encoded key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Environment variable name containing the signer private key (base58)
    pub private_key_env: String,
}

/// Service-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Offer polling interval in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl SwapConfig {
    /// Loads configuration from a TOML file.
    ///
    /// Resolution order: explicit path, then the `SWAP_CONFIG_PATH`
    /// environment variable, then `config/swap.toml`. A missing file is an
    /// error that tells the user to copy the template.
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to the config file
    ///
    /// # Returns
    ///
    /// * `Ok(SwapConfig)` - Loaded and validated configuration
    /// * `Err(SwapError::Config)` - Missing file, parse failure, or invalid values
    pub fn load_from_path(path: Option<&str>) -> Result<Self, SwapError> {
        let config_path = path
            .map(|p| p.to_string())
            .or_else(|| std::env::var("SWAP_CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/swap.toml".to_string());

        if !std::path::Path::new(&config_path).exists() {
            return Err(SwapError::Config(format!(
                "Configuration file '{config_path}' not found. Please copy the template:\n\
                cp config/swap.template.toml config/swap.toml\n\
                Then edit config/swap.toml with your actual values."
            )));
        }

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| SwapError::Config(format!("failed to read {config_path}: {e}")))?;
        let config: SwapConfig = toml::from_str(&content)
            .map_err(|e| SwapError::Config(format!("failed to parse {config_path}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration using the default path resolution.
    pub fn load() -> Result<Self, SwapError> {
        Self::load_from_path(None)
    }

    /// Validates the configuration for consistency.
    ///
    /// Checks:
    /// - RPC URL looks like an HTTP endpoint
    /// - Program id parses as a base58 pubkey
    /// - Signer env var name is non-empty
    /// - Polling interval is positive
    pub fn validate(&self) -> Result<(), SwapError> {
        if !self.cluster.rpc_url.starts_with("http://") && !self.cluster.rpc_url.starts_with("https://")
        {
            return Err(SwapError::Config(format!(
                "rpc_url must be an http(s) endpoint, got '{}'",
                self.cluster.rpc_url
            )));
        }
        self.program_id()?;
        if self.signer.private_key_env.trim().is_empty() {
            return Err(SwapError::Config(
                "signer.private_key_env must name an environment variable".to_string(),
            ));
        }
        if self.service.poll_interval_secs == 0 {
            return Err(SwapError::Config(
                "service.poll_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The escrow program id as a parsed pubkey.
    pub fn program_id(&self) -> Result<Pubkey, SwapError> {
        Pubkey::from_str(&self.cluster.program_id).map_err(|_| {
            SwapError::Config(format!(
                "invalid cluster.program_id '{}'",
                self.cluster.program_id
            ))
        })
    }
}
