//! # Configuration
//!
//! Layered settings for the autosender.
//!
//! Sources, later ones winning:
//!
//! 1. Built-in defaults (the OneFinity test network)
//! 2. `autosender.{toml,yaml,json}` in the working directory, or the file
//!    passed explicitly
//! 3. Environment variables prefixed `AUTOSENDER__`, nested with `__`
//!    (for example `AUTOSENDER__WALLET__PRIVATE_KEY`)
//!
//! A `.env` file is loaded into the environment first.
//!
//! # Examples
//!
//! ```
//! use testnet_autosender::config::Settings;
//!
//! let settings = Settings::default();
//! assert_eq!(settings.network.chain_id, 999_987);
//! assert!(settings.validate().is_ok());
//! ```

use crate::application::services::{
    AutomationConfig, DispatchConfig, FaucetConfig, RetryPolicy,
};
use crate::domain::value_objects::{parse_address, ChainId, NativeAmount};
use crate::infrastructure::blockchain::{AddChainParams, GasEstimator, NativeCurrency};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Upper bound for the gas-limit buffer.
const MAX_GAS_BUFFER_PERCENT: u64 = 1_000;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "AUTOSENDER";

/// Default configuration file stem.
pub const DEFAULT_CONFIG_FILE: &str = "autosender";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value failed validation.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Dotted key of the offending value.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Target network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// EIP-155 chain ID.
    pub chain_id: u64,
    /// Human-readable name.
    pub chain_name: String,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Block explorer.
    pub explorer_url: String,
    /// Native currency name.
    pub currency_name: String,
    /// Native currency symbol.
    pub currency_symbol: String,
    /// Native currency decimals.
    pub decimals: u32,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            chain_id: ChainId::ONEFINITY_TESTNET.as_u64(),
            chain_name: "OneFinity Testnet".to_string(),
            rpc_url: "https://testnet-rpc.onefinity.network".to_string(),
            explorer_url: "https://testnet-explorer.onefinity.network/".to_string(),
            currency_name: "ONE".to_string(),
            currency_symbol: "ONE".to_string(),
            decimals: 18,
        }
    }
}

/// Faucet endpoint and threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaucetSettings {
    /// Faucet URL.
    pub url: String,
    /// Balance at or above which no request is made.
    pub threshold: NativeAmount,
    /// HTTP timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for FaucetSettings {
    fn default() -> Self {
        Self {
            url: "https://testnet-api.onefinity.network/faucet".to_string(),
            threshold: NativeAmount::ONE,
            timeout_ms: 30_000,
        }
    }
}

/// Transfer parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// Amount sent per transfer.
    pub amount: NativeAmount,
    /// Default receiver.
    pub receiver: Option<String>,
    /// Gas-limit buffer in percent.
    pub gas_buffer_percent: u64,
    /// Confirmations to wait for.
    pub confirmations: usize,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            amount: DispatchConfig::DEFAULT_AMOUNT,
            receiver: None,
            gas_buffer_percent: GasEstimator::DEFAULT_BUFFER_PERCENT,
            confirmations: 1,
        }
    }
}

/// Loop pacing and retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    /// Minimum time between faucet attempts, in milliseconds.
    pub faucet_interval_ms: u64,
    /// Pause between transfers, in milliseconds.
    pub tx_interval_ms: u64,
    /// Balance refresh period, in milliseconds.
    pub balance_poll_ms: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay between attempts, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            faucet_interval_ms: 310_000,
            tx_interval_ms: 10_000,
            balance_poll_ms: 10_000,
            max_retries: RetryPolicy::DEFAULT_MAX_RETRIES,
            retry_delay_ms: 5_000,
        }
    }
}

/// Signing wallet.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletSettings {
    /// Hex-encoded private key.
    pub private_key: Option<String>,
}

impl fmt::Debug for WalletSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSettings")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Complete settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target network.
    pub network: NetworkSettings,
    /// Faucet.
    pub faucet: FaucetSettings,
    /// Transfers.
    pub transfer: TransferSettings,
    /// Loop pacing.
    pub automation: AutomationSettings,
    /// Wallet.
    pub wallet: WalletSettings,
}

impl Settings {
    /// Loads settings from defaults, a file, and the environment.
    ///
    /// With `path` the file must exist; without it `autosender.*` is read
    /// if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source is unreadable or a value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(path = %env_file.display(), "loaded .env");
        }

        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Checks values that would make the services misbehave.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.rpc_url.trim().is_empty() {
            return Err(ConfigError::invalid("network.rpc_url", "must not be empty"));
        }
        if self.faucet.url.trim().is_empty() {
            return Err(ConfigError::invalid("faucet.url", "must not be empty"));
        }
        if self.transfer.amount.is_zero() {
            return Err(ConfigError::invalid("transfer.amount", "must be positive"));
        }
        self.transfer
            .amount
            .to_base_units(self.network.decimals)
            .map_err(|e| ConfigError::invalid("transfer.amount", e.to_string()))?;
        if let Some(receiver) = self.receiver() {
            parse_address(receiver)
                .map_err(|e| ConfigError::invalid("transfer.receiver", e.to_string()))?;
        }

        if self.transfer.gas_buffer_percent > MAX_GAS_BUFFER_PERCENT {
            return Err(ConfigError::invalid(
                "transfer.gas_buffer_percent",
                format!("must be at most {}", MAX_GAS_BUFFER_PERCENT),
            ));
        }

        let intervals = [
            ("automation.faucet_interval_ms", self.automation.faucet_interval_ms),
            ("automation.tx_interval_ms", self.automation.tx_interval_ms),
            ("automation.balance_poll_ms", self.automation.balance_poll_ms),
            ("faucet.timeout_ms", self.faucet.timeout_ms),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(ConfigError::invalid(field, "must be greater than zero"));
            }
        }
        Ok(())
    }

    /// Configured chain.
    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        ChainId::new(self.network.chain_id)
    }

    /// Configured receiver, if not blank.
    #[must_use]
    pub fn receiver(&self) -> Option<&str> {
        self.transfer
            .receiver
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// Network description handed to the wallet.
    #[must_use]
    pub fn add_chain_params(&self) -> AddChainParams {
        let params = AddChainParams::new(
            self.chain_id(),
            &self.network.chain_name,
            &self.network.rpc_url,
            NativeCurrency {
                name: self.network.currency_name.clone(),
                symbol: self.network.currency_symbol.clone(),
                decimals: self.network.decimals,
            },
        );
        if self.network.explorer_url.is_empty() {
            params
        } else {
            params.with_explorer(&self.network.explorer_url)
        }
    }

    /// Retry policy shared by the faucet service and the dispatcher.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.automation.max_retries,
            Duration::from_millis(self.automation.retry_delay_ms),
        )
    }

    /// Faucet service configuration.
    #[must_use]
    pub fn faucet_config(&self) -> FaucetConfig {
        FaucetConfig {
            threshold: self.faucet.threshold,
            decimals: self.network.decimals,
            symbol: self.network.currency_symbol.clone(),
            retry: self.retry_policy(),
        }
    }

    /// Dispatcher configuration.
    #[must_use]
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            amount: self.transfer.amount,
            decimals: self.network.decimals,
            symbol: self.network.currency_symbol.clone(),
            gas: GasEstimator::new(self.transfer.gas_buffer_percent),
            retry: self.retry_policy(),
        }
    }

    /// Loop pacing.
    #[must_use]
    pub fn automation_config(&self) -> AutomationConfig {
        AutomationConfig {
            faucet_interval: Duration::from_millis(self.automation.faucet_interval_ms),
            tx_interval: Duration::from_millis(self.automation.tx_interval_ms),
        }
    }

    /// Balance refresh period.
    #[must_use]
    pub fn balance_poll_interval(&self) -> Duration {
        Duration::from_millis(self.automation.balance_poll_ms)
    }
}
