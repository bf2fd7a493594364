//! Client configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use in_between::table::TableConfig;
use std::time::Duration;

/// Complete client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the game API
    pub api_url: String,
    /// Base URL of the event stream
    pub events_url: String,
    /// Bearer token for the game API
    pub access_token: String,
    /// Board to join
    pub board_id: String,
    /// External signer
    pub signer: SignerConfig,
    /// Table engine tunables
    pub table: TableConfig,
}

/// What listing the open boards needs: the API and a session token
#[derive(Debug, Clone)]
pub struct LobbyConfig {
    pub api_url: String,
    pub access_token: String,
}

/// External signer configuration
#[derive(Debug, Clone)]
pub struct SignerConfig {
    /// Program that signs transactions
    pub command: String,
    /// Wallet provider handle passed to the program
    pub provider: String,
}

/// Values given on the command line, taking precedence over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub board_id: Option<String>,
    pub api_url: Option<String>,
    pub events_url: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values from CLI args
    ///
    /// # Returns
    ///
    /// * `Result<ClientConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup(
        overrides: Overrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let LobbyConfig { api_url, access_token } =
            LobbyConfig::from_lookup(overrides.api_url, &lookup)?;

        let events_url = overrides
            .events_url
            .or_else(|| lookup("EVENTS_URL"))
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| websocket_url(&api_url));

        let board_id = overrides
            .board_id
            .or_else(|| lookup("BOARD_ID"))
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "BOARD_ID".to_string(),
                hint: "Pass --board ID or set BOARD_ID".to_string(),
            })?;

        let command = lookup("SIGNER_CMD").ok_or_else(|| ConfigError::MissingRequired {
            var: "SIGNER_CMD".to_string(),
            hint: "Path to a program that reads a transaction on stdin and prints it signed"
                .to_string(),
        })?;

        let signer = SignerConfig {
            command,
            provider: lookup("SIGNER_PROVIDER").unwrap_or_else(|| "default".to_string()),
        };

        let defaults = TableConfig::default();
        let table = TableConfig {
            hands_retry_attempts: parse_or(&lookup, "HANDS_RETRY_ATTEMPTS", defaults.hands_retry_attempts),
            hands_retry_delay: Duration::from_millis(parse_or(&lookup, "HANDS_RETRY_DELAY_MS", 1000)),
            tick_interval: Duration::from_millis(parse_or(&lookup, "TICK_INTERVAL_MS", 1000)),
            ping_interval: Duration::from_millis(parse_or(&lookup, "PING_INTERVAL_MS", 15_000)),
            ..defaults
        };

        Ok(ClientConfig {
            api_url,
            events_url,
            access_token,
            board_id,
            signer,
            table,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "API_URL".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        if !self.events_url.starts_with("ws://") && !self.events_url.starts_with("wss://") {
            return Err(ConfigError::Invalid {
                var: "EVENTS_URL".to_string(),
                reason: "Must start with ws:// or wss://".to_string(),
            });
        }

        if self.access_token.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "ACCESS_TOKEN".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.board_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                var: "BOARD_ID".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        self.table.validate().map_err(|reason| ConfigError::Invalid {
            var: "TICK_INTERVAL_MS".to_string(),
            reason,
        })
    }
}

impl LobbyConfig {
    /// Load from environment variables, with `api_url` from the CLI taking
    /// precedence
    pub fn from_env(api_url: Option<String>) -> Result<Self, ConfigError> {
        Self::from_lookup(api_url, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        api_url: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_url = api_url
            .or_else(|| lookup("API_URL"))
            .unwrap_or_else(|| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let access_token = lookup("ACCESS_TOKEN").ok_or_else(|| ConfigError::MissingRequired {
            var: "ACCESS_TOKEN".to_string(),
            hint: "Copy the access token of a signed-in session".to_string(),
        })?;

        Ok(LobbyConfig { api_url, access_token })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Swap an http(s) URL to the matching websocket scheme
fn websocket_url(api_url: &str) -> String {
    api_url
        .replacen("https://", "wss://", 1)
        .replacen("http://", "ws://", 1)
}

/// Helper to parse a variable with default fallback
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
