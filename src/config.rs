//! Configuration management for the RAX chat server
//!
//! Settings are layered: built-in defaults, an optional `config.toml`,
//! `RAX_CHAT_*` environment variables, and finally the port given on the
//! command line.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

use crate::protocol::NameRules;

/// Default location of the optional configuration file (extension inferred).
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Complete server configuration, fixed for the lifetime of the process.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    /// IP address the listener binds to. Loopback by default.
    pub bind_address: String,

    /// TCP port of the listener. Always supplied on the command line.
    pub port: u16,

    /// Maximum number of concurrently registered clients
    /// Environment: RAX_CHAT_MAX_CLIENTS
    pub max_clients: usize,

    /// Size of a single receive in the active phase, in bytes
    pub message_buffer_size: usize,

    /// Display name bounds, in bytes
    pub min_name_length: usize,
    pub max_name_length: usize,

    /// Pending connection queue handed to listen(2)
    pub listen_backlog: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            max_clients: 100,
            message_buffer_size: 2048,
            min_name_length: 2,
            max_name_length: 31,
            listen_backlog: 5,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `config.toml` (if present) and the environment,
    /// then apply the command-line port.
    pub fn load(port: u16) -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH, port)
    }

    /// Same as [`ServerConfig::load`] with an explicit configuration file path.
    pub fn load_from(config_path: &str, port: u16) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("bind_address", defaults.bind_address.clone())?
            .set_default("max_clients", defaults.max_clients as i64)?
            .set_default("message_buffer_size", defaults.message_buffer_size as i64)?
            .set_default("min_name_length", defaults.min_name_length as i64)?
            .set_default("max_name_length", defaults.max_name_length as i64)?
            .set_default("listen_backlog", defaults.listen_backlog as i64)?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("RAX_CHAT"))
            .set_override("port", port as i64)?
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.bind_address.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Message(format!(
                "bind_address is not an IP address: {}",
                self.bind_address
            )));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.message_buffer_size == 0 {
            return Err(ConfigError::Message(
                "message_buffer_size must be greater than 0".into(),
            ));
        }

        if self.min_name_length == 0 || self.min_name_length > self.max_name_length {
            return Err(ConfigError::Message(
                "name length bounds must satisfy 1 <= min_name_length <= max_name_length".into(),
            ));
        }

        if self.listen_backlog == 0 {
            return Err(ConfigError::Message(
                "listen_backlog must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_address
            .parse()
            .map_err(|_| ConfigError::Message(format!("invalid bind_address: {}", self.bind_address)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Display name bounds enforced during the handshake
    pub fn name_rules(&self) -> NameRules {
        NameRules::new(self.min_name_length, self.max_name_length)
    }
}
