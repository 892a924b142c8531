//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default and every section may be omitted, so an empty
//! file (or no file at all, see [`Config::load_or_default`]) yields a working
//! receiver listening on UDP port 8888.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::{ReceiverError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub mapper: MapperConfig,
    #[serde(default)]
    pub cursor: CursorConfig,
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub hid: HidConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Packet listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_max_datagram_bytes")]
    pub max_datagram_bytes: usize,

    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,
}

/// Joystick-to-delta mapping configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MapperConfig {
    #[serde(default = "default_axis_center")]
    pub axis_center: i32,

    #[serde(default = "default_deadzone")]
    pub deadzone: i32,
}

/// Cursor mover configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CursorConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    #[serde(default = "default_smooth_steps")]
    pub smooth_steps: u32,
}

/// Heartbeat configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HeartbeatConfig {
    #[serde(default = "default_heartbeat_interval_ms")]
    pub interval_ms: u64,
}

/// mDNS advertisement configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DiscoveryConfig {
    #[serde(default = "default_discovery_enabled")]
    pub enabled: bool,

    #[serde(default = "default_service_name")]
    pub service_name: String,

    #[serde(default = "default_service_type")]
    pub service_type: String,

    #[serde(default = "default_domain")]
    pub domain: String,

    #[serde(default = "default_interface")]
    pub interface: String,
}

/// HID injection configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HidConfig {
    #[serde(default = "default_hid_backend")]
    pub backend: String,

    #[serde(default = "default_device_name")]
    pub device_name: String,

    #[serde(default = "default_screen_width")]
    pub screen_width: i32,

    #[serde(default = "default_screen_height")]
    pub screen_height: i32,
}

/// Shutdown coordination configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SupervisorConfig {
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for a daily rolling log file. Console only when unset.
    #[serde(default)]
    pub directory: Option<String>,
}

// Default value functions
fn default_bind_address() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8888 }
fn default_max_datagram_bytes() -> usize { 128 }
fn default_receive_timeout_ms() -> u64 { 5000 }

fn default_axis_center() -> i32 { 128 }
fn default_deadzone() -> i32 { 8 }

fn default_tick_ms() -> u64 { 10 }
fn default_smooth_steps() -> u32 { 4 }

fn default_heartbeat_interval_ms() -> u64 { 2000 }

fn default_discovery_enabled() -> bool { true }
fn default_service_name() -> String { "EventSender_Zeroconf".to_string() }
fn default_service_type() -> String { "_protobuf._udp".to_string() }
fn default_domain() -> String { "local.".to_string() }
fn default_interface() -> String { "enp8s0".to_string() }

fn default_hid_backend() -> String { "uinput".to_string() }
fn default_device_name() -> String { "nunchuk-receiver".to_string() }
fn default_screen_width() -> i32 { 1920 }
fn default_screen_height() -> i32 { 1080 }

fn default_drain_timeout_ms() -> u64 { 10_000 }

fn default_log_level() -> String { "info".to_string() }

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_datagram_bytes: default_max_datagram_bytes(),
            receive_timeout_ms: default_receive_timeout_ms(),
        }
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            axis_center: default_axis_center(),
            deadzone: default_deadzone(),
        }
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            smooth_steps: default_smooth_steps(),
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_heartbeat_interval_ms(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: default_discovery_enabled(),
            service_name: default_service_name(),
            service_type: default_service_type(),
            domain: default_domain(),
            interface: default_interface(),
        }
    }
}

impl Default for HidConfig {
    fn default() -> Self {
        Self {
            backend: default_hid_backend(),
            device_name: default_device_name(),
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
        }
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            drain_timeout_ms: default_drain_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

impl NetworkConfig {
    /// Socket address string the packet listener binds to.
    #[must_use]
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Upper bound on how long a single receive call may block.
    #[must_use]
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }
}

impl CursorConfig {
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl HeartbeatConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl SupervisorConfig {
    #[must_use]
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

fn invalid(msg: impl std::fmt::Display) -> ReceiverError {
    ReceiverError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use nunchuk_receiver::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load configuration, falling back to built-in defaults when the file
    /// does not exist. Any other read, parse or validation failure is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No configuration at {}, using defaults", path.display());
                let config = Config::default();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Network
        if self.network.port == 0 {
            return Err(invalid("port must be between 1 and 65535"));
        }

        if self.network.bind_address.is_empty() {
            return Err(invalid("bind_address cannot be empty"));
        }

        // 65507 is the largest UDP payload over IPv4
        if self.network.max_datagram_bytes == 0 || self.network.max_datagram_bytes > 65507 {
            return Err(invalid("max_datagram_bytes must be between 1 and 65507"));
        }

        if self.network.receive_timeout_ms == 0 || self.network.receive_timeout_ms > 60000 {
            return Err(invalid("receive_timeout_ms must be between 1 and 60000"));
        }

        // Mapper
        if self.mapper.axis_center < 1 || self.mapper.axis_center > 254 {
            return Err(invalid("axis_center must be between 1 and 254"));
        }

        if self.mapper.deadzone < 0 || self.mapper.deadzone > 127 {
            return Err(invalid("deadzone must be between 0 and 127"));
        }

        // Timing
        if self.cursor.tick_ms == 0 || self.cursor.tick_ms > 1000 {
            return Err(invalid("cursor tick_ms must be between 1 and 1000"));
        }

        if self.cursor.smooth_steps == 0 || self.cursor.smooth_steps > 100 {
            return Err(invalid("smooth_steps must be between 1 and 100"));
        }

        if self.heartbeat.interval_ms == 0 || self.heartbeat.interval_ms > 60000 {
            return Err(invalid("heartbeat interval_ms must be between 1 and 60000"));
        }

        if self.supervisor.drain_timeout_ms == 0 || self.supervisor.drain_timeout_ms > 600_000 {
            return Err(invalid("drain_timeout_ms must be between 1 and 600000"));
        }

        // Discovery
        if self.discovery.enabled {
            if self.discovery.service_name.is_empty() {
                return Err(invalid("service_name cannot be empty when discovery is enabled"));
            }

            if self.discovery.interface.is_empty() {
                return Err(invalid("interface cannot be empty when discovery is enabled"));
            }

            if !is_valid_service_type(&self.discovery.service_type) {
                return Err(invalid(format!(
                    "service_type '{}' must look like _name._udp or _name._tcp",
                    self.discovery.service_type
                )));
            }

            if !self.discovery.domain.ends_with('.') {
                return Err(invalid("domain must end with '.'"));
            }
        }

        // HID
        if !["uinput", "log"].contains(&self.hid.backend.as_str()) {
            return Err(invalid("hid backend must be one of: uinput, log"));
        }

        if self.hid.screen_width <= 0 || self.hid.screen_height <= 0 {
            return Err(invalid("screen_width and screen_height must be greater than 0"));
        }

        // Logging
        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}

fn is_valid_service_type(ty: &str) -> bool {
    let Some((name, proto)) = ty.rsplit_once('.') else {
        return false;
    };
    name.len() > 1 && name.starts_with('_') && (proto == "_udp" || proto == "_tcp")
}
