//! Client configuration
//!
//! The configuration follows a priority chain:
//! 1. Built-in defaults (Config::default())
//! 2. Config file (~/.config/queued/client.toml, or --config)
//! 3. Environment variables (QUEUED_* prefix)
//! 4. CLI flags (highest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "QUEUED_";

/// Configuration for a single queued connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
	// ========================================================================
	// SERVER
	// ========================================================================
	/// Server host name or address
	pub host: String,

	/// Server TCP port
	pub port: u16,

	// ========================================================================
	// CONNECTION
	// ========================================================================
	/// Give up connecting after this many milliseconds
	pub connect_timeout_ms: u64,

	/// Receiver wakes at least this often to check for shutdown
	pub read_timeout_ms: u64,

	/// Maximum bytes taken from the socket per read
	pub read_chunk_size: usize,

	/// Longest accepted response line; longer lines close the connection
	pub max_line_length: usize,

	/// Disable Nagle's algorithm
	pub nodelay: bool,

	// ========================================================================
	// OUTPUT & LOGGING
	// ========================================================================
	/// Log level used when RUST_LOG is not set
	pub log_level: String,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			host: "localhost".to_string(),
			port: 9001,
			connect_timeout_ms: 10_000,
			read_timeout_ms: 500,
			read_chunk_size: 16 * 1024,
			max_line_length: 16 * 1024 * 1024,
			nodelay: true,
			log_level: "info".to_string(),
		}
	}
}

impl Config {
	/// `host:port` string suitable for connecting
	pub fn address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}

	pub fn connect_timeout(&self) -> Duration {
		Duration::from_millis(self.connect_timeout_ms)
	}

	pub fn read_timeout(&self) -> Duration {
		Duration::from_millis(self.read_timeout_ms)
	}

	/// Default config file location (~/.config/queued/client.toml)
	pub fn default_path() -> Option<PathBuf> {
		std::env::var("HOME")
			.ok()
			.map(|home| PathBuf::from(home).join(".config").join("queued").join("client.toml"))
	}

	/// Parse a TOML document; missing keys keep their defaults
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	/// Read and parse a TOML config file
	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path)
			.map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
		Self::from_toml_str(&text)
	}

	/// Defaults, then the given file (or the default one if it exists), then
	/// the process environment
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let mut config = match path {
			Some(path) => Self::from_file(path)?,
			None => match Self::default_path() {
				Some(default) if default.is_file() => Self::from_file(&default)?,
				_ => Self::default(),
			},
		};
		config.apply_env(std::env::vars())?;
		Ok(config)
	}

	/// Apply `QUEUED_*` overrides from the given variables.
	///
	/// Recognized: `QUEUED_HOST`, `QUEUED_PORT`, `QUEUED_CONNECT_TIMEOUT_MS`,
	/// `QUEUED_READ_TIMEOUT_MS`, `QUEUED_READ_CHUNK_SIZE`,
	/// `QUEUED_MAX_LINE_LENGTH`, `QUEUED_NODELAY`, `QUEUED_LOG_LEVEL`.
	/// Unknown names are ignored.
	pub fn apply_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		for (key, value) in vars {
			let name = match key.strip_prefix(ENV_PREFIX) {
				Some(name) => name,
				None => continue,
			};
			match name {
				"HOST" => self.host = value,
				"PORT" => self.port = parse_env(&key, &value)?,
				"CONNECT_TIMEOUT_MS" => self.connect_timeout_ms = parse_env(&key, &value)?,
				"READ_TIMEOUT_MS" => self.read_timeout_ms = parse_env(&key, &value)?,
				"READ_CHUNK_SIZE" => self.read_chunk_size = parse_env(&key, &value)?,
				"MAX_LINE_LENGTH" => self.max_line_length = parse_env(&key, &value)?,
				"NODELAY" => self.nodelay = parse_env(&key, &value)?,
				"LOG_LEVEL" => self.log_level = value,
				_ => {}
			}
		}
		Ok(())
	}

	/// Check that every value is usable
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.host.trim().is_empty() {
			return Err(invalid("host must not be empty".to_string()));
		}
		if self.port == 0 {
			return Err(invalid("port must be greater than 0".to_string()));
		}
		if self.connect_timeout_ms == 0 {
			return Err(invalid("connectTimeoutMs must be greater than 0".to_string()));
		}
		if self.read_timeout_ms == 0 {
			return Err(invalid("readTimeoutMs must be greater than 0".to_string()));
		}
		if self.read_chunk_size == 0 {
			return Err(invalid("readChunkSize must be greater than 0".to_string()));
		}
		if self.max_line_length < self.read_chunk_size {
			return Err(invalid(format!(
				"maxLineLength ({}) must be at least readChunkSize ({})",
				self.max_line_length, self.read_chunk_size
			)));
		}
		Ok(())
	}
}

fn invalid(message: String) -> ConfigError {
	ConfigError::Invalid { message }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
	value.trim().parse().map_err(|_| invalid(format!("{}: cannot parse '{}'", key, value)))
}


// vim: ts=4
