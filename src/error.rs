//! Error types for queued client operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::protocol::ProtocolError;

/// Connection-level errors
#[derive(Debug)]
pub enum ConnectionError {
	/// TCP connect failed
	Connect { addr: String, source: io::Error },

	/// TCP connect did not finish in time
	ConnectTimeout { addr: String },

	/// Connection was closed, locally or by the peer
	Closed,

	/// I/O error on an open connection
	Io(io::Error),
}

impl fmt::Display for ConnectionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConnectionError::Connect { addr, source } => {
				write!(f, "Failed to connect to {}: {}", addr, source)
			}
			ConnectionError::ConnectTimeout { addr } => {
				write!(f, "Timed out connecting to {}", addr)
			}
			ConnectionError::Closed => write!(f, "Connection closed"),
			ConnectionError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for ConnectionError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			ConnectionError::Connect { source, .. } => Some(source),
			ConnectionError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for ConnectionError {
	fn from(e: io::Error) -> Self {
		ConnectionError::Io(e)
	}
}

/// Main error type for queue operations
#[derive(Debug)]
pub enum QueueError {
	/// Connection failed or was closed
	Connection(ConnectionError),

	/// Response could not be decoded
	Protocol(ProtocolError),

	/// Server answered with `ERROR <message>`
	Server { message: String },
}

impl QueueError {
	/// True when the operation failed because the connection is closed
	pub fn is_connection_closed(&self) -> bool {
		matches!(self, QueueError::Connection(ConnectionError::Closed))
	}
}

impl fmt::Display for QueueError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			QueueError::Connection(e) => write!(f, "Connection error: {}", e),
			QueueError::Protocol(e) => write!(f, "Protocol error: {}", e),
			QueueError::Server { message } => write!(f, "Server error: {}", message),
		}
	}
}

impl Error for QueueError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			QueueError::Connection(e) => Some(e),
			QueueError::Protocol(e) => Some(e),
			QueueError::Server { .. } => None,
		}
	}
}

impl From<ConnectionError> for QueueError {
	fn from(e: ConnectionError) -> Self {
		QueueError::Connection(e)
	}
}

impl From<ProtocolError> for QueueError {
	fn from(e: ProtocolError) -> Self {
		QueueError::Protocol(e)
	}
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
	/// Config file could not be read
	Io { path: PathBuf, source: io::Error },

	/// Config file is not valid TOML for [`crate::config::Config`]
	Parse { message: String },

	/// A value is out of range
	Invalid { message: String },
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::Io { path, source } => {
				write!(f, "Failed to read config {}: {}", path.display(), source)
			}
			ConfigError::Parse { message } => write!(f, "Invalid config file: {}", message),
			ConfigError::Invalid { message } => write!(f, "Invalid configuration: {}", message),
		}
	}
}

impl Error for ConfigError {}

impl From<toml::de::Error> for ConfigError {
	fn from(e: toml::de::Error) -> Self {
		ConfigError::Parse { message: e.to_string() }
	}
}


// vim: ts=4
