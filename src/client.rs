//! Typed queue operations
//!
//! [`QueueClient`] turns enqueue/dequeue/size/has into request lines, sends
//! them over a [`LineTransport`] (normally a [`Connection`]) and decodes the
//! single response line each one gets back.
//!
//! # Example
//!
//! ```ignore
//! use queued_client::{Config, QueueClient};
//!
//! let client = QueueClient::connect(&Config::default()).await?;
//! client.enqueue(b"abc").await?;
//! assert_eq!(client.size().await?, 1);
//! assert_eq!(client.dequeue().await?, Some(b"abc".to_vec()));
//! assert_eq!(client.dequeue().await?, None);
//! client.close().await;
//! ```

use async_trait::async_trait;

use crate::config::Config;
use crate::connection::Connection;
use crate::error::{ConnectionError, QueueError};
use crate::logging::*;
use crate::protocol::command::{ERROR, FALSE, ITEM, OK, SIZE, TRUE};
use crate::protocol::{Command, ProtocolError, ProtocolLine, QUEUE_EMPTY_MESSAGE};
use crate::util;

/// Request/response primitive the command layer is built on
///
/// Implementations must answer each request with the next line received and
/// must not let two requests overlap on the wire.
#[async_trait]
pub trait LineTransport: Send + Sync {
	/// Send `line` and wait for its response line
	async fn request(&self, line: &ProtocolLine) -> Result<ProtocolLine, ConnectionError>;

	/// Close the underlying connection
	async fn close(&self);
}

#[async_trait]
impl LineTransport for Connection {
	async fn request(&self, line: &ProtocolLine) -> Result<ProtocolLine, ConnectionError> {
		Connection::request(self, line).await
	}

	async fn close(&self) {
		Connection::close(self).await
	}
}

/// Client for one queued connection
pub struct QueueClient<T: LineTransport = Connection> {
	transport: T,
}

impl QueueClient<Connection> {
	/// Open a connection as described by `config`
	pub async fn connect(config: &Config) -> Result<Self, QueueError> {
		Ok(Self::new(Connection::connect(config).await?))
	}
}

impl<T: LineTransport> QueueClient<T> {
	pub fn new(transport: T) -> Self {
		Self { transport }
	}

	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Put `data` on the queue
	pub async fn enqueue(&self, data: &[u8]) -> Result<(), QueueError> {
		let command = Command::Enqueue(data.to_vec());
		let response = self.call(&command).await?;
		match response.command() {
			OK => Ok(()),
			ERROR => Err(server_error(&response)?),
			_ => Err(unexpected(&command, &response)),
		}
	}

	/// Take the oldest item off the queue.
	///
	/// An empty queue is `Ok(None)`, not an error.
	pub async fn dequeue(&self) -> Result<Option<Vec<u8>>, QueueError> {
		let command = Command::Dequeue;
		let response = self.call(&command).await?;
		match response.command() {
			ITEM => Ok(Some(response.data()?)),
			ERROR => {
				let message = error_message(&response)?;
				if message == QUEUE_EMPTY_MESSAGE {
					debug!("Dequeue found the queue empty");
					Ok(None)
				} else {
					Err(QueueError::Server { message })
				}
			}
			_ => Err(unexpected(&command, &response)),
		}
	}

	/// Number of items currently queued
	pub async fn size(&self) -> Result<usize, QueueError> {
		let command = Command::Size;
		let response = self.call(&command).await?;
		match response.command() {
			SIZE => {
				let text = response.payload().unwrap_or("").trim();
				text.parse().map_err(|_| {
					QueueError::Protocol(ProtocolError::ProtocolViolation(format!(
						"SIZE carries '{}', expected a count",
						text
					)))
				})
			}
			ERROR => Err(server_error(&response)?),
			_ => Err(unexpected(&command, &response)),
		}
	}

	/// Whether an item with the same content is queued
	pub async fn has(&self, data: &[u8]) -> Result<bool, QueueError> {
		self.has_hash(&util::hash(data)).await
	}

	/// Whether an item with the given SHA-256 digest is queued
	pub async fn has_hash(&self, hash: &[u8]) -> Result<bool, QueueError> {
		let command = Command::Has(hash.to_vec());
		let response = self.call(&command).await?;
		match response.command() {
			TRUE => Ok(true),
			FALSE => Ok(false),
			ERROR => Err(server_error(&response)?),
			_ => Err(unexpected(&command, &response)),
		}
	}

	/// Close the connection. Later calls fail with a closed connection.
	pub async fn close(&self) {
		self.transport.close().await
	}

	async fn call(&self, command: &Command) -> Result<ProtocolLine, QueueError> {
		let response = self.transport.request(&command.to_line()).await?;
		debug!("{} answered with {}", command.token(), response.command());
		Ok(response)
	}
}

/// Decoded message of an `ERROR` line
fn error_message(line: &ProtocolLine) -> Result<String, QueueError> {
	let bytes = line.data()?;
	Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn server_error(line: &ProtocolLine) -> Result<QueueError, QueueError> {
	let message = error_message(line)?;
	warn!("Server error: {}", message);
	Ok(QueueError::Server { message })
}

/// Tokens are matched case-sensitively, so a lowercase `error` reply lands
/// here rather than as a server error.
fn unexpected(command: &Command, line: &ProtocolLine) -> QueueError {
	QueueError::Protocol(ProtocolError::UnexpectedResponse {
		request: command.token().to_string(),
		response: line.command().to_string(),
	})
}


// vim: ts=4
