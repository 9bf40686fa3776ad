//! # queued-client - Client driver for the queued TCP queue service
//!
//! queued exposes a FIFO queue over a line-oriented TCP protocol. This crate
//! manages one connection to it: a background task frames incoming lines,
//! callers issue one request at a time and get back the line that answers it,
//! and either side may close the connection safely.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use queued_client::{Config, QueueClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = QueueClient::connect(&Config::default()).await?;
//!     client.enqueue(b"hello").await?;
//!     if let Some(item) = client.dequeue().await? {
//!         println!("{}", String::from_utf8_lossy(&item));
//!     }
//!     client.close().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod util;

// Re-export commonly used types and functions
pub use client::{LineTransport, QueueClient};
pub use config::Config;
pub use connection::{Connection, ConnectionOptions, ConnectionState};
pub use error::{ConfigError, ConnectionError, QueueError};
pub use protocol::{ProtocolError, ProtocolLine};

// vim: ts=4
