//! Wire protocol of the queued service
//!
//! Line-oriented commands with base64 payloads. This module has no I/O: the
//! [`Framer`] turns bytes into lines, [`ProtocolLine`] splits and encodes them
//! and [`Command`] maps queue operations onto request lines.
//!
//! # Example Usage
//!
//! ```ignore
//! use queued_client::protocol::{Command, ProtocolLine};
//!
//! let wire = Command::Enqueue(b"abc".to_vec()).to_line().to_wire();
//! assert_eq!(wire, "ENQUE YWJj\n");
//! let reply = ProtocolLine::parse(b"ITEM YWJj");
//! assert_eq!(reply.data()?, b"abc");
//! ```

pub mod command;
pub mod error;
pub mod framer;
pub mod line;

pub use command::{Command, QUEUE_EMPTY_MESSAGE};
pub use error::ProtocolError;
pub use framer::Framer;
pub use line::{decode_payload, encode_payload, ProtocolLine};

// vim: ts=4
