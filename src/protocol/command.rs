//! Queue commands and response tokens

use super::line::ProtocolLine;

/// Request tokens
pub const ENQUE: &str = "ENQUE";
pub const DEQUE: &str = "DEQUE";
pub const SIZE: &str = "SIZE";
pub const HAS: &str = "HAS";

/// Response tokens
pub const OK: &str = "OK";
pub const ITEM: &str = "ITEM";
pub const TRUE: &str = "TRUE";
pub const FALSE: &str = "FALSE";
pub const ERROR: &str = "ERROR";

/// Error message the server uses for a dequeue on an empty queue.
/// Matched verbatim; the protocol defines no error codes.
pub const QUEUE_EMPTY_MESSAGE: &str = "queue is empty";

/// A request the client can issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// Append data to the queue
	Enqueue(Vec<u8>),
	/// Take the oldest item
	Dequeue,
	/// Number of queued items
	Size,
	/// Membership test by digest
	Has(Vec<u8>),
}

impl Command {
	/// Wire token for this command
	pub fn token(&self) -> &'static str {
		match self {
			Command::Enqueue(_) => ENQUE,
			Command::Dequeue => DEQUE,
			Command::Size => SIZE,
			Command::Has(_) => HAS,
		}
	}

	pub fn to_line(&self) -> ProtocolLine {
		match self {
			Command::Enqueue(data) => ProtocolLine::with_data(ENQUE, data),
			Command::Dequeue => ProtocolLine::new(DEQUE),
			Command::Size => ProtocolLine::new(SIZE),
			Command::Has(hash) => ProtocolLine::with_data(HAS, hash),
		}
	}
}


// vim: ts=4
