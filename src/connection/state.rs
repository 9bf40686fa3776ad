//! Connection lifecycle state machine
//!
//! `Open -> Closing -> Closed` is the only path. Both the application and the
//! receiver task may try to close; [`StateCell::begin_close`] is the single
//! compare-and-transition that picks exactly one of them.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
	Open,
	Closing,
	Closed,
}

impl ConnectionState {
	fn from_u8(value: u8) -> Self {
		match value {
			OPEN => ConnectionState::Open,
			CLOSING => ConnectionState::Closing,
			_ => ConnectionState::Closed,
		}
	}
}

impl fmt::Display for ConnectionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConnectionState::Open => write!(f, "open"),
			ConnectionState::Closing => write!(f, "closing"),
			ConnectionState::Closed => write!(f, "closed"),
		}
	}
}

/// Who started the close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseInitiator {
	/// `close()` or drop
	Application,
	/// Receiver task, after remote close or a fatal read error
	Receiver,
}

impl fmt::Display for CloseInitiator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CloseInitiator::Application => write!(f, "application"),
			CloseInitiator::Receiver => write!(f, "receiver"),
		}
	}
}

const OPEN: u8 = 0;
const CLOSING: u8 = 1;
const CLOSED: u8 = 2;

/// Atomic holder for [`ConnectionState`]
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
	pub fn new() -> Self {
		Self(AtomicU8::new(OPEN))
	}

	pub fn get(&self) -> ConnectionState {
		ConnectionState::from_u8(self.0.load(Ordering::Acquire))
	}

	pub fn is_open(&self) -> bool {
		self.get() == ConnectionState::Open
	}

	/// Move `Open -> Closing`. Only one caller ever gets `true`.
	pub fn begin_close(&self) -> bool {
		self.0.compare_exchange(OPEN, CLOSING, Ordering::AcqRel, Ordering::Acquire).is_ok()
	}

	/// Publish `Closed`. Only meaningful for the winner of `begin_close`.
	pub fn finish_close(&self) {
		self.0.store(CLOSED, Ordering::Release);
	}
}

impl Default for StateCell {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
