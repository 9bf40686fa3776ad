//! Line hand-off between the receiver task and request callers
//!
//! An unbounded FIFO with a closed state. The receiving half sits behind a
//! fair async mutex so blocked readers are served in arrival order, and
//! closing drops the only sender so every blocked or future reader is
//! released once the buffered lines are drained.

use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::error::ConnectionError;
use crate::protocol::ProtocolLine;

pub struct LineChannel {
	sender: Mutex<Option<mpsc::UnboundedSender<ProtocolLine>>>,
	receiver: tokio::sync::Mutex<mpsc::UnboundedReceiver<ProtocolLine>>,
}

impl LineChannel {
	pub fn new() -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self { sender: Mutex::new(Some(tx)), receiver: tokio::sync::Mutex::new(rx) }
	}

	/// Append a line. Returns `false` if the channel is already closed.
	pub fn push(&self, line: ProtocolLine) -> bool {
		let sender = self.sender.lock().unwrap_or_else(|e| e.into_inner());
		match sender.as_ref() {
			Some(tx) => tx.send(line).is_ok(),
			None => false,
		}
	}

	/// Wait for the next line.
	///
	/// Lines pushed before `close()` are still delivered; after that every
	/// call fails with `ConnectionError::Closed`.
	pub async fn pop(&self) -> Result<ProtocolLine, ConnectionError> {
		let mut receiver = self.receiver.lock().await;
		receiver.recv().await.ok_or(ConnectionError::Closed)
	}

	/// Close the channel. Returns `true` only for the call that closed it.
	pub fn close(&self) -> bool {
		self.sender.lock().unwrap_or_else(|e| e.into_inner()).take().is_some()
	}

	pub fn is_closed(&self) -> bool {
		self.sender.lock().unwrap_or_else(|e| e.into_inner()).is_none()
	}
}

impl Default for LineChannel {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
