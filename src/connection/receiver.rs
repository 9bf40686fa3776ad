//! Background receiver task
//!
//! Reads the socket for the whole life of the connection, frames the byte
//! stream into lines and pushes them into the line channel. The loop wakes at
//! least every read timeout so it never blocks forever on a dead socket, and
//! it exits promptly when the application closes the connection.
//!
//! When the peer closes, a read fails, or the peer sends an oversized line,
//! the loop runs the receiver half of the close protocol and stops. It never
//! reports errors to callers directly; they see the closed channel instead.

use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::watch;
use tokio::time::{self, error::Elapsed};

use super::state::CloseInitiator;
use super::Shared;
use crate::logging::*;
use crate::protocol::{Framer, ProtocolError, ProtocolLine};

/// Why the loop stopped
#[derive(Debug)]
enum Exit {
	/// Application asked us to stop
	Shutdown,
	/// Zero-byte read
	RemoteClosed,
	/// Non-recoverable read error
	ReadFailed(io::Error),
	/// Framing failed, stream can no longer be trusted
	Framing(ProtocolError),
}

enum Event {
	Shutdown,
	Read(Result<io::Result<usize>, Elapsed>),
}

pub(crate) struct ReceiverLoop {
	reader: OwnedReadHalf,
	framer: Framer,
	shared: Arc<Shared>,
	shutdown: watch::Receiver<bool>,
	read_timeout: Duration,
	chunk_size: usize,
}

impl ReceiverLoop {
	pub(crate) fn new(
		reader: OwnedReadHalf,
		shared: Arc<Shared>,
		shutdown: watch::Receiver<bool>,
		read_timeout: Duration,
		chunk_size: usize,
		max_line_length: usize,
	) -> Self {
		Self {
			reader,
			framer: Framer::new(max_line_length),
			shared,
			shutdown,
			read_timeout,
			chunk_size,
		}
	}

	pub(crate) async fn run(mut self) {
		let exit = self.read_until_exit().await;

		let dropped = self.framer.discard();
		if dropped > 0 {
			debug!("Discarding {} bytes of unterminated data from {}", dropped, self.shared.peer);
		}

		match exit {
			Exit::Shutdown => {
				debug!("Receiver for {} stopped on shutdown", self.shared.peer);
				return;
			}
			Exit::RemoteClosed => info!("Server {} closed the connection", self.shared.peer),
			Exit::ReadFailed(e) => warn!("Read from {} failed: {}", self.shared.peer, e),
			Exit::Framing(e) => warn!("Dropping connection to {}: {}", self.shared.peer, e),
		}
		self.shared.teardown(CloseInitiator::Receiver);
	}

	async fn read_until_exit(&mut self) -> Exit {
		let mut buf = vec![0u8; self.chunk_size];

		loop {
			if *self.shutdown.borrow() {
				return Exit::Shutdown;
			}

			let event = tokio::select! {
				_ = self.shutdown.changed() => Event::Shutdown,
				result = time::timeout(self.read_timeout, self.reader.read(&mut buf)) => Event::Read(result),
			};

			let n = match event {
				Event::Shutdown => return Exit::Shutdown,
				// Periodic wake; loop back and re-check for shutdown
				Event::Read(Err(_elapsed)) => {
					if !self.shared.state.is_open() {
						return Exit::Shutdown;
					}
					continue;
				}
				Event::Read(Ok(Ok(0))) => return Exit::RemoteClosed,
				Event::Read(Ok(Ok(n))) => n,
				Event::Read(Ok(Err(e))) if is_transient(&e) => {
					trace!("Transient read error from {}: {}", self.shared.peer, e);
					continue;
				}
				Event::Read(Ok(Err(e))) => return Exit::ReadFailed(e),
			};

			let lines = match self.framer.feed(&buf[..n]) {
				Ok(lines) => lines,
				Err(e) => return Exit::Framing(e),
			};
			for raw in lines {
				let line = ProtocolLine::parse(&raw);
				trace!("<- {}", line);
				if !self.shared.channel.push(line) {
					// Closed under us; nobody is left to read
					return Exit::Shutdown;
				}
			}
		}
	}
}

fn is_transient(e: &io::Error) -> bool {
	matches!(
		e.kind(),
		io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
	)
}


// vim: ts=4
