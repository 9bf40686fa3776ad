//! Connection to a queued server
//!
//! A [`Connection`] owns one TCP socket and one background receiver task.
//! Requests are correlated with responses purely by order: the send mutex is
//! held from writing a request until its response line has been taken from
//! the line channel, so at most one request is ever outstanding.
//!
//! Closing is a two-sided protocol. The application (`close()` or drop) and
//! the receiver task (peer closed, read failed) race to tear down; the
//! [`StateCell`] transition picks one winner, which closes the line channel,
//! stops the receiver and shuts the socket down. The loser does nothing.

pub mod channel;
pub mod receiver;
pub mod state;

use std::net::{Shutdown, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::ConnectionError;
use crate::logging::*;
use crate::protocol::ProtocolLine;

pub use channel::LineChannel;
pub use state::{CloseInitiator, ConnectionState, StateCell};

use receiver::ReceiverLoop;

/// Result type for connection operations
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Tunables for an established connection
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
	pub read_timeout: Duration,
	pub read_chunk_size: usize,
	pub max_line_length: usize,
	pub nodelay: bool,
}

impl From<&Config> for ConnectionOptions {
	fn from(config: &Config) -> Self {
		ConnectionOptions {
			read_timeout: config.read_timeout(),
			read_chunk_size: config.read_chunk_size,
			max_line_length: config.max_line_length,
			nodelay: config.nodelay,
		}
	}
}

impl Default for ConnectionOptions {
	fn default() -> Self {
		Self::from(&Config::default())
	}
}

/// State shared between the connection handle and its receiver task
pub(crate) struct Shared {
	pub(crate) peer: SocketAddr,
	pub(crate) state: StateCell,
	pub(crate) channel: LineChannel,
	/// Duplicate of the socket used only to shut it down; taken on teardown
	socket: Mutex<Option<std::net::TcpStream>>,
	shutdown: watch::Sender<bool>,
	#[cfg(test)]
	teardowns: std::sync::atomic::AtomicUsize,
}

impl Shared {
	/// Run the close protocol. Returns `true` if this call did the teardown.
	pub(crate) fn teardown(&self, initiator: CloseInitiator) -> bool {
		if !self.state.begin_close() {
			debug!("Close by {} for {}: already {}", initiator, self.peer, self.state.get());
			return false;
		}
		self.state.finish_close();
		#[cfg(test)]
		self.teardowns.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

		self.channel.close();
		let _ = self.shutdown.send(true);

		let socket = self.socket.lock().unwrap_or_else(|e| e.into_inner()).take();
		if let Some(socket) = socket {
			if let Err(e) = socket.shutdown(Shutdown::Both) {
				// Peer may have reset the socket already
				debug!("Socket shutdown for {}: {}", self.peer, e);
			}
		}

		info!("Connection to {} closed by {}", self.peer, initiator);
		true
	}
}

/// One connection to a queued server
pub struct Connection {
	shared: Arc<Shared>,
	/// Send mutex; held for the whole request/response exchange
	writer: tokio::sync::Mutex<OwnedWriteHalf>,
	/// Held while joining so concurrent closers all wait for the task
	receiver: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for Connection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Connection")
			.field("peer", &self.shared.peer)
			.field("state", &self.shared.state.get())
			.finish()
	}
}

impl Connection {
	/// Connect using the address and tunables from `config`
	pub async fn connect(config: &Config) -> ConnectionResult<Self> {
		let options = ConnectionOptions::from(config);
		Self::connect_to(&config.address(), config.connect_timeout(), options).await
	}

	/// Connect to `addr` (`host:port`)
	pub async fn connect_to(
		addr: &str,
		connect_timeout: Duration,
		options: ConnectionOptions,
	) -> ConnectionResult<Self> {
		debug!("Connecting to {}", addr);
		let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(addr))
			.await
			.map_err(|_| ConnectionError::ConnectTimeout { addr: addr.to_string() })?
			.map_err(|source| ConnectionError::Connect { addr: addr.to_string(), source })?;
		Self::from_stream(stream, options)
	}

	/// Take over an established stream and start the receiver task.
	///
	/// Must be called from within a tokio runtime.
	pub fn from_stream(stream: TcpStream, options: ConnectionOptions) -> ConnectionResult<Self> {
		stream.set_nodelay(options.nodelay)?;
		let peer = stream.peer_addr()?;

		let std_stream = stream.into_std()?;
		let shutdown_handle = std_stream.try_clone()?;
		let stream = TcpStream::from_std(std_stream)?;
		let (reader, writer) = stream.into_split();

		let (shutdown_tx, shutdown_rx) = watch::channel(false);
		let shared = Arc::new(Shared {
			peer,
			state: StateCell::new(),
			channel: LineChannel::new(),
			socket: Mutex::new(Some(shutdown_handle)),
			shutdown: shutdown_tx,
			#[cfg(test)]
			teardowns: std::sync::atomic::AtomicUsize::new(0),
		});

		let receiver = ReceiverLoop::new(
			reader,
			shared.clone(),
			shutdown_rx,
			options.read_timeout,
			options.read_chunk_size,
			options.max_line_length,
		);
		let handle = tokio::spawn(receiver.run());

		info!("Connected to {}", peer);
		Ok(Self {
			shared,
			writer: tokio::sync::Mutex::new(writer),
			receiver: tokio::sync::Mutex::new(Some(handle)),
		})
	}

	pub fn peer_addr(&self) -> SocketAddr {
		self.shared.peer
	}

	pub fn state(&self) -> ConnectionState {
		self.shared.state.get()
	}

	pub fn is_open(&self) -> bool {
		self.shared.state.is_open()
	}

	/// Send one request line and wait for the line that answers it.
	///
	/// Callers are serialized; the response is whatever line arrives next.
	/// Fails with `ConnectionError::Closed` if the connection is closed
	/// before or while waiting. A failed write closes the connection, and
	/// so does dropping the returned future before the response arrives.
	pub async fn request(&self, line: &ProtocolLine) -> ConnectionResult<ProtocolLine> {
		let mut writer = self.writer.lock().await;
		if !self.shared.state.is_open() {
			return Err(ConnectionError::Closed);
		}

		// From the first byte written until the answer is popped, a dropped
		// future would leave request and response streams out of step
		let mut exchange = Exchange::begin(&self.shared);

		trace!("-> {}", line);
		let wire = line.to_wire();
		let written = match writer.write_all(wire.as_bytes()).await {
			Ok(()) => writer.flush().await,
			Err(e) => Err(e),
		};
		if let Err(e) = written {
			exchange.finish();
			if !self.shared.teardown(CloseInitiator::Application) {
				// Lost the race to a close; that is what broke the write
				return Err(ConnectionError::Closed);
			}
			warn!("Write to {} failed: {}", self.shared.peer, e);
			return Err(ConnectionError::Io(e));
		}

		let response = self.shared.channel.pop().await;
		exchange.finish();
		response
	}

	/// Close the connection and wait for the receiver task to stop.
	///
	/// Safe to call any number of times and concurrently with the server
	/// closing its end; only the first close tears the socket down.
	pub async fn close(&self) {
		self.shared.teardown(CloseInitiator::Application);

		let mut receiver = self.receiver.lock().await;
		if let Some(handle) = receiver.take() {
			if let Err(e) = handle.await {
				error!("Receiver task for {} failed: {}", self.shared.peer, e);
			}
		}
	}
}

/// One request/response exchange in flight.
///
/// Dropped before `finish()` means the caller gave up mid-exchange (timeout,
/// `select!`); the answer would be handed to the next caller, so the
/// connection is closed instead.
struct Exchange<'a> {
	shared: &'a Shared,
	pending: bool,
}

impl<'a> Exchange<'a> {
	fn begin(shared: &'a Shared) -> Self {
		Self { shared, pending: true }
	}

	fn finish(&mut self) {
		self.pending = false;
	}
}

impl Drop for Exchange<'_> {
	fn drop(&mut self) {
		if self.pending {
			warn!("Request to {} abandoned before its response arrived", self.shared.peer);
			self.shared.teardown(CloseInitiator::Application);
		}
	}
}

impl Drop for Connection {
	fn drop(&mut self) {
		// Cannot wait here; the receiver exits on its own once signalled
		self.shared.teardown(CloseInitiator::Application);
	}
}


// vim: ts=4
