//! Test servers speaking the queued protocol
//!
//! `spawn_queue_server` is an in-memory queued server that answers the way
//! the real daemon does. `spawn_scripted` hands every received line to a
//! closure that decides the reply, for driving the client into edge cases.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use queued_client::protocol::{decode_payload, encode_payload, QUEUE_EMPTY_MESSAGE};
use queued_client::util::{self, HASH_SIZE};
use queued_client::{Config, QueueClient};

// ============================================================================
// Helper Functions
// ============================================================================

/// Client config pointing at `addr` with a short receiver wake interval
pub fn test_config(addr: SocketAddr) -> Config {
	Config {
		host: addr.ip().to_string(),
		port: addr.port(),
		connect_timeout_ms: 2_000,
		read_timeout_ms: 50,
		..Config::default()
	}
}

pub async fn connect(addr: SocketAddr) -> QueueClient {
	QueueClient::connect(&test_config(addr)).await.expect("connect to test server")
}

/// Wait until `check` holds, polling every few milliseconds
pub async fn eventually<F: Fn() -> bool>(check: F, within: Duration) -> bool {
	let deadline = tokio::time::Instant::now() + within;
	while tokio::time::Instant::now() < deadline {
		if check() {
			return true;
		}
		tokio::time::sleep(Duration::from_millis(5)).await;
	}
	check()
}

/// Accept connections forever, running `handler` on each
pub async fn spawn_server<F, Fut>(handler: F) -> SocketAddr
where
	F: Fn(TcpStream) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = ()> + Send + 'static,
{
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test server");
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		while let Ok((stream, _)) = listener.accept().await {
			tokio::spawn(handler(stream));
		}
	});
	addr
}

// ============================================================================
// In-memory queued server
// ============================================================================

/// FIFO with a content index, duplicates allowed
#[derive(Default)]
pub struct MemQueue {
	items: VecDeque<Vec<u8>>,
	index: HashMap<[u8; HASH_SIZE], usize>,
}

impl MemQueue {
	pub fn enque(&mut self, data: Vec<u8>) {
		*self.index.entry(util::hash(&data)).or_insert(0) += 1;
		self.items.push_back(data);
	}

	pub fn deque(&mut self) -> Option<Vec<u8>> {
		let data = self.items.pop_front()?;
		let key = util::hash(&data);
		if let Some(count) = self.index.get_mut(&key) {
			*count -= 1;
			if *count == 0 {
				self.index.remove(&key);
			}
		}
		Some(data)
	}

	pub fn has(&self, hash: &[u8]) -> bool {
		self.index.keys().any(|k| &k[..] == hash)
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}
}

pub struct QueueServer {
	pub addr: SocketAddr,
	pub queue: Arc<Mutex<MemQueue>>,
}

/// Start an in-memory queued server shared by all its connections
pub async fn spawn_queue_server() -> QueueServer {
	let queue = Arc::new(Mutex::new(MemQueue::default()));
	let shared = queue.clone();
	let addr = spawn_server(move |stream| serve_queue(stream, shared.clone())).await;
	QueueServer { addr, queue }
}

async fn serve_queue(stream: TcpStream, queue: Arc<Mutex<MemQueue>>) {
	let (reader, mut writer) = stream.into_split();
	let mut lines = BufReader::new(reader).lines();
	while let Ok(Some(line)) = lines.next_line().await {
		let reply = {
			let mut queue = queue.lock().await;
			respond(&line, &mut queue)
		};
		if writer.write_all(reply.as_bytes()).await.is_err() {
			return;
		}
	}
}

fn error_line(message: &str) -> String {
	format!("ERROR {}\n", encode_payload(message.as_bytes()))
}

fn respond(line: &str, queue: &mut MemQueue) -> String {
	let mut parts = line.splitn(2, ' ');
	let command = parts.next().unwrap_or("").trim();
	let rest = parts.next();

	match command {
		"ENQUE" | "HAS" => {
			let data = match rest.map(decode_payload) {
				Some(Ok(data)) => data,
				_ => return error_line(&format!("bad line '{}'", rest.unwrap_or("").trim())),
			};
			if command == "ENQUE" {
				queue.enque(data);
				"OK\n".to_string()
			} else if data.len() != HASH_SIZE {
				error_line(&format!("Expected a hash of size {} got {}", HASH_SIZE, data.len()))
			} else if queue.has(&data) {
				"TRUE\n".to_string()
			} else {
				"FALSE\n".to_string()
			}
		}
		"DEQUE" => {
			if rest.is_some() {
				return error_line("recieved msg data when none was expected");
			}
			match queue.deque() {
				Some(data) => format!("ITEM {}\n", encode_payload(&data)),
				None => error_line(QUEUE_EMPTY_MESSAGE),
			}
		}
		"SIZE" => format!("SIZE {}\n", queue.len()),
		other => error_line(&format!("bad command recieved, '{}'", other)),
	}
}

// ============================================================================
// Scripted server
// ============================================================================

/// What a scripted server does with one received line
pub enum Reply {
	/// Send this line (delimiter added)
	Line(String),
	/// Send these bytes as is
	Raw(Vec<u8>),
	/// Send this line (delimiter added) one byte per write
	Trickle(String),
	/// Wait, then send this line (delimiter added)
	Delayed(Duration, String),
	/// Send nothing
	Ignore,
	/// Close the connection
	Close,
}

pub async fn spawn_scripted<F>(responder: F) -> SocketAddr
where
	F: Fn(&str) -> Reply + Send + Sync + 'static,
{
	let responder = Arc::new(responder);
	spawn_server(move |stream| serve_scripted(stream, responder.clone())).await
}

async fn serve_scripted<F>(stream: TcpStream, responder: Arc<F>)
where
	F: Fn(&str) -> Reply + Send + Sync + 'static,
{
	let (reader, mut writer) = stream.into_split();
	let mut lines = BufReader::new(reader).lines();
	while let Ok(Some(line)) = lines.next_line().await {
		let reply = (*responder)(&line);
		let result = match reply {
			Reply::Line(text) => writer.write_all(format!("{}\n", text).as_bytes()).await,
			Reply::Raw(bytes) => writer.write_all(&bytes).await,
			Reply::Trickle(text) => {
				let mut result = Ok(());
				for byte in format!("{}\n", text).bytes() {
					result = writer.write_all(&[byte]).await;
					if result.is_err() {
						break;
					}
					tokio::task::yield_now().await;
				}
				result
			}
			Reply::Delayed(delay, text) => {
				tokio::time::sleep(delay).await;
				writer.write_all(format!("{}\n", text).as_bytes()).await
			}
			Reply::Ignore => Ok(()),
			Reply::Close => return,
		};
		if result.is_err() {
			return;
		}
	}
}

// vim: ts=4
