//! End-to-end queue operations against an in-memory queued server
//!
//! Every test talks to a real TCP listener, so framing, the receiver task
//! and request/response correlation are all on the path.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{connect, spawn_queue_server};
use queued_client::util;
use queued_client::QueueError;

// ============================================================================
// Basic operations
// ============================================================================

/// Enqueue, inspect and drain a single item
#[tokio::test]
async fn test_abc_scenario() {
	let server = spawn_queue_server().await;
	let client = connect(server.addr).await;

	client.enqueue(b"abc").await.unwrap();
	assert_eq!(client.size().await.unwrap(), 1);
	assert!(client.has(b"abc").await.unwrap());
	assert_eq!(client.dequeue().await.unwrap(), Some(b"abc".to_vec()));
	assert_eq!(client.dequeue().await.unwrap(), None);
	assert_eq!(client.size().await.unwrap(), 0);

	client.close().await;
}

/// Payloads that would break the line format survive the base64 transport
#[tokio::test]
async fn test_fifo_order_with_awkward_payloads() {
	let server = spawn_queue_server().await;
	let client = connect(server.addr).await;

	let items: Vec<Vec<u8>> = vec![
		b"first".to_vec(),
		b"line one\nline two\n".to_vec(),
		vec![0, 255, 10, 13, 32, 0],
		Vec::new(),
		"ünïcödé".as_bytes().to_vec(),
	];
	for item in &items {
		client.enqueue(item).await.unwrap();
	}
	assert_eq!(client.size().await.unwrap(), items.len());

	for item in &items {
		assert_eq!(client.dequeue().await.unwrap().as_ref(), Some(item));
	}
	assert_eq!(client.dequeue().await.unwrap(), None);
	client.close().await;
}

#[tokio::test]
async fn test_has_unseen_item_is_false() {
	let server = spawn_queue_server().await;
	let client = connect(server.addr).await;

	assert!(!client.has(b"never queued").await.unwrap());
	client.enqueue(b"queued").await.unwrap();
	assert!(!client.has(b"never queued").await.unwrap());
	assert!(client.has_hash(&util::hash(b"queued")).await.unwrap());
	client.close().await;
}

/// Draining an empty queue is not an error, however often it happens
#[tokio::test]
async fn test_repeated_empty_dequeue() {
	let server = spawn_queue_server().await;
	let client = connect(server.addr).await;

	for _ in 0..5 {
		assert_eq!(client.dequeue().await.unwrap(), None);
	}
	assert!(client.transport().is_open());
	client.close().await;
}

#[tokio::test]
async fn test_wrong_length_hash_is_server_error() {
	let server = spawn_queue_server().await;
	let client = connect(server.addr).await;

	match client.has_hash(b"short").await {
		Err(QueueError::Server { message }) => {
			assert_eq!(message, "Expected a hash of size 32 got 5");
		}
		other => panic!("expected server error, got {:?}", other),
	}

	// A server error is an answer; the connection carries on
	client.enqueue(b"after").await.unwrap();
	assert_eq!(client.size().await.unwrap(), 1);
	client.close().await;
}

// ============================================================================
// Several connections and callers
// ============================================================================

#[tokio::test]
async fn test_two_connections_share_queue() {
	let server = spawn_queue_server().await;
	let producer = connect(server.addr).await;
	let consumer = connect(server.addr).await;

	producer.enqueue(b"handoff").await.unwrap();
	assert!(consumer.has(b"handoff").await.unwrap());
	assert_eq!(consumer.dequeue().await.unwrap(), Some(b"handoff".to_vec()));
	assert_eq!(producer.size().await.unwrap(), 0);

	producer.close().await;
	consumer.close().await;
	assert_eq!(server.queue.lock().await.len(), 0);
}

/// Concurrent callers each get the response to their own request
#[tokio::test]
async fn test_concurrent_callers_stay_correlated() {
	let server = spawn_queue_server().await;
	let client = Arc::new(connect(server.addr).await);

	let mut tasks = Vec::new();
	for worker in 0..8 {
		let client = client.clone();
		tasks.push(tokio::spawn(async move {
			for n in 0..25 {
				let item = format!("worker-{}-item-{}", worker, n);
				client.enqueue(item.as_bytes()).await.unwrap();
				// Would be a TRUE/FALSE mixup or an unexpected response if
				// answers were handed to the wrong caller
				assert!(client.has(item.as_bytes()).await.unwrap());
				assert!(client.size().await.unwrap() >= 1);
			}
		}));
	}

	let joined = tokio::time::timeout(Duration::from_secs(20), async {
		for task in tasks {
			task.await.unwrap();
		}
	})
	.await;
	assert!(joined.is_ok(), "concurrent callers hung");

	assert_eq!(client.size().await.unwrap(), 200);
	client.close().await;
}

// vim: ts=4
