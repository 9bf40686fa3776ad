//! Protocol error types
//!
//! Everything that can go wrong while turning wire bytes into typed
//! responses. Transport encoding failures are kept apart from protocol
//! violations so callers can tell a corrupt payload from a confused peer.

use std::fmt;

/// Protocol error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
	/// Payload was not valid base64
	Base64(String),
	/// Line did not have the expected shape (missing payload, bad number, ...)
	ProtocolViolation(String),
	/// Response token is not one the current request can produce
	UnexpectedResponse { request: String, response: String },
	/// Peer sent a line longer than the configured cap
	LineTooLong { length: usize, max: usize },
}

impl ProtocolError {
	/// True for transport encoding failures
	pub fn is_encoding(&self) -> bool {
		matches!(self, ProtocolError::Base64(_))
	}
}

impl fmt::Display for ProtocolError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProtocolError::Base64(msg) => write!(f, "Base64 decode error: {}", msg),
			ProtocolError::ProtocolViolation(msg) => write!(f, "Protocol violation: {}", msg),
			ProtocolError::UnexpectedResponse { request, response } => {
				write!(f, "Unexpected response '{}' to {} request", response, request)
			}
			ProtocolError::LineTooLong { length, max } => {
				write!(f, "Line of {} bytes exceeds maximum {}", length, max)
			}
		}
	}
}

impl std::error::Error for ProtocolError {}

impl From<base64::DecodeError> for ProtocolError {
	fn from(e: base64::DecodeError) -> Self {
		ProtocolError::Base64(e.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_base64_error_is_encoding() {
		let err: ProtocolError = base64::DecodeError::InvalidLength(3).into();
		assert!(err.is_encoding());
		assert!(err.to_string().starts_with("Base64 decode error"));
	}

	#[test]
	fn test_unexpected_response_display() {
		let err = ProtocolError::UnexpectedResponse {
			request: "DEQUE".to_string(),
			response: "WIZARD".to_string(),
		};
		assert!(!err.is_encoding());
		assert_eq!(err.to_string(), "Unexpected response 'WIZARD' to DEQUE request");
	}
}

// vim: ts=4
