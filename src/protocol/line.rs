//! Protocol lines and payload transport encoding
//!
//! Every message on the wire has the shape
//!
//! ```text
//! COMMAND[ PAYLOAD]\n
//! ```
//!
//! where COMMAND is a single ASCII word and PAYLOAD, when present, is base64
//! (standard alphabet, padded) so binary data and embedded newlines survive
//! the line framing. The `SIZE` response is the one exception: its payload is
//! a plain decimal number.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;

use super::error::ProtocolError;

/// Transport-encode a payload
pub fn encode_payload(data: &[u8]) -> String {
	STANDARD.encode(data)
}

/// Decode a transport-encoded payload. Surrounding whitespace is ignored.
pub fn decode_payload(text: &str) -> Result<Vec<u8>, ProtocolError> {
	Ok(STANDARD.decode(text.trim())?)
}

/// One protocol line: a command token and an optional raw payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolLine {
	command: String,
	payload: Option<String>,
}

impl ProtocolLine {
	/// A bare command with no payload
	pub fn new(command: &str) -> Self {
		Self { command: command.to_string(), payload: None }
	}

	/// A command carrying `data` transport-encoded
	pub fn with_data(command: &str, data: &[u8]) -> Self {
		Self { command: command.to_string(), payload: Some(encode_payload(data)) }
	}

	/// A command carrying `text` as is
	pub fn with_plain(command: &str, text: &str) -> Self {
		Self { command: command.to_string(), payload: Some(text.to_string()) }
	}

	/// Split a received line at the first space.
	///
	/// The token is trimmed; the payload is kept raw and trimmed only when it
	/// is decoded. Non UTF-8 bytes are replaced, which can only ever produce
	/// an invalid payload since valid payloads are ASCII.
	pub fn parse(raw: &[u8]) -> Self {
		let text = String::from_utf8_lossy(raw);
		let mut parts = text.splitn(2, ' ');
		let command = parts.next().unwrap_or("").trim().to_string();
		let payload = parts.next().map(str::to_string);
		Self { command, payload }
	}

	pub fn command(&self) -> &str {
		&self.command
	}

	/// Raw (still encoded) payload
	pub fn payload(&self) -> Option<&str> {
		self.payload.as_deref()
	}

	/// Decode the payload as transport-encoded data
	///
	/// A missing payload is a protocol violation, a malformed one an encoding
	/// error.
	pub fn data(&self) -> Result<Vec<u8>, ProtocolError> {
		match &self.payload {
			Some(payload) => decode_payload(payload),
			None => Err(ProtocolError::ProtocolViolation(format!(
				"{} line carries no payload",
				self.command
			))),
		}
	}

	/// Serialize for the wire, delimiter included
	pub fn to_wire(&self) -> String {
		match &self.payload {
			Some(payload) => format!("{} {}\n", self.command, payload),
			None => format!("{}\n", self.command),
		}
	}
}

impl fmt::Display for ProtocolLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.payload {
			Some(payload) => write!(f, "{} {}", self.command, payload),
			None => write!(f, "{}", self.command),
		}
	}
}


// vim: ts=4
