//! Newline framing for the receive path.
//!
//! Bytes arrive from the socket in arbitrary chunks. The framer keeps the
//! unfinished tail in a pending buffer and hands back every line completed by
//! the latest chunk, delimiter stripped.
//!
//! ```ignore
//! let mut framer = Framer::new(1024);
//! assert!(framer.feed(b"OK\nSIZ").unwrap() == vec![b"OK".to_vec()]);
//! assert!(framer.feed(b"E 3\n").unwrap() == vec![b"SIZE 3".to_vec()]);
//! ```

use super::error::ProtocolError;

/// Line delimiter
pub const DELIMITER: u8 = b'\n';

/// Incremental line splitter with a length cap.
#[derive(Debug)]
pub struct Framer {
	/// Bytes received but not yet terminated by a delimiter.
	/// Never contains a delimiter between calls.
	pending: Vec<u8>,
	max_line_length: usize,
}

impl Framer {
	pub fn new(max_line_length: usize) -> Self {
		Self { pending: Vec::new(), max_line_length }
	}

	/// Append `data` and return every line it completes, in order.
	///
	/// # Errors
	///
	/// `ProtocolError::LineTooLong` when a completed line, or the pending
	/// remainder, grows past the cap. The framer should not be fed again.
	pub fn feed(&mut self, data: &[u8]) -> Result<Vec<Vec<u8>>, ProtocolError> {
		// Old pending bytes hold no delimiter, so only new bytes are scanned
		let mut cursor = self.pending.len();
		self.pending.extend_from_slice(data);

		let mut lines = Vec::new();
		let mut start = 0;
		while let Some(offset) = self.pending[cursor..].iter().position(|&b| b == DELIMITER) {
			let end = cursor + offset;
			self.check_length(end - start)?;
			lines.push(self.pending[start..end].to_vec());
			start = end + 1;
			cursor = start;
		}
		self.pending.drain(..start);
		self.check_length(self.pending.len())?;

		Ok(lines)
	}

	/// Number of buffered bytes still waiting for a delimiter
	pub fn pending_len(&self) -> usize {
		self.pending.len()
	}

	/// Drop any partial line. Returns the number of bytes discarded.
	pub fn discard(&mut self) -> usize {
		let dropped = self.pending.len();
		self.pending.clear();
		dropped
	}

	fn check_length(&self, length: usize) -> Result<(), ProtocolError> {
		if length > self.max_line_length {
			return Err(ProtocolError::LineTooLong { length, max: self.max_line_length });
		}
		Ok(())
	}
}


// vim: ts=4
