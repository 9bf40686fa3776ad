use sha2::{Digest, Sha256};

/// Size in bytes of a content digest
pub const HASH_SIZE: usize = 32;

/// SHA-256 digest of `data`, the key the server indexes items by
pub fn hash(data: &[u8]) -> [u8; HASH_SIZE] {
	let mut digest = [0u8; HASH_SIZE];
	digest.copy_from_slice(&Sha256::digest(data));
	digest
}

/// Parse a hex digest as typed on a command line
pub fn hash_from_hex(text: &str) -> Result<Vec<u8>, hex::FromHexError> {
	hex::decode(text.trim())
}


// vim: ts=4
