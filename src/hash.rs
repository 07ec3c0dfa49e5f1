use sha1::{Digest, Sha1};

/// Stateless digest facade. Produces a 40-char lowercase hex SHA-1 over `bytes`.
pub fn hex_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
