pub const CONTENT_HASH_LEN: usize = 16;

/// Short blake3 fingerprint of file content, used to detect concurrent edits.
pub fn content_hash(bytes: &[u8]) -> String {
    let full_hex = blake3::hash(bytes).to_hex();
    full_hex.as_str()[..CONTENT_HASH_LEN].to_string()
}

pub fn lines_hash(lines: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    for line in lines {
        hasher.update(line.as_bytes());
    }
    let full_hex = hasher.finalize().to_hex();
    full_hex.as_str()[..CONTENT_HASH_LEN].to_string()
}
