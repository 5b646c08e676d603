use sha2::{Digest, Sha256};

/// Maps a key onto the 32-bit ring space.
///
/// The key is digested with SHA-256 and the first four bytes of the digest are
/// read as a big-endian `u32`. Placement therefore only depends on the key bytes
/// and is stable across processes and builds.
pub fn generate_hash32(input: &[u8]) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(input);
    let hash = hasher.finalize();
    let mut prefix = [0u8; 4];
    prefix.copy_from_slice(&hash[..4]);

    u32::from_be_bytes(prefix)
}

pub fn hash_key(key: &str) -> u32 {
    generate_hash32(key.as_bytes())
}

#[test]
fn test_generate_hash32() {
    let key = "key".to_owned();
    let hash = generate_hash32(key.as_bytes());
    let hash_retry = generate_hash32(key.as_bytes());

    assert_eq!(hash, hash_retry);
}

#[test]
fn test_hash_is_digest_prefix() {
    // sha256("abc") = ba7816bf 8f01cfea ...
    assert_eq!(hash_key("abc"), 0xba78_16bf);
}

#[test]
fn test_hash_spreads_similar_keys() {
    let hashes: std::collections::HashSet<u32> =
        (0..1000).map(|i| hash_key(&format!("user:{}", i))).collect();
    assert_eq!(hashes.len(), 1000);

    let upper_half = hashes.iter().filter(|h| **h > u32::MAX / 2).count();
    assert!(upper_half > 400 && upper_half < 600, "skewed: {}", upper_half);
}
