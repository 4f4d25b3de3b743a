//! Blake3 fingerprints for upstream change detection

/// Fingerprint of a raw response body as lowercase hex.
///
/// Computed over bytes, not parsed structure: any byte change (whitespace
/// included) yields a different fingerprint.
pub fn fingerprint(body: &[u8]) -> String {
    blake3::hash(body).to_hex().to_string()
}

/// First 8 bytes of a hex fingerprint, for display.
///
/// The string may come from a hand-edited document; anything that does not
/// split cleanly at 8 is shown whole.
pub fn short_hash(fingerprint: &str) -> &str {
    fingerprint.get(..8).unwrap_or(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_deterministic() {
        assert_eq!(fingerprint(b"[[1,\"a\"]]"), fingerprint(b"[[1,\"a\"]]"));
    }

    #[test]
    fn fingerprint_sees_single_byte_change() {
        let body = b"[[\"1-1\",\"COLLEGE\"]]".to_vec();
        let base = fingerprint(&body);
        for i in 0..body.len() {
            let mut changed = body.clone();
            changed[i] ^= 0x01;
            assert_ne!(fingerprint(&changed), base, "byte {i}");
        }
    }

    #[test]
    fn fingerprint_sees_whitespace() {
        assert_ne!(fingerprint(b"[1,2]"), fingerprint(b"[1, 2]"));
    }

    #[test]
    fn fingerprint_is_hex() {
        let fp = fingerprint(b"test");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(short_hash(&fp).len(), 8);
    }

    #[test]
    fn short_hash_of_short_input() {
        assert_eq!(short_hash("abc"), "abc");
    }

    #[test]
    fn short_hash_of_non_ascii_input() {
        // byte 8 falls inside the first 'é'
        assert_eq!(short_hash("abcdefgéé"), "abcdefgéé");
        assert_eq!(short_hash("éééé0123"), "éééé");
    }
}
