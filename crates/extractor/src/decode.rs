const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode an uploaded payload as UTF-8, stripping a leading BOM.
///
/// Invalid byte sequences are dropped rather than rejected, so this never fails.
#[must_use]
pub fn decode_payload(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut text = String::with_capacity(bytes.len());
    let mut dropped = 0usize;
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }
    if dropped > 0 {
        log::debug!("dropped {dropped} undecodable bytes from payload");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bom() {
        assert_eq!(decode_payload(b"\xEF\xBB\xBF{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn drops_invalid_bytes() {
        assert_eq!(decode_payload(b"{\"a\":\xFF\xFE1}"), "{\"a\":1}");
    }

    #[test]
    fn keeps_multibyte_text() {
        assert_eq!(decode_payload("résumé ✓".as_bytes()), "résumé ✓");
    }

    #[test]
    fn bom_only_in_front_is_stripped() {
        let text = decode_payload(b"a\xEF\xBB\xBFb");
        assert_eq!(text, "a\u{feff}b");
    }
}
