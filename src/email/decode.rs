//! Charset decoding
//!
//! Explicit decoding strategy for message part bodies: use the declared
//! charset when its label is known, UTF-8 otherwise. Undecodable byte
//! sequences are dropped rather than kept as replacement characters, so the
//! token stream stays aligned with the corpus the vocabulary was fitted on.
//! Either anomaly marks the result degraded; neither fails the scan.

use encoding_rs::{Encoding, UTF_8};

/// Decoded text plus a flag recording whether fidelity was lost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub degraded: bool,
}

/// Decode body bytes using the declared charset label, if any
pub fn decode_charset(bytes: &[u8], declared: Option<&str>) -> DecodedText {
    let (encoding, unknown_label) = match declared {
        Some(label) => match Encoding::for_label(label.trim().as_bytes()) {
            Some(enc) => (enc, false),
            None => {
                log::debug!("Unknown charset label {:?}, decoding as UTF-8", label);
                (UTF_8, true)
            }
        },
        None => (UTF_8, false),
    };

    let (decoded, _, had_errors) = encoding.decode(bytes);
    let text = if had_errors {
        decoded.replace('\u{FFFD}', "")
    } else {
        decoded.into_owned()
    };

    DecodedText {
        text,
        degraded: had_errors || unknown_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_utf8() {
        let decoded = decode_charset("account alert".as_bytes(), Some("utf-8"));
        assert_eq!(decoded.text, "account alert");
        assert!(!decoded.degraded);
    }

    #[test]
    fn test_declared_latin1() {
        let decoded = decode_charset(b"caf\xe9", Some("iso-8859-1"));
        assert_eq!(decoded.text, "caf\u{e9}");
        assert!(!decoded.degraded);
    }

    #[test]
    fn test_unknown_label_falls_back_to_utf8() {
        let decoded = decode_charset(b"hello", Some("x-no-such-charset"));
        assert_eq!(decoded.text, "hello");
        assert!(decoded.degraded);
    }

    #[test]
    fn test_undecodable_bytes_are_dropped() {
        // 0xE9 is not valid UTF-8 on its own
        let decoded = decode_charset(b"caf\xe9 visit", None);
        assert_eq!(decoded.text, "caf visit");
        assert!(decoded.degraded);
    }

    #[test]
    fn test_no_declared_charset_defaults_to_utf8() {
        let decoded = decode_charset("ok".as_bytes(), None);
        assert_eq!(decoded.text, "ok");
        assert!(!decoded.degraded);
    }
}
