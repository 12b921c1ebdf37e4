//! `application/x-www-form-urlencoded` body decoding.
//!
//! Decoding is strict per pair and forgiving per body: a pair with a broken
//! escape is logged and skipped, the rest of the body still decodes.

use std::collections::HashMap;

use percent_encoding::percent_decode;
use thiserror::Error;
use tracing::warn;

/// Why a single key or value could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormDecodeError {
    #[error("truncated or non-hex percent escape at byte {0}")]
    InvalidEscape(usize),

    #[error("decoded bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// Decode a form body into a field map.
///
/// Pairs are separated by `&` and split on the first `=`. Pairs without `=`
/// or with an empty key are dropped. Repeated keys keep the last value.
pub fn decode_form(body: &[u8]) -> HashMap<String, String> {
    let mut fields = HashMap::new();

    for (index, pair) in body.split(|&b| b == b'&').enumerate() {
        let eq = match pair.iter().position(|&b| b == b'=') {
            Some(0) | None => continue,
            Some(eq) => eq,
        };

        let decoded = percent_decode_component(&pair[..eq]).and_then(|key| {
            percent_decode_component(&pair[eq + 1..]).map(|value| (key, value))
        });

        match decoded {
            Ok((key, value)) => {
                fields.insert(key, value);
            }
            Err(e) => {
                warn!(pair_index = index, error = %e, "form_pair_dropped");
            }
        }
    }

    fields
}

/// Percent-decode one component, treating `+` as a space.
///
/// Escapes are checked up front since `percent_decode` passes malformed
/// ones through untouched.
fn percent_decode_component(input: &[u8]) -> Result<String, FormDecodeError> {
    if let Some(at) = malformed_escape(input) {
        return Err(FormDecodeError::InvalidEscape(at));
    }

    let spaced: Vec<u8> = input
        .iter()
        .map(|&b| if b == b'+' { b' ' } else { b })
        .collect();

    percent_decode(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| FormDecodeError::InvalidUtf8)
}

/// Offset of the first `%` not followed by two hex digits.
fn malformed_escape(input: &[u8]) -> Option<usize> {
    input.iter().enumerate().find_map(|(i, &b)| {
        let valid = b != b'%'
            || matches!(
                (input.get(i + 1), input.get(i + 2)),
                (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()
            );
        (!valid).then_some(i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_pairs() {
        let fields = decode_form(b"name=a&email=b&message=c");
        assert_eq!(fields.len(), 3);
        assert_eq!(fields["name"], "a");
        assert_eq!(fields["email"], "b");
        assert_eq!(fields["message"], "c");
    }

    #[test]
    fn test_decode_percent_and_plus() {
        let fields = decode_form(b"name=Jane+Doe&email=jane%40x.com&message=Hello%2C%20world%21%0A%E2%9C%93");
        assert_eq!(fields["name"], "Jane Doe");
        assert_eq!(fields["email"], "jane@x.com");
        assert_eq!(fields["message"], "Hello, world!\n\u{2713}");
    }

    #[test]
    fn test_decode_encoded_key() {
        let fields = decode_form(b"na%6De=x");
        assert_eq!(fields["name"], "x");
    }

    #[test]
    fn test_pairs_without_equals_or_key_are_dropped() {
        let fields = decode_form(b"orphan&=nokey&name=ok&&");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["name"], "ok");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let fields = decode_form(b"message=a=b=c");
        assert_eq!(fields["message"], "a=b=c");
    }

    #[test]
    fn test_empty_value_is_kept() {
        let fields = decode_form(b"name=");
        assert_eq!(fields["name"], "");
    }

    #[test]
    fn test_last_value_wins() {
        let fields = decode_form(b"name=first&name=second");
        assert_eq!(fields["name"], "second");
    }

    #[test]
    fn test_bad_escape_drops_only_that_pair() {
        let fields = decode_form(b"name=Jane&email=bad%zzescape&message=Hi%2");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["name"], "Jane");
        assert!(!fields.contains_key("email"));
        assert!(!fields.contains_key("message"));
    }

    #[test]
    fn test_invalid_utf8_drops_pair() {
        let fields = decode_form(b"name=%FF%FE&email=ok");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["email"], "ok");
    }

    #[test]
    fn test_empty_body() {
        assert!(decode_form(b"").is_empty());
    }

    #[test]
    fn test_percent_decode_errors() {
        assert_eq!(
            percent_decode_component(b"ab%4"),
            Err(FormDecodeError::InvalidEscape(2))
        );
        assert_eq!(
            percent_decode_component(b"ok%2Fthen%g1"),
            Err(FormDecodeError::InvalidEscape(9))
        );
        assert_eq!(percent_decode_component(b"%C3"), Err(FormDecodeError::InvalidUtf8));
        assert_eq!(percent_decode_component(b"%C3%A9").as_deref(), Ok("\u{e9}"));
    }

    #[test]
    fn test_encoded_plus_stays_literal() {
        assert_eq!(percent_decode_component(b"1%2B1+=+2").as_deref(), Ok("1+1 = 2"));
    }
}
