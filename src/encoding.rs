// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Transport encoding used by the GitHub contents API.
//!
//! README bodies travel as standard base64. The API wraps the encoded text at
//! 60 columns, so [`decode`] ignores ASCII whitespace before decoding.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::Error;

/// Encodes plain README text into the transport representation.
///
/// # Examples
///
/// ```
/// assert_eq!(readme_badges::encode("# Title"), "IyBUaXRsZQ==");
/// ```
pub fn encode(plain: &str) -> String {
    STANDARD.encode(plain.as_bytes())
}

/// Decodes transport text back into the README body.
///
/// # Errors
///
/// Returns [`Error::Decode`] for malformed base64 and [`Error::NotUtf8`] when
/// the decoded bytes are not valid UTF-8. Malformed input never yields an
/// empty string.
///
/// # Examples
///
/// ```
/// let text = readme_badges::decode("IyBU\naXRsZQ==\n")?;
/// assert_eq!(text, "# Title");
/// # Ok::<(), readme_badges::Error>(())
/// ```
pub fn decode(transport: &str) -> Result<String, Error> {
    let compact: String = transport
        .chars()
        .filter(|character| !character.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{decode, encode};
    use crate::error::Error;

    proptest! {
        #[test]
        fn decode_reverses_encode(input in any::<String>()) {
            let encoded = encode(&input);
            prop_assert_eq!(decode(&encoded).expect("round trip"), input);
        }

        #[test]
        fn encode_reproduces_canonical_transport(input in any::<String>(), width in 1usize..80) {
            let canonical = encode(&input);
            prop_assert_eq!(encode(&decode(&canonical).expect("canonical")), canonical.clone());

            let wrapped = canonical
                .as_bytes()
                .chunks(width)
                .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                .collect::<Vec<_>>()
                .join("\n");
            prop_assert_eq!(encode(&decode(&wrapped).expect("wrapped")), canonical);
        }
    }

    #[test]
    fn decode_accepts_wrapped_api_payload() {
        let wrapped = "IyBNeSBQcm9qZWN0CgpTb21lIHRl\neHQ=\n";
        let text = decode(wrapped).expect("wrapped payload should decode");
        assert_eq!(text, "# My Project\n\nSome text");
    }

    #[test]
    fn decode_rejects_malformed_input() {
        let error = decode("not base64!").expect_err("expected decode failure");
        assert!(matches!(error, Error::Decode { .. }));
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let error = decode("//4=").expect_err("expected utf-8 failure");
        assert!(matches!(error, Error::NotUtf8 { .. }));
    }

    #[test]
    fn empty_text_round_trips() {
        assert_eq!(encode(""), "");
        assert_eq!(decode("").expect("empty input is valid"), "");
    }
}
