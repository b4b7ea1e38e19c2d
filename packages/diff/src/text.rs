//! Decoding of blob bytes into text.
//!
//! Decoding tries UTF-8, then the charset of the process locale, then a
//! statistical guess. Fallbacks decode strictly: malformed input is rejected
//! rather than patched with replacement characters.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// Locale variables consulted for the preferred charset, highest priority first.
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_CTYPE", "LANG"];

/// Error returned when no candidate encoding decodes the input.
///
/// Carries the UTF-8 error of the first attempt.
#[derive(Debug, thiserror::Error)]
#[error("Failed to decode text: {0}")]
pub struct DecodeError(#[from] pub std::str::Utf8Error);

/// Decode `bytes` into a `String`.
///
/// # Errors
///
/// Returns `DecodeError` if the bytes are neither UTF-8, nor valid in the
/// locale charset, nor valid in the detected encoding.
pub fn decode_text(bytes: &[u8]) -> Result<String, DecodeError> {
    let utf8_error = match std::str::from_utf8(bytes) {
        Ok(text) => return Ok(text.to_string()),
        Err(e) => e,
    };

    let locale = locale_encoding(|var| std::env::var(var).ok());
    let detected = detect_encoding(bytes);
    log::trace!(
        "falling back from UTF-8: locale={:?} detected={}",
        locale.map(Encoding::name),
        detected.name()
    );

    decode_with(bytes, locale.into_iter().chain([detected]))
        .ok_or(DecodeError(utf8_error))
}

/// Decode with the first encoding in `candidates` that accepts `bytes`.
fn decode_with(
    bytes: &[u8],
    candidates: impl IntoIterator<Item = &'static Encoding>,
) -> Option<String> {
    candidates.into_iter().find_map(|encoding| {
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(std::borrow::Cow::into_owned)
    })
}

fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Charset named by the first non-empty locale variable, e.g. `de_DE.ISO-8859-1@euro`.
fn locale_encoding(lookup: impl Fn(&str) -> Option<String>) -> Option<&'static Encoding> {
    let locale = LOCALE_VARS
        .iter()
        .find_map(|var| lookup(var).filter(|value| !value.is_empty()))?;
    let (_, charset) = locale.split_once('.')?;
    let charset = charset.split('@').next()?;
    Encoding::for_label(charset.as_bytes()).filter(|encoding| *encoding != UTF_8)
}
