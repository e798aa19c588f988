//! Wire-protocol adapters, one module per provider family
//!
//! Each adapter exposes pure body-builder and response-parser functions plus
//! a thin send wrapper, so request/response handling can be tested without a
//! network.

pub mod anthropic;
pub mod ark;
pub mod google;
pub mod ollama;
pub mod openai;

/// Split a data URI into (media type, base64 payload)
///
/// Returns `None` for anything that is not a `data:*;base64,*` URI.
pub(crate) fn split_data_uri(uri: &str) -> Option<(&str, &str)> {
    let rest = uri.strip_prefix("data:")?;
    let (mime, data) = rest.split_once(";base64,")?;
    if mime.is_empty() || data.is_empty() {
        return None;
    }
    Some((mime, data))
}

/// Wrap a base64 payload into a data URI
pub(crate) fn to_data_uri(mime: &str, data: &str) -> String {
    format!("data:{};base64,{}", mime, data)
}
