//! Turning command-line input into the hostname the engine resolves.

use url::Url;

use crate::error::{Error, Result};

/// Accept either a bare hostname or a URL and return the hostname.
///
/// Bare hostnames pass through untouched; the engine itself treats hosts as
/// opaque strings. Anything containing `://` is parsed as a URL.
pub fn host_from_input(input: &str) -> Result<String> {
    let input = input.trim();
    if !input.contains("://") {
        return Ok(input.to_string());
    }

    let url = Url::parse(input)
        .map_err(|e| Error::protocol_malformed(format!("'{}' is not a valid URL: {}", input, e)))?;
    url.host_str()
        .map(str::to_string)
        .ok_or_else(|| Error::protocol_malformed(format!("URL '{}' has no host", input)))
}
