//! Bearer credential extraction from a raw `Authorization` header value.

use crate::services::auth::error::AuthError;

const SCHEME: &str = "bearer ";

/// Pull the bearer token out of an `Authorization` header value.
///
/// The scheme is matched case-insensitively; the token is returned verbatim.
pub fn extract(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(AuthError::MissingCredential)?;

    let scheme = header
        .get(..SCHEME.len())
        .ok_or(AuthError::MalformedCredential)?;
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return Err(AuthError::MalformedCredential);
    }

    let token = header[SCHEME.len()..].trim_start();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::MalformedCredential);
    }

    Ok(token)
}
