//!
//! Basic-authentication credential validation
//! ------------------------------------------
//! A single static username/password pair, fixed at process start and passed
//! by reference into stateless functions; there is no user store. Both
//! fields are compared in constant time so response latency does not leak
//! how many leading characters of a guess matched.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use subtle::ConstantTimeEq;
use tracing::debug;

/// Immutable credential pair, set once at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

const PASSWORD_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random alphanumeric password from OS randomness.
pub fn generate_password(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    let _ = getrandom::getrandom(&mut bytes);
    bytes
        .iter()
        .map(|b| PASSWORD_CHARSET[*b as usize % PASSWORD_CHARSET.len()] as char)
        .collect()
}

/// Split a decoded `user:pass` payload on the FIRST colon only; passwords
/// may themselves contain `:`.
fn split_credentials(decoded: &str) -> Option<(&str, &str)> {
    decoded.split_once(':')
}

/// Validate an `Authorization: Basic <base64(user:pass)>` header value
/// against the expected credentials.
///
/// Any parse failure (missing scheme, missing payload, invalid base64, no
/// colon) is an authentication failure, indistinguishable at this boundary
/// from a wrong password or an absent header. The raw header content is
/// never logged.
pub fn authenticate(header_value: Option<&str>, expected: &Credentials) -> bool {
    let Some(header) = header_value else {
        return false; // fast reject, no parsing attempted
    };

    let mut tokens = header.split_whitespace();
    let (Some(scheme), Some(payload)) = (tokens.next(), tokens.next()) else {
        debug!("failed to parse authorization header");
        return false;
    };
    if scheme != "Basic" {
        debug!("failed to parse authorization header");
        return false;
    }
    let Ok(decoded_bytes) = BASE64.decode(payload) else {
        debug!("failed to parse authorization header");
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded_bytes) else {
        debug!("failed to parse authorization header");
        return false;
    };
    let Some((username, password)) = split_credentials(&decoded) else {
        debug!("failed to parse authorization header");
        return false;
    };

    // Evaluate both comparisons unconditionally before combining.
    let user_ok: bool = username.as_bytes().ct_eq(expected.username.as_bytes()).into();
    let pass_ok: bool = password.as_bytes().ct_eq(expected.password.as_bytes()).into();
    user_ok & pass_ok
}
