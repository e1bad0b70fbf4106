//! Signed cookie helpers for session authentication.
//!
//! Uses HMAC-SHA256 to sign session IDs, making cookies tamper-proof.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::SecretString;

use super::config::{SameSite, SessionConfig};

type HmacSha256 = Hmac<Sha256>;

/// Signs a session ID with HMAC-SHA256.
///
/// Returns a string in the format `{session_id}.{signature}`.
pub fn sign_session_id(session_id: &str, secret: &SecretString) -> String {
    let signature = compute_hmac(session_id.as_bytes(), secret.expose_secret().as_bytes());
    format!("{}.{}", session_id, hex::encode(signature))
}

/// Verifies a signed cookie value and extracts the session ID.
///
/// Returns `None` if the signature is invalid (tampered).
pub fn verify_signed_cookie(cookie_value: &str, secret: &SecretString) -> Option<String> {
    let (session_id, signature_hex) = cookie_value.rsplit_once('.')?;

    let actual_sig = hex::decode(signature_hex).ok()?;
    let expected_sig = compute_hmac(session_id.as_bytes(), secret.expose_secret().as_bytes());

    if constant_time_eq(&expected_sig, &actual_sig) {
        Some(session_id.to_owned())
    } else {
        log::warn!(target: "atrium::session", "msg=\"session cookie tampered\" cookie_prefix=\"{}...\"", &cookie_value.chars().take(8).collect::<String>());
        None
    }
}

/// Builds the `Set-Cookie` header value carrying a signed session ID.
pub fn session_cookie_header(signed_value: &str, config: &SessionConfig) -> String {
    let mut parts = vec![
        format!("{}={}", config.cookie_name, signed_value),
        format!("Path={}", config.cookie_path),
        format!("Max-Age={}", config.session_lifetime.num_seconds()),
        format!("SameSite={}", same_site_str(config.cookie_same_site)),
    ];
    if let Some(ref domain) = config.cookie_domain {
        parts.push(format!("Domain={domain}"));
    }
    if config.cookie_secure {
        parts.push("Secure".to_owned());
    }
    if config.cookie_http_only {
        parts.push("HttpOnly".to_owned());
    }
    parts.join("; ")
}

/// Builds the `Set-Cookie` header value that removes the session cookie.
pub fn removal_cookie_header(config: &SessionConfig) -> String {
    format!("{}=; Path={}; Max-Age=0", config.cookie_name, config.cookie_path)
}

fn same_site_str(same_site: SameSite) -> &'static str {
    match same_site {
        SameSite::None => "None",
        SameSite::Lax => "Lax",
        SameSite::Strict => "Strict",
    }
}

/// Computes HMAC-SHA256.
///
/// # Panics
///
/// This function cannot panic as HMAC accepts keys of any size.
fn compute_hmac(message: &[u8], key: &[u8]) -> Vec<u8> {
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
