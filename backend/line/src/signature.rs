//! Webhook signature verification.
//!
//! LINE signs every webhook delivery with HMAC-SHA256 over the raw request
//! body, keyed by the channel secret, and sends the base64 digest in the
//! `x-line-signature` header.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Check `provided_signature` against the HMAC of `raw_body`.
///
/// Returns `false` for an empty secret, an empty signature, or a signature
/// that is not valid base64. The digest comparison is constant time.
pub fn verify(raw_body: &[u8], provided_signature: &str, shared_secret: &str) -> bool {
    if shared_secret.is_empty() || provided_signature.trim().is_empty() {
        return false;
    }
    let Ok(provided) = BASE64.decode(provided_signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(shared_secret.as_bytes()) else {
        return false;
    };
    mac.update(raw_body);
    mac.verify_slice(&provided).is_ok()
}

/// Compute the header value LINE would send for `raw_body`.
pub fn sign(raw_body: &[u8], shared_secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(shared_secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(raw_body);
    BASE64.encode(mac.finalize().into_bytes())
}
