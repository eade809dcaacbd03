//! Webhook signature verification.
//!
//! GitHub signs each delivery with HMAC-SHA256 over the raw request body and
//! sends the result as `X-Hub-Signature-256: sha256=<hex>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// Scheme tag the header value must start with.
const SIGNATURE_SCHEME: &str = "sha256=";

/// Verifies a raw webhook body against its signature header.
///
/// The digest comparison is constant-time (via [`Mac::verify_slice`]). Every
/// failure mode (blank body, missing header, wrong scheme, malformed hex,
/// digest mismatch) is reported identically as `false` so a caller cannot
/// leak which check failed.
///
/// A body that is empty or all whitespace is rejected outright, even when
/// correctly signed; there is no legitimate delivery without content.
pub fn verify(body: &[u8], secret: &str, signature_header: Option<&str>) -> bool {
    if body.iter().all(u8::is_ascii_whitespace) {
        return false;
    }

    let Some(header) = signature_header else {
        return false;
    };
    let Some(signature_hex) = header.trim().strip_prefix(SIGNATURE_SCHEME) else {
        return false;
    };
    let Ok(signature) = hex::decode(signature_hex) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&signature).is_ok()
}

/// Computes the `sha256=<hex>` header value for a body and secret.
///
/// The counterpart of [`verify`]; callers that emit webhook-style requests
/// (and the test suite) use this to produce valid signatures.
pub fn sign(body: &[u8], secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    format!("{SIGNATURE_SCHEME}{}", hex::encode(mac.finalize().into_bytes()))
}
