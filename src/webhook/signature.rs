//! `X-Hub-Signature-256` verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

const PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

fn keyed(secret: &str, body: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(mac)
}

/// Header value GitHub would send for `body`.
pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    let digest = keyed(secret, body)?.finalize().into_bytes();
    let mut out = String::with_capacity(PREFIX.len() + digest.len() * 2);
    out.push_str(PREFIX);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    Some(out)
}

/// Checks `header` against the body's signature in constant time.
///
/// An empty secret disables verification.
pub fn verify(secret: &str, body: &[u8], header: Option<&str>) -> bool {
    if secret.is_empty() {
        return true;
    }
    let Some(expected) = header
        .and_then(|h| h.trim().strip_prefix(PREFIX))
        .and_then(decode_hex)
    else {
        return false;
    };
    keyed(secret, body).is_some_and(|mac| mac.verify_slice(&expected).is_ok())
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
        .collect()
}
