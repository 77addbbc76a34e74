//! Request canonicalization and HMAC-SHA1 signing
//!
//! Builds the legacy string-to-sign:
//!
//! ```text
//! METHOD\nCONTENT-MD5\nCONTENT-TYPE\nDATE\n<amz-headers><canonical-resource>
//! ```
//!
//! where `<amz-headers>` is one `name:value` line per provider header,
//! lower-cased, sorted by name and newline-terminated, or nothing at all
//! when the request carries no such header.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::encoding::Headers;

type HmacSha1 = Hmac<Sha1>;

/// `Date` header layout; the timestamp is always rendered in UTC
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S +0000";

/// Render the canonical provider-header block
pub fn canonical_headers(amz_headers: &Headers) -> String {
    let mut lines: Vec<(String, String)> = amz_headers
        .iter()
        .map(|(name, value)| {
            let name = name.to_ascii_lowercase();
            let line = format!("{name}:{value}");
            (name, line)
        })
        .collect();
    lines.sort();

    let mut block = lines
        .into_iter()
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join("\n");
    if !block.is_empty() {
        block.push('\n');
    }
    block
}

/// Compose the exact string that gets signed
pub fn string_to_sign(
    method: &str,
    content_md5: &str,
    content_type: &str,
    http_date: &str,
    amz_headers: &Headers,
    canonical_resource: &str,
) -> String {
    format!(
        "{method}\n{content_md5}\n{content_type}\n{http_date}\n{}{canonical_resource}",
        canonical_headers(amz_headers)
    )
}

/// Base64 HMAC-SHA1 of `string_to_sign` keyed by `secret`
pub fn sign(secret: &[u8], string_to_sign: &str) -> String {
    // HMAC accepts any key length
    let mut mac = HmacSha1::new_from_slice(secret).unwrap_or_else(|_| unreachable!());
    mac.update(string_to_sign.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Base64 MD5 digest of a body, or the empty string for an empty body
pub fn content_md5(body: &[u8]) -> String {
    if body.is_empty() {
        return String::new();
    }
    STANDARD.encode(md5::compute(body).0)
}

/// Format a timestamp for the `Date` header
pub fn http_date(at: jiff::Timestamp) -> String {
    at.strftime(HTTP_DATE_FORMAT).to_string()
}

/// A browser-upload policy and its signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPolicy {
    /// Base64 of the policy document
    pub policy: String,
    pub signature: String,
}

/// Sign a POST-form policy document
pub fn sign_policy(secret: &[u8], document: &[u8]) -> SignedPolicy {
    let policy = STANDARD.encode(document);
    let signature = sign(secret, &policy);
    SignedPolicy { policy, signature }
}
