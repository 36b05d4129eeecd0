//! WS-Security UsernameToken generation.
//!
//! ONVIF devices authenticate requests with the digest variant of the
//! UsernameToken profile: `digest = Base64(SHA1(nonce ‖ created ‖ password))`
//! where `created` is the request timestamp in UTC.  Devices reject
//! timestamps that stray too far from their own clock, so `created` is
//! computed as local time plus the session's clock offset, the device's
//! believed current time, not the caller's.

use base64::Engine;
use chrono::{Duration, Utc};
use sha1::{Digest, Sha1};

const SECEXT_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
const UTILITY_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
const PASSWORD_DIGEST_TYPE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest";
const BASE64_BINARY_TYPE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";

/// Renders a WS-Security block for one request.
///
/// A fresh 16-byte nonce and a fresh timestamp are generated on every call;
/// the result must never be cached across requests, since the device's
/// replay protection depends on both varying.
pub fn username_token(username: &str, password: &str, clock_offset: Duration) -> String {
    let nonce: [u8; 16] = rand::random();
    let nonce_b64 = base64::engine::general_purpose::STANDARD.encode(nonce);

    let created = (Utc::now() + clock_offset)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string();

    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(created.as_bytes());
    hasher.update(password.as_bytes());
    let digest_b64 = base64::engine::general_purpose::STANDARD.encode(hasher.finalize());

    format!(
        concat!(
            "<Security xmlns=\"{secext}\" s:mustUnderstand=\"true\">",
            "<UsernameToken>",
            "<Username>{username}</Username>",
            "<Password Type=\"{digest_type}\">{digest}</Password>",
            "<Nonce EncodingType=\"{b64_type}\">{nonce}</Nonce>",
            "<Created xmlns=\"{utility}\">{created}</Created>",
            "</UsernameToken>",
            "</Security>"
        ),
        secext = SECEXT_NS,
        username = username,
        digest_type = PASSWORD_DIGEST_TYPE,
        digest = digest_b64,
        b64_type = BASE64_BINARY_TYPE,
        nonce = nonce_b64,
        utility = UTILITY_NS,
        created = created,
    )
}
