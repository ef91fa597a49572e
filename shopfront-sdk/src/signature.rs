//! Signing of hosted-payment return URLs.
//!
//! When a hosted payment is opened, the checkout service hands the payment
//! provider a callback URL that points back at one checkout session. The
//! provider appends `reference=...` and redirects the shopper there. The URL
//! carries a signature so a reference cannot be replayed against another
//! session:
//!
//! ```text
//! sig={unix_timestamp}.{base64_signature}
//! ```
//!
//! where the signature is `HMAC-SHA256("{checkout_id}.{timestamp}", secret)`.

/// Query parameter carrying the return signature.
pub const RETURN_SIGNATURE_PARAM: &str = "sig";

/// Maximum age of a return signature (in seconds).
///
/// Bank transfers can take hours to settle before the shopper is sent back.
pub const MAX_RETURN_AGE: i64 = 6 * 60 * 60;

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid signature format")]
    InvalidFormat,
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("signature expired")]
    Expired,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// Sign a checkout id for use in a return URL, timestamped now.
pub fn sign_checkout_return(checkout_id: &str, key: &[u8]) -> String {
    let timestamp = time::OffsetDateTime::now_utc().unix_timestamp();
    sign_checkout_return_at(checkout_id, timestamp, key)
}

/// Sign a checkout id with an explicit timestamp.
pub fn sign_checkout_return_at(checkout_id: &str, timestamp: i64, key: &[u8]) -> String {
    let data = format!("{checkout_id}.{timestamp}");
    let sig = ring::hmac::sign(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
        data.as_bytes(),
    );
    format_signature(timestamp, sig.as_ref())
}

/// Verify a `{timestamp}.{base64}` return signature for `checkout_id`.
pub fn verify_checkout_return(
    checkout_id: &str,
    value: &str,
    key: &[u8],
) -> Result<(), SignatureError> {
    let (timestamp, signature) = parse_signature(value)?;
    let data = format!("{checkout_id}.{timestamp}");
    ring::hmac::verify(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
        data.as_bytes(),
        signature.as_ref(),
    )?;
    check_timestamp(timestamp)
}

/// Parse a `{timestamp}.{base64}` value into its parts.
pub fn parse_signature(value: &str) -> Result<(i64, Box<[u8]>), SignatureError> {
    let (timestamp, encoded) = value.split_once('.').ok_or(SignatureError::InvalidFormat)?;
    let timestamp: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::InvalidFormat)?;
    let signature = fast32::base64::RFC4648_NOPAD
        .decode_str(encoded)
        .map_err(|_| SignatureError::InvalidBase64)?
        .into_boxed_slice();
    Ok((timestamp, signature))
}

/// Format a `{timestamp}.{base64}` value.
///
/// The standard alphabet is used; percent-encode before putting it in a URL.
pub fn format_signature(timestamp: i64, signature: &[u8]) -> String {
    format!(
        "{}.{}",
        timestamp,
        fast32::base64::RFC4648_NOPAD.encode(signature)
    )
}

fn check_timestamp(timestamp: i64) -> Result<(), SignatureError> {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    if now - timestamp > MAX_RETURN_AGE {
        return Err(SignatureError::Expired);
    }
    Ok(())
}
