use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Bytes of randomness behind a PKCE code verifier.
pub const VERIFIER_BYTES: usize = 64;
/// Bytes of randomness behind the anti-CSRF `state` parameter.
pub const STATE_BYTES: usize = 32;

/// Returns `len` bytes from the thread-local CSPRNG, URL-safe base64 encoded
/// without padding.
pub fn random_token(len: usize) -> String {
    let mut buf = vec![0u8; len];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// 86 characters from the RFC 7636 unreserved set, well inside the 43..=128 limit.
pub fn generate_code_verifier() -> String {
    random_token(VERIFIER_BYTES)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

pub fn generate_state() -> String {
    random_token(STATE_BYTES)
}
