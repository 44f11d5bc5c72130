use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of hex characters kept from the digest
pub const SHORT_CODE_LEN: usize = 8;

/// Upper bound on candidates tried before giving up on a URL
pub const MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, Error)]
#[error("failed to generate a unique short code after {attempts} attempts")]
pub struct CodeSpaceExhausted {
    pub attempts: u32,
}

/// Derive the short code for a URL: the first 8 hex characters of its SHA-256 digest
pub fn generate_short_code(original_url: &str) -> String {
    candidate_code(original_url, 0)
}

/// Candidate code for a given attempt.
///
/// Attempt 0 hashes the URL alone so the first candidate always equals
/// [`generate_short_code`]. Later attempts hash the URL followed by the
/// decimal attempt number, so a collision yields a different candidate.
pub fn candidate_code(original_url: &str, attempt: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(original_url.as_bytes());
    if attempt > 0 {
        hasher.update(attempt.to_string().as_bytes());
    }
    let digest = hasher.finalize();

    hex::encode(&digest[..SHORT_CODE_LEN / 2])
}

/// Find a short code for `original_url` that does not clash with another URL.
///
/// `is_taken` reports whether a candidate is already held by a *different*
/// URL. A code already mapped to the same URL counts as free, which makes
/// shortening idempotent.
pub fn generate_unique_short_code<F>(
    original_url: &str,
    mut is_taken: F,
) -> Result<String, CodeSpaceExhausted>
where
    F: FnMut(&str) -> bool,
{
    for attempt in 0..MAX_ATTEMPTS {
        let code = candidate_code(original_url, attempt);
        if !is_taken(&code) {
            return Ok(code);
        }
        tracing::debug!(short_code = %code, attempt, "short code collision, retrying");
    }

    Err(CodeSpaceExhausted {
        attempts: MAX_ATTEMPTS,
    })
}

/// Whether a string has the shape of a generated short code
pub fn is_short_code(code: &str) -> bool {
    code.len() == SHORT_CODE_LEN && code.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
