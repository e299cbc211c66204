//! Bearer token issuance and verification.
//!
//! Tokens are opaque strings of the form `username.nonce.mac`, where `mac` is
//! an HMAC-SHA256 over `username.nonce` under the server secret. The nonce
//! makes every issued token distinct. Verification asserts possession of a
//! validly signed token and nothing more; account state (existence, role) is
//! re-resolved from the credential store on every request.

use sha2::{Digest, Sha256};

use crate::error::AuthError;

const BLOCK_SIZE: usize = 64;
const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5C;

/// Signs and verifies bearer tokens with a server-side secret.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issue a fresh token for `username`.
    ///
    /// Each call embeds a random nonce, so repeated logins yield distinct
    /// tokens that all verify independently.
    pub fn issue(&self, username: &str) -> String {
        let nonce = format!("{:016x}", rand::random::<u64>());
        let mac = self.mac(username, &nonce);
        format!("{username}.{nonce}.{mac}")
    }

    /// Verify a token and return the username it was issued for.
    ///
    /// Usernames may themselves contain `.`, so the token is split from the
    /// right: the last two segments are the nonce and the MAC.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let mut parts = token.rsplitn(3, '.');
        let mac = parts.next().ok_or(AuthError::InvalidCredentials)?;
        let nonce = parts.next().ok_or(AuthError::InvalidCredentials)?;
        let username = parts.next().ok_or(AuthError::InvalidCredentials)?;
        if username.is_empty() || nonce.is_empty() || mac.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let expected = self.mac(username, nonce);
        if !constant_time_compare(mac.as_bytes(), expected.as_bytes()) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(username.to_string())
    }

    fn mac(&self, username: &str, nonce: &str) -> String {
        let message = format!("{username}.{nonce}");
        hex::encode(hmac_sha256(&self.secret, message.as_bytes()))
    }
}

/// HMAC-SHA256 (RFC 2104).
fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    // Keys longer than the block size are hashed first; shorter keys are
    // zero-padded up to it.
    let mut padded = [0u8; BLOCK_SIZE];
    if key.len() > BLOCK_SIZE {
        let digest = Sha256::digest(key);
        padded[..digest.len()].copy_from_slice(&digest);
    } else {
        padded[..key.len()].copy_from_slice(key);
    }

    let mut inner = Sha256::new();
    let ipad_key: Vec<u8> = padded.iter().map(|b| b ^ IPAD).collect();
    inner.update(&ipad_key);
    inner.update(message);
    let inner_hash = inner.finalize();

    let mut outer = Sha256::new();
    let opad_key: Vec<u8> = padded.iter().map(|b| b ^ OPAD).collect();
    outer.update(&opad_key);
    outer.update(inner_hash);
    outer.finalize().into()
}

/// Compare two byte strings without an early exit on the first mismatch.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("unit-test-secret")
    }

    #[test]
    fn issued_tokens_verify() {
        let token = signer().issue("alice");
        assert_eq!(signer().verify(&token).unwrap(), "alice");
    }

    #[test]
    fn each_issue_is_distinct_and_all_verify() {
        let s = signer();
        let first = s.issue("alice");
        let second = s.issue("alice");
        assert_ne!(first, second);
        assert_eq!(s.verify(&first).unwrap(), "alice");
        assert_eq!(s.verify(&second).unwrap(), "alice");
    }

    #[test]
    fn usernames_with_dots_round_trip() {
        let token = signer().issue("alice.smith");
        assert_eq!(signer().verify(&token).unwrap(), "alice.smith");
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let mut token = signer().issue("bob");
        let last = token.pop().unwrap();
        token.push(if last == '0' { '1' } else { '0' });
        assert_eq!(signer().verify(&token), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn tokens_do_not_verify_under_another_secret() {
        let token = signer().issue("bob");
        let other = TokenSigner::new("different-secret");
        assert_eq!(other.verify(&token), Err(AuthError::InvalidCredentials));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        for bad in ["", "no-dots", "one.dot", "..", "a..b", "a.b."] {
            assert!(signer().verify(bad).is_err(), "{bad:?} should not verify");
        }
    }

    #[test]
    fn hmac_matches_the_rfc_4231_vector() {
        // Test case 2: short key, short message.
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }
}
