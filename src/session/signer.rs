//! HMAC-SHA256 signing of session cookie values.
//!
//! A signed value has the form `{role}.{hex(HMAC-SHA256(secret, role))}`.
//! Verification uses constant-time comparison.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::SessionError;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies role values carried in the session cookie.
#[derive(Clone)]
pub struct SessionSigner {
    secret_key: Vec<u8>,
}

impl SessionSigner {
    pub fn new(secret_key: impl AsRef<[u8]>) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
        }
    }

    /// Produce `{value}.{signature}`.
    pub fn sign(&self, value: &str) -> String {
        format!("{}.{}", value, self.compute_signature(value))
    }

    /// Verify a signed value and return the unsigned part.
    pub fn verify<'a>(&self, signed: &'a str) -> Result<&'a str, SessionError> {
        let (value, signature) = signed
            .rsplit_once('.')
            .ok_or(SessionError::MissingSignature)?;

        let provided = hex::decode(signature).map_err(|_| SessionError::InvalidSignatureFormat)?;
        let expected = self.mac(value);

        if provided.ct_eq(&expected).into() {
            Ok(value)
        } else {
            Err(SessionError::InvalidSignature)
        }
    }

    fn compute_signature(&self, value: &str) -> String {
        hex::encode(self.mac(value))
    }

    fn mac(&self, value: &str) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret_key).expect("HMAC can take key of any size");
        mac.update(value.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}
