//! Account key signing.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use storauth_core::hash::{base64_decode, base64_hmac_sha256};
use storauth_core::utils::Redact;
use storauth_core::Result;

/// Decoded account key.
///
/// The stored secret is base64; it's decoded once, when the key is built, so
/// a malformed key fails during credential setup instead of at the first
/// request. Clones share the decoded bytes.
#[derive(Clone)]
pub struct AccountKey {
    encoded: Arc<str>,
    decoded: Arc<[u8]>,
}

impl AccountKey {
    /// Decode a base64 account key.
    ///
    /// Returns [`storauth_core::ErrorKind::MalformedKey`] if `key` isn't
    /// valid base64.
    pub fn new(key: &str) -> Result<Self> {
        let decoded = base64_decode(key)?;
        Ok(Self {
            encoded: Arc::from(key),
            decoded: Arc::from(decoded),
        })
    }

    /// Sign a canonical string, returning the base64 HMAC-SHA256.
    pub fn sign(&self, string_to_sign: &str) -> String {
        base64_hmac_sha256(&self.decoded, string_to_sign.as_bytes())
    }

    /// The key as it was stored, base64 encoded.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.decoded.is_empty()
    }
}

impl Debug for AccountKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AccountKey")
            .field(&Redact::from(self.encoded()))
            .finish()
    }
}
