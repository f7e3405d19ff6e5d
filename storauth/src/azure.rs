//! Azure Storage service support with convenience APIs

pub use storauth_azure_storage::*;

use storauth_core::{Context, OsEnv, Signer};

/// Azure Storage signer over [`Credential`].
pub type DefaultSigner = Signer<Credential>;

/// Create a signer reading its credential from the process environment.
///
/// The credential is resolved on first use with the precedence shared key,
/// then SAS token, then bearer token. Requests are signed with `SharedKey`.
///
/// Swap the scheme by building the [`Signer`] yourself:
///
/// ```
/// use storauth::azure::{EnvCredentialProvider, RequestSigner, SigningScheme};
/// use storauth::{Context, OsEnv, Signer};
///
/// let signer = Signer::new(
///     Context::new().with_env(OsEnv),
///     EnvCredentialProvider::new(),
///     RequestSigner::new().with_scheme(SigningScheme::SharedKeyTable),
/// );
/// # let _ = signer;
/// ```
pub fn default_signer() -> DefaultSigner {
    Signer::new(
        Context::new().with_env(OsEnv),
        EnvCredentialProvider::new(),
        RequestSigner::new(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_signer_uses_rotated_credential() {
        let signer = default_signer();
        signer
            .rotate(Credential::with_sas_token("sv=2018-11-09&sig=abc"))
            .unwrap();

        let mut parts = http::Request::get("https://acct.blob.core.windows.net/c/b")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        signer.sign(&mut parts, None).unwrap();

        assert_eq!(
            parts.uri.to_string(),
            "https://acct.blob.core.windows.net/c/b?sv=2018-11-09&sig=abc"
        );
    }
}
