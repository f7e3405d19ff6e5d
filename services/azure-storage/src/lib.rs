//! Azure Storage signer
//!
//! This crate provides signing capabilities for Azure Storage services including:
//! - Shared Key authentication (`SharedKey`, `SharedKeyLite` and the table flavour)
//! - SAS (Shared Access Signature) generation at account and resource level
//! - Pre-issued SAS token and bearer token authentication
//!
//! # Example
//!
//! ```rust
//! use storauth_azure_storage::{EnvCredentialProvider, RequestSigner};
//! use storauth_core::{Context, OsEnv, Result, Signer};
//!
//! # fn main() -> Result<()> {
//! let ctx = Context::new().with_env(OsEnv);
//! let signer = Signer::new(ctx, EnvCredentialProvider::new(), RequestSigner::new());
//!
//! let mut parts = http::Request::get("https://account.blob.core.windows.net/container/blob")
//!     .body(())
//!     .unwrap()
//!     .into_parts()
//!     .0;
//!
//! // Fails with a credential error when nothing is configured in the env.
//! let _ = signer.sign(&mut parts, None);
//! # Ok(())
//! # }
//! ```
//!
//! Issuing a SAS:
//!
//! ```rust
//! use storauth_azure_storage::{AccessPolicy, AccountKey, Permissions, SasResource, ServiceSas};
//! use storauth_core::time::parse_rfc3339;
//! use storauth_core::Result;
//!
//! # fn main() -> Result<()> {
//! let key = AccountKey::new("a2V5")?;
//! let policy = AccessPolicy::new(Permissions::READ)
//!     .expiry(parse_rfc3339("2030-01-01T00:00:00Z")?);
//! let token = ServiceSas::new("myaccount", key, SasResource::blob("pics", "cat.png"), policy)
//!     .token()?;
//!
//! let url = format!("https://myaccount.blob.core.windows.net/pics/cat.png?{token}");
//! # let _ = url;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod constants;

mod canonical;
pub use canonical::{
    account_sas_string_to_sign, service_sas_string_to_sign, string_to_sign, SigningScheme,
};

mod config;
pub use config::{
    Config, AZURE_STORAGE_ACCOUNT_KEY, AZURE_STORAGE_ACCOUNT_NAME, AZURE_STORAGE_BEARER_TOKEN,
    AZURE_STORAGE_SAS_TOKEN,
};

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::{EnvCredentialProvider, StaticCredentialProvider};

mod sas;
pub use sas::{
    check_signed_identifiers, AccessPolicy, AccountSas, Permissions, Protocol, ResourceTypes,
    ResponseHeaders, SasResource, SasService, SasToken, ServiceSas, Services, TableRange,
};

mod sign_request;
pub use sign_request::RequestSigner;

mod signer;
pub use signer::AccountKey;

pub use constants::SIGNING_VERSION;
