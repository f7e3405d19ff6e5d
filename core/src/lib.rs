//! Core components for signing storage service requests.
//!
//! This crate provides the foundational types and traits shared by the
//! storauth crates.
//!
//! ## Overview
//!
//! - **SigningRequest**: the facts about an outbound request that take part in signing
//! - **Traits**: credential loading (`ProvideCredential`) and request signing (`SignRequest`)
//! - **Signer**: keeps the current credential in one shared, rotatable cell and
//!   hands a snapshot of it to a `SignRequest` implementation
//! - **Error**: one error type whose [`ErrorKind`] callers branch on
//!
//! Nothing in this crate performs I/O: signing is a pure computation over
//! its inputs, which makes it safe to call from any number of threads.
//!
//! ## Example
//!
//! ```
//! use storauth_core::{Context, Error, ProvideCredential, Result, SignRequest, Signer, SigningCredential};
//! use std::time::Duration;
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential { key: "my-key".to_string() }))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyBuilder;
//!
//! impl SignRequest for MyBuilder {
//!     type Credential = MyCredential;
//!
//!     fn sign_request(
//!         &self,
//!         req: &mut http::request::Parts,
//!         credential: Option<&Self::Credential>,
//!         _expires_in: Option<Duration>,
//!     ) -> Result<()> {
//!         let cred = credential.ok_or_else(|| Error::credential_invalid("missing"))?;
//!         req.headers.insert("x-my-key", cred.key.parse()?);
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let signer = Signer::new(Context::new(), MyLoader, MyBuilder);
//!
//! let mut parts = http::Request::get("https://example.com")
//!     .body(())
//!     .unwrap()
//!     .into_parts()
//!     .0;
//! signer.sign(&mut parts, None)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: HMAC-SHA256 and base64 helpers
//! - [`time`]: Time formatting in the shapes the service signs
//! - [`utils`]: Redaction of secrets in `Debug` output

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
mod env;
pub use env::{Env, OsEnv, StaticEnv};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod error;
pub use error::{Error, ErrorKind, Result};
mod request;
pub use request::{SigningMethod, SigningRequest};
mod signer;
pub use signer::Signer;
