use std::time::Duration;

use http::request::Parts;
use http::{header, HeaderValue};
use log::debug;
use percent_encoding::utf8_percent_encode;
use storauth_core::time::{format_http_date, now, DateTime};
use storauth_core::{Error, Result, SignRequest, SigningMethod, SigningRequest};

use crate::canonical::{string_to_sign, SigningScheme};
use crate::constants::*;
use crate::sas::{AccessPolicy, AccountSas, Permissions};
use crate::Credential;

/// RequestSigner that implement Azure Storage Shared Key Authorization.
///
/// - [Authorize with Shared Key](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
#[derive(Debug)]
pub struct RequestSigner {
    scheme: SigningScheme,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new builder for Azure Storage signer.
    pub fn new() -> Self {
        Self {
            scheme: SigningScheme::SharedKey,
            time: None,
        }
    }

    /// Sign header requests with another shared key scheme.
    pub fn with_scheme(mut self, scheme: SigningScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    fn sign_shared_key(
        &self,
        req: &mut SigningRequest,
        account_name: &str,
        account_key: &crate::AccountKey,
        method: SigningMethod,
    ) -> Result<()> {
        let now_time = self.time.unwrap_or_else(now);

        match method {
            SigningMethod::Query(d) => {
                let expiry = chrono::TimeDelta::from_std(d)
                    .map_err(|e| {
                        Error::signature_input("expires_in is out of range").with_source(e)
                    })
                    .map(|d| now_time + d)?;
                let policy = AccessPolicy::new(QUERY_PERMISSIONS)
                    .start(now_time)
                    .expiry(expiry);
                let token = AccountSas::new(account_name, account_key.clone(), policy).token()?;
                for (k, v) in token.pairs() {
                    req.query_push(k, v);
                }
            }
            SigningMethod::Header => {
                req.headers
                    .insert(X_MS_DATE, format_http_date(now_time).parse()?);

                let string_to_sign = string_to_sign(req, account_name, self.scheme)?;
                let signature = account_key.sign(&string_to_sign);

                req.headers.insert(header::AUTHORIZATION, {
                    let mut value: HeaderValue = format!(
                        "{} {account_name}:{signature}",
                        self.scheme.authorization_scheme()
                    )
                    .parse()?;
                    value.set_sensitive(true);
                    value
                });
            }
        }

        Ok(())
    }
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

/// Permissions of the account SAS issued for query signing.
const QUERY_PERMISSIONS: Permissions = Permissions::all().without(Permissions::PROCESS);

impl SignRequest for RequestSigner {
    type Credential = Credential;

    fn sign_request(
        &self,
        parts: &mut Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::credential_invalid("credential is required"));
        };

        let method = match expires_in {
            Some(d) => SigningMethod::Query(d),
            None => SigningMethod::Header,
        };
        if matches!(cred, Credential::BearerToken { .. })
            && matches!(method, SigningMethod::Query(_))
        {
            return Err(Error::credential_invalid(
                "bearer token can't be used in query string",
            ));
        }

        let mut req = SigningRequest::build(parts)?;
        let date = req.headers.get(X_MS_DATE).cloned();

        let encoded = match self.sign_credential(&mut req, cred, method) {
            Ok(encoded) => encoded,
            Err(err) => {
                match date {
                    Some(v) => req.headers.insert(X_MS_DATE, v),
                    None => req.headers.remove(X_MS_DATE),
                };
                req.restore(parts);
                return Err(err);
            }
        };

        // Pairs are held decoded; encode them before they go back on the wire.
        // A pre-issued sas token is appended after them already encoded.
        for (k, v) in req.query[..encoded].iter_mut() {
            *k = utf8_percent_encode(k, &AZURE_QUERY_ENCODE_SET).to_string();
            *v = utf8_percent_encode(v, &AZURE_QUERY_ENCODE_SET).to_string();
        }

        req.apply(parts)
    }
}

impl RequestSigner {
    /// Sign `req` with `cred`, returning how many leading query pairs still
    /// need encoding.
    fn sign_credential(
        &self,
        req: &mut SigningRequest,
        cred: &Credential,
        method: SigningMethod,
    ) -> Result<usize> {
        match cred {
            Credential::SasToken { token } => {
                debug!("signing request with pre-issued sas token");
                let encoded = req.query.len();
                req.query_append(token);
                return Ok(encoded);
            }
            Credential::BearerToken { token, .. } => {
                let now_time = self.time.unwrap_or_else(now);
                req.headers
                    .insert(X_MS_DATE, format_http_date(now_time).parse()?);
                req.headers.insert(header::AUTHORIZATION, {
                    let mut value: HeaderValue = format!("Bearer {token}").parse()?;
                    value.set_sensitive(true);
                    value
                });
            }
            Credential::SharedKey {
                account_name,
                account_key,
            } => self.sign_shared_key(req, account_name, account_key, method)?,
        }

        Ok(req.query.len())
    }
}
