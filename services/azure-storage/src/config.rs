use std::fmt::{Debug, Formatter};

use storauth_core::utils::Redact;
use storauth_core::{Context, Error, Result};

use crate::Credential;

/// Env name of the storage account.
pub const AZURE_STORAGE_ACCOUNT_NAME: &str = "AZURE_STORAGE_ACCOUNT_NAME";
/// Env name of the base64 account key.
pub const AZURE_STORAGE_ACCOUNT_KEY: &str = "AZURE_STORAGE_ACCOUNT_KEY";
/// Env name of a pre-issued SAS token.
pub const AZURE_STORAGE_SAS_TOKEN: &str = "AZURE_STORAGE_SAS_TOKEN";
/// Env name of a pre-issued bearer token.
pub const AZURE_STORAGE_BEARER_TOKEN: &str = "AZURE_STORAGE_BEARER_TOKEN";
const AZBLOB_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
const AZBLOB_ACCOUNT_KEY: &str = "AZBLOB_ACCOUNT_KEY";

/// Config carries all the configuration for Azure Storage services.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ACCOUNT_NAME`] or `AZBLOB_ACCOUNT_NAME`
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_ACCOUNT_KEY`] or `AZBLOB_ACCOUNT_KEY`
    pub account_key: Option<String>,
    /// `sas_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_SAS_TOKEN`]
    pub sas_token: Option<String>,
    /// `bearer_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_STORAGE_BEARER_TOKEN`]
    pub bearer_token: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("sas_token", &Redact::from(&self.sas_token))
            .field("bearer_token", &Redact::from(&self.bearer_token))
            .finish()
    }
}

impl Config {
    /// Load config from env, keeping fields that are already set.
    ///
    /// `AZURE_STORAGE_*` variables win over their `AZBLOB_*` aliases.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let var = |keys: &[&str]| keys.iter().find_map(|k| ctx.env_var(k));

        if self.account_name.is_none() {
            self.account_name = var(&[AZURE_STORAGE_ACCOUNT_NAME, AZBLOB_ACCOUNT_NAME]);
        }
        if self.account_key.is_none() {
            self.account_key = var(&[AZURE_STORAGE_ACCOUNT_KEY, AZBLOB_ACCOUNT_KEY]);
        }
        if self.sas_token.is_none() {
            self.sas_token = var(&[AZURE_STORAGE_SAS_TOKEN]);
        }
        if self.bearer_token.is_none() {
            self.bearer_token = var(&[AZURE_STORAGE_BEARER_TOKEN]);
        }

        self
    }

    /// Build the credential this config describes.
    ///
    /// Shared key wins over a SAS token, which wins over a bearer token.
    /// An account key without an account name is a configuration error.
    pub fn credential(&self) -> Result<Option<Credential>> {
        match (&self.account_name, &self.account_key) {
            (Some(name), Some(key)) => {
                return Credential::with_shared_key(name, key).map(Some);
            }
            (None, Some(_)) => {
                return Err(Error::config_invalid(
                    "account key is configured without account name",
                ));
            }
            _ => {}
        }

        if let Some(token) = &self.sas_token {
            return Ok(Some(Credential::with_sas_token(token)));
        }
        if let Some(token) = &self.bearer_token {
            return Ok(Some(Credential::with_bearer_token(token, None)));
        }

        Ok(None)
    }
}
