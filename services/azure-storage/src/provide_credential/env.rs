use log::debug;
use storauth_core::{Context, ProvideCredential, Result};

use crate::{Config, Credential};

/// Loads a credential from environment variables.
///
/// See [`Config::from_env`] for the variables that are read.
#[derive(Clone, Debug, Default)]
pub struct EnvCredentialProvider {}

impl EnvCredentialProvider {
    /// Create a new provider.
    pub fn new() -> Self {
        Self {}
    }
}

impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let cfg = Config::default().from_env(ctx);
        debug!("loaded azure storage config from env: {cfg:?}");

        cfg.credential()
    }
}
