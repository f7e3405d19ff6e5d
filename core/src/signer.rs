use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use log::debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Signer is the main struct used to sign the request.
///
/// The credential lives in one shared cell: clones of a `Signer` observe the
/// same credential, and [`Signer::rotate`] replaces it for all of them.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Replace the cached credential for every clone of this signer.
    ///
    /// Requests already holding a snapshot finish with the old credential.
    pub fn rotate(&self, credential: K) -> Result<()> {
        if !credential.is_valid() {
            return Err(Error::credential_invalid(
                "refusing to rotate in an invalid credential",
            ));
        }

        *self.lock()? = Some(credential);
        debug!("signing credential rotated");
        Ok(())
    }

    /// Take a consistent snapshot of the current credential, loading it
    /// through the provider if none is cached or the cached one is no longer
    /// valid.
    pub fn credential(&self) -> Result<Option<K>> {
        let cached = self.lock()?.clone();
        if cached.is_valid() {
            return Ok(cached);
        }

        let loaded = self.loader.provide_credential(&self.ctx)?;
        debug!("signing credential loaded: {}", loaded.is_some());
        *self.lock()? = loaded.clone();
        Ok(loaded)
    }

    /// Signing request.
    pub fn sign(
        &self,
        req: &mut http::request::Parts,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let credential = self.credential()?;

        self.builder
            .sign_request(req, credential.as_ref(), expires_in)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<K>>> {
        self.credential
            .lock()
            .map_err(|_| Error::unexpected("signing credential lock poisoned"))
    }
}
