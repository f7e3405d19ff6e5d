//! Shared Access Signatures.
//!
//! - [Create an account SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-account-sas)
//! - [Create a service SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas)

use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use storauth_core::time::DateTime;
use storauth_core::utils::Redact;
use storauth_core::{Error, Result};

use crate::constants::*;

mod account;
pub use account::AccountSas;
mod flags;
pub use flags::{Permissions, ResourceTypes, Services};
mod service;
pub use service::{ResponseHeaders, ServiceSas, TableRange};

/// Specifies the protocol permitted for a request made with the SAS.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Protocol {
    /// HTTPS only.
    Https,
    /// HTTPS or HTTP.
    HttpsOrHttp,
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Protocol::Https => write!(f, "https"),
            Protocol::HttpsOrHttp => write!(f, "https,http"),
        }
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "https" => Ok(Protocol::Https),
            "https,http" | "http,https" => Ok(Protocol::HttpsOrHttp),
            v => Err(Error::signature_input(format!("unknown sas protocol: {v}"))),
        }
    }
}

/// The grant a SAS carries.
///
/// When `identifier` references a stored access policy, every other field
/// may be left empty and is filled in by the service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Granted operations.
    pub permissions: Permissions,
    /// Start of the validity window, `None` for no lower bound.
    pub start: Option<DateTime>,
    /// End of the validity window.
    pub expiry: Option<DateTime>,
    /// Single IP address or `low-high` range, signed verbatim.
    pub ip_range: Option<String>,
    /// Allowed protocols.
    pub protocol: Option<Protocol>,
    /// Id of a signed identifier stored in the resource's ACL.
    pub identifier: Option<String>,
}

impl AccessPolicy {
    /// Create a policy granting `permissions`.
    pub fn new(permissions: Permissions) -> Self {
        Self {
            permissions,
            ..Default::default()
        }
    }

    /// Create a policy that only references a stored access policy.
    pub fn with_identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            ..Default::default()
        }
    }

    /// Set the start of the validity window.
    pub fn start(mut self, start: DateTime) -> Self {
        self.start = Some(start);
        self
    }

    /// Set the end of the validity window.
    pub fn expiry(mut self, expiry: DateTime) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Restrict the token to an IP address or range.
    pub fn ip_range(mut self, ip_range: impl Into<String>) -> Self {
        self.ip_range = Some(ip_range.into());
        self
    }

    /// Restrict the token to a protocol.
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Reference a signed identifier.
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    fn check_window(&self) -> Result<()> {
        if let (Some(start), Some(expiry)) = (self.start, self.expiry) {
            if start > expiry {
                return Err(Error::signature_input(format!(
                    "sas start {start} is after expiry {expiry}"
                )));
            }
        }
        Ok(())
    }

    fn check_identifier(&self) -> Result<()> {
        match &self.identifier {
            Some(id) if id.is_empty() => {
                Err(Error::signature_input("signed identifier must not be empty"))
            }
            Some(id) if id.chars().count() > MAX_SIGNED_IDENTIFIER_LEN => {
                Err(Error::signature_input(format!(
                    "signed identifier longer than {MAX_SIGNED_IDENTIFIER_LEN} characters"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Check the ids of the signed identifiers stored in one resource ACL.
///
/// An ACL holds at most five identifiers, each unique, non-empty and at
/// most 64 characters long.
pub fn check_signed_identifiers<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen: Vec<&str> = Vec::with_capacity(MAX_SIGNED_IDENTIFIERS);
    for id in ids {
        AccessPolicy::with_identifier(id).check_identifier()?;
        if seen.contains(&id) {
            return Err(Error::signature_input(format!(
                "duplicate signed identifier {id:?}"
            )));
        }
        if seen.len() == MAX_SIGNED_IDENTIFIERS {
            return Err(Error::signature_input(format!(
                "an acl holds at most {MAX_SIGNED_IDENTIFIERS} signed identifiers"
            )));
        }
        seen.push(id);
    }
    Ok(())
}

/// The storage service a resource-level SAS targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SasService {
    /// Blob service.
    Blob,
    /// File service.
    File,
    /// Queue service.
    Queue,
    /// Table service.
    Table,
}

impl SasService {
    fn as_str(&self) -> &'static str {
        match self {
            SasService::Blob => "blob",
            SasService::File => "file",
            SasService::Queue => "queue",
            SasService::Table => "table",
        }
    }
}

/// The resource a service SAS is scoped to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SasResource {
    /// A single blob.
    Blob {
        /// Container name.
        container: String,
        /// Blob name, unencoded.
        blob: String,
    },
    /// A container and every blob in it.
    Container {
        /// Container name.
        container: String,
    },
    /// A queue and its messages.
    Queue {
        /// Queue name.
        queue: String,
    },
    /// A table, optionally narrowed with a [`TableRange`].
    Table {
        /// Table name.
        table: String,
    },
    /// A single file.
    File {
        /// Share name.
        share: String,
        /// File path inside the share, unencoded.
        path: String,
    },
    /// A share and every file in it.
    Share {
        /// Share name.
        share: String,
    },
}

impl SasResource {
    /// Scope a SAS to a blob.
    pub fn blob(container: impl Into<String>, blob: impl Into<String>) -> Self {
        Self::Blob {
            container: container.into(),
            blob: blob.into(),
        }
    }

    /// Scope a SAS to a container.
    pub fn container(container: impl Into<String>) -> Self {
        Self::Container {
            container: container.into(),
        }
    }

    /// Scope a SAS to a queue.
    pub fn queue(queue: impl Into<String>) -> Self {
        Self::Queue {
            queue: queue.into(),
        }
    }

    /// Scope a SAS to a table.
    pub fn table(table: impl Into<String>) -> Self {
        Self::Table {
            table: table.into(),
        }
    }

    /// Scope a SAS to a file.
    pub fn file(share: impl Into<String>, path: impl Into<String>) -> Self {
        Self::File {
            share: share.into(),
            path: path.into(),
        }
    }

    /// Scope a SAS to a share.
    pub fn share(share: impl Into<String>) -> Self {
        Self::Share {
            share: share.into(),
        }
    }

    /// The service hosting this resource.
    pub fn service(&self) -> SasService {
        match self {
            SasResource::Blob { .. } | SasResource::Container { .. } => SasService::Blob,
            SasResource::Queue { .. } => SasService::Queue,
            SasResource::Table { .. } => SasService::Table,
            SasResource::File { .. } | SasResource::Share { .. } => SasService::File,
        }
    }

    /// The `sr` discriminator, for scopes that have one.
    pub fn signed_resource(&self) -> Option<&'static str> {
        match self {
            SasResource::Blob { .. } => Some("b"),
            SasResource::Container { .. } => Some("c"),
            SasResource::File { .. } => Some("f"),
            SasResource::Share { .. } => Some("s"),
            SasResource::Queue { .. } | SasResource::Table { .. } => None,
        }
    }

    /// Permission characters this scope accepts, in canonical order.
    pub fn permission_order(&self) -> &'static str {
        match self {
            SasResource::Blob { .. } => "racwd",
            SasResource::Container { .. } => "racwdl",
            SasResource::Queue { .. } => "raup",
            SasResource::Table { .. } => "raud",
            SasResource::File { .. } => "rcwd",
            SasResource::Share { .. } => "rcwdl",
        }
    }

    /// `/{service}/{account}/{resource path}` as signed by a service SAS.
    ///
    /// Table names are lower-cased.
    pub fn canonical_resource(&self, account_name: &str) -> String {
        let service = self.service().as_str();
        let account = account_name.to_lowercase();
        match self {
            SasResource::Blob { container, blob } => {
                format!("/{service}/{account}/{container}/{}", blob.trim_start_matches('/'))
            }
            SasResource::Container { container } => format!("/{service}/{account}/{container}"),
            SasResource::Queue { queue } => format!("/{service}/{account}/{queue}"),
            SasResource::Table { table } => {
                format!("/{service}/{account}/{}", table.to_lowercase())
            }
            SasResource::File { share, path } => {
                format!("/{service}/{account}/{share}/{}", path.trim_start_matches('/'))
            }
            SasResource::Share { share } => format!("/{service}/{account}/{share}"),
        }
    }
}

/// A shared access signature as the ordered query pairs it is sent as.
///
/// Values are held raw; [`SasToken::to_query_string`] encodes them.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SasToken {
    pairs: Vec<(String, String)>,
}

impl SasToken {
    /// Parse a SAS query string, with or without a leading `?`.
    pub fn parse(query: &str) -> Result<Self> {
        let query = query.trim_start_matches('?');
        if query.is_empty() {
            return Err(Error::signature_input("empty sas token"));
        }

        Ok(Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        })
    }

    /// Get a field by its query parameter name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The `sig` field.
    pub fn signature(&self) -> Option<&str> {
        self.get(SAS_SIGNATURE)
    }

    /// All fields in emission order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Render as a url query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    pub(crate) fn field(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    /// Push a field, skipping empty values.
    pub(crate) fn push(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.pairs.push((name.to_string(), value));
        }
    }
}

impl Display for SasToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl Debug for SasToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut m = f.debug_map();
        for (k, v) in &self.pairs {
            if k == SAS_SIGNATURE {
                m.entry(k, &Redact::from(v));
            } else {
                m.entry(k, v);
            }
        }
        m.finish()
    }
}
