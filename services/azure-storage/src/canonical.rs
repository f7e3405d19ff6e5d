//! Canonical strings covered by a shared key signature.
//!
//! - [Authorize with Shared Key](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)

use std::fmt::Write;

use http::header;
use log::debug;
use storauth_core::{Result, SigningRequest};

use crate::constants::*;
use crate::sas::{SasResource, SasService, SasToken};

/// Shared key flavours a request can be signed with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SigningScheme {
    /// `SharedKey` for the blob, queue and file services.
    #[default]
    SharedKey,
    /// `SharedKeyLite` for the blob, queue and file services.
    SharedKeyLite,
    /// `SharedKey` for the table service.
    SharedKeyTable,
}

impl SigningScheme {
    /// Name used in the `Authorization` header.
    pub fn authorization_scheme(&self) -> &'static str {
        match self {
            SigningScheme::SharedKey | SigningScheme::SharedKeyTable => "SharedKey",
            SigningScheme::SharedKeyLite => "SharedKeyLite",
        }
    }
}

/// Construct the string to sign of a request.
///
/// `x-ms-date` must already be set when the request relies on it.
///
/// ## Format of [`SigningScheme::SharedKey`]
///
/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders + "\n" +
/// CanonicalizedResource;
/// ```
pub fn string_to_sign(
    req: &SigningRequest,
    account_name: &str,
    scheme: SigningScheme,
) -> Result<String> {
    let s = match scheme {
        SigningScheme::SharedKey => shared_key(req, account_name)?,
        SigningScheme::SharedKeyLite => shared_key_lite(req, account_name)?,
        SigningScheme::SharedKeyTable => shared_key_table(req, account_name)?,
    };

    debug!("string to sign: {s:?}");
    Ok(s)
}

fn shared_key(req: &SigningRequest, account_name: &str) -> Result<String> {
    let mut s = String::with_capacity(256);

    writeln!(&mut s, "{}", req.method.as_str())?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::CONTENT_ENCODING)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::CONTENT_LANGUAGE)?)?;
    writeln!(&mut s, "{}", content_length(req)?)?;
    writeln!(&mut s, "{}", header_or_default(req, CONTENT_MD5)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::CONTENT_TYPE)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::DATE)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::IF_MODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::IF_MATCH)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::IF_NONE_MATCH)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::IF_UNMODIFIED_SINCE)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::RANGE)?)?;
    write!(&mut s, "{}", canonicalize_header(req)?)?;
    write!(&mut s, "{}", canonicalize_resource(req, account_name))?;

    Ok(s)
}

fn shared_key_lite(req: &SigningRequest, account_name: &str) -> Result<String> {
    let mut s = String::with_capacity(128);

    writeln!(&mut s, "{}", req.method.as_str())?;
    writeln!(&mut s, "{}", header_or_default(req, CONTENT_MD5)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::CONTENT_TYPE)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::DATE)?)?;
    write!(&mut s, "{}", canonicalize_header(req)?)?;
    write!(&mut s, "{}", canonicalize_resource_comp(req, account_name))?;

    Ok(s)
}

/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// CanonicalizedResource;
/// ```
///
/// `Date` is `x-ms-date` when present.
fn shared_key_table(req: &SigningRequest, account_name: &str) -> Result<String> {
    let mut s = String::with_capacity(128);

    let date = match header_or_default(req, X_MS_DATE)? {
        "" => req.header_get_or_default(&header::DATE)?,
        v => v,
    };

    writeln!(&mut s, "{}", req.method.as_str())?;
    writeln!(&mut s, "{}", header_or_default(req, CONTENT_MD5)?)?;
    writeln!(&mut s, "{}", req.header_get_or_default(&header::CONTENT_TYPE)?)?;
    writeln!(&mut s, "{date}")?;
    write!(&mut s, "{}", canonicalize_resource_comp(req, account_name))?;

    Ok(s)
}

fn header_or_default<'a>(req: &'a SigningRequest, name: &'static str) -> Result<&'a str> {
    req.header_get_or_default(&header::HeaderName::from_static(name))
}

/// `Content-Length: 0` is signed as an empty line since `2015-02-21`.
///
/// Requests without `x-ms-version` are taken to use the pinned signing
/// version.
fn content_length(req: &SigningRequest) -> Result<&str> {
    let content_length = req.header_get_or_default(&header::CONTENT_LENGTH)?;
    if content_length != "0" {
        return Ok(content_length);
    }

    let version = match header_or_default(req, X_MS_VERSION)? {
        "" => SIGNING_VERSION,
        v => v,
    };
    if version >= EMPTY_CONTENT_LENGTH_VERSION {
        Ok("")
    } else {
        Ok(content_length)
    }
}

/// ## Reference
///
/// - [Constructing the canonicalized headers string](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
///
/// Each header line ends with `\n`; no `x-ms-*` header gives an empty string.
fn canonicalize_header(req: &SigningRequest) -> Result<String> {
    let headers = req.header_to_vec_with_prefix(X_MS_HEADER_PREFIX)?;
    if headers.is_empty() {
        return Ok(String::new());
    }

    let mut s = SigningRequest::header_to_string(headers, ":", "\n");
    s.push('\n');
    Ok(s)
}

/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
fn canonicalize_resource(req: &SigningRequest, account_name: &str) -> String {
    let mut s = format!("/{}{}", account_name.to_lowercase(), req.path);
    for (k, v) in req.query_to_sorted_groups() {
        s.push('\n');
        s.push_str(&k);
        s.push(':');
        s.push_str(&v);
    }
    s
}

/// Resource of the lite and table schemes: only `comp` is kept.
fn canonicalize_resource_comp(req: &SigningRequest, account_name: &str) -> String {
    let mut s = format!("/{}{}", account_name.to_lowercase(), req.path);
    if let Some(comp) = req.query_get("comp") {
        s.push_str("?comp=");
        s.push_str(comp);
    }
    s
}

/// Construct the string to sign of an account SAS from its fields.
///
/// ```text
/// account + "\n" + sp + "\n" + ss + "\n" + srt + "\n" + st + "\n" +
/// se + "\n" + sip + "\n" + spr + "\n" + sv + "\n"
/// ```
pub fn account_sas_string_to_sign(account_name: &str, token: &SasToken) -> String {
    let mut s = account_name.to_lowercase();
    for name in [
        SAS_PERMISSIONS,
        SAS_SERVICES,
        SAS_RESOURCE_TYPES,
        SAS_START,
        SAS_EXPIRY,
        SAS_IP,
        SAS_PROTOCOL,
        SAS_VERSION,
    ] {
        s.push('\n');
        s.push_str(token.field(name));
    }
    s.push('\n');
    s
}

/// Construct the string to sign of a service SAS from its fields.
pub fn service_sas_string_to_sign(
    account_name: &str,
    resource: &SasResource,
    token: &SasToken,
) -> String {
    let canonical_resource = resource.canonical_resource(account_name);

    let mut lines = vec![
        token.field(SAS_PERMISSIONS),
        token.field(SAS_START),
        token.field(SAS_EXPIRY),
        canonical_resource.as_str(),
        token.field(SAS_IDENTIFIER),
        token.field(SAS_IP),
        token.field(SAS_PROTOCOL),
        token.field(SAS_VERSION),
    ];

    const RESPONSE_HEADERS: [&str; 5] = [
        SAS_CACHE_CONTROL,
        SAS_CONTENT_DISPOSITION,
        SAS_CONTENT_ENCODING,
        SAS_CONTENT_LANGUAGE,
        SAS_CONTENT_TYPE,
    ];
    match resource.service() {
        SasService::Blob => {
            lines.push(token.field(SAS_RESOURCE));
            // Snapshot time, never signed by this builder.
            lines.push("");
            lines.extend(RESPONSE_HEADERS.iter().map(|name| token.field(name)));
        }
        SasService::File => {
            lines.extend(RESPONSE_HEADERS.iter().map(|name| token.field(name)));
        }
        SasService::Queue => {}
        SasService::Table => {
            lines.extend(
                [
                    SAS_START_PARTITION_KEY,
                    SAS_START_ROW_KEY,
                    SAS_END_PARTITION_KEY,
                    SAS_END_ROW_KEY,
                ]
                .iter()
                .map(|name| token.field(name)),
            );
        }
    }

    lines.join("\n")
}
