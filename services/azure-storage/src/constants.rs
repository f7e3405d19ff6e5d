use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in azure services.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const CONTENT_MD5: &str = "content-md5";
pub const X_MS_HEADER_PREFIX: &str = "x-ms-";

/// The signing protocol version every canonical string is pinned to.
pub const SIGNING_VERSION: &str = "2018-11-09";

/// Requests at or after this `x-ms-version` sign `Content-Length: 0` as an
/// empty line.
pub const EMPTY_CONTENT_LENGTH_VERSION: &str = "2015-02-21";

/// Maximum number of signed identifiers a single ACL can hold.
pub const MAX_SIGNED_IDENTIFIERS: usize = 5;
/// Maximum length of a signed identifier id.
pub const MAX_SIGNED_IDENTIFIER_LEN: usize = 64;

// Query parameters of shared access signatures.
pub const SAS_VERSION: &str = "sv";
pub const SAS_SERVICES: &str = "ss";
pub const SAS_RESOURCE_TYPES: &str = "srt";
pub const SAS_RESOURCE: &str = "sr";
pub const SAS_PERMISSIONS: &str = "sp";
pub const SAS_START: &str = "st";
pub const SAS_EXPIRY: &str = "se";
pub const SAS_IDENTIFIER: &str = "si";
pub const SAS_IP: &str = "sip";
pub const SAS_PROTOCOL: &str = "spr";
pub const SAS_TABLE_NAME: &str = "tn";
pub const SAS_START_PARTITION_KEY: &str = "spk";
pub const SAS_START_ROW_KEY: &str = "srk";
pub const SAS_END_PARTITION_KEY: &str = "epk";
pub const SAS_END_ROW_KEY: &str = "erk";
pub const SAS_CACHE_CONTROL: &str = "rscc";
pub const SAS_CONTENT_DISPOSITION: &str = "rscd";
pub const SAS_CONTENT_ENCODING: &str = "rsce";
pub const SAS_CONTENT_LANGUAGE: &str = "rscl";
pub const SAS_CONTENT_TYPE: &str = "rsct";
pub const SAS_API_VERSION: &str = "api-version";
pub const SAS_SIGNATURE: &str = "sig";

/// AsciiSet for query values of signed requests.
///
/// Everything except unreserved characters is encoded.
pub static AZURE_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
