use log::debug;
use storauth_core::time::format_iso8601;
use storauth_core::{Error, Result};

use super::{AccessPolicy, SasResource, SasService, SasToken};
use crate::canonical::service_sas_string_to_sign;
use crate::constants::*;
use crate::AccountKey;

/// Partition and row key bounds of a table SAS.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableRange {
    /// Smallest accessible partition key.
    pub start_partition_key: Option<String>,
    /// Smallest accessible row key within `start_partition_key`.
    pub start_row_key: Option<String>,
    /// Largest accessible partition key.
    pub end_partition_key: Option<String>,
    /// Largest accessible row key within `end_partition_key`.
    pub end_row_key: Option<String>,
}

/// Response header overrides a blob or file SAS can carry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    /// `Cache-Control`
    pub cache_control: Option<String>,
    /// `Content-Disposition`
    pub content_disposition: Option<String>,
    /// `Content-Encoding`
    pub content_encoding: Option<String>,
    /// `Content-Language`
    pub content_language: Option<String>,
    /// `Content-Type`
    pub content_type: Option<String>,
}

impl ResponseHeaders {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Builder of a service SAS scoped to one resource.
#[derive(Clone, Debug)]
pub struct ServiceSas {
    account_name: String,
    key: AccountKey,
    resource: SasResource,
    policy: AccessPolicy,
    table_range: TableRange,
    response_headers: ResponseHeaders,
    version: String,
}

impl ServiceSas {
    /// Create a builder for `resource` in `account_name`, signed with `key`.
    pub fn new(
        account_name: impl Into<String>,
        key: AccountKey,
        resource: SasResource,
        policy: AccessPolicy,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            key,
            resource,
            policy,
            table_range: TableRange::default(),
            response_headers: ResponseHeaders::default(),
            version: SIGNING_VERSION.to_string(),
        }
    }

    /// Override the signing version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Narrow a table SAS to a key range.
    pub fn with_table_range(mut self, range: TableRange) -> Self {
        self.table_range = range;
        self
    }

    /// Override response headers of a blob or file SAS.
    pub fn with_response_headers(mut self, headers: ResponseHeaders) -> Self {
        self.response_headers = headers;
        self
    }

    /// Check the policy can produce a token for this resource.
    pub fn validate(&self) -> Result<()> {
        let policy = &self.policy;
        policy.check_identifier()?;
        policy.check_window()?;

        if policy.identifier.is_none() {
            if policy.expiry.is_none() {
                return Err(Error::signature_input(
                    "service sas without signed identifier requires expiry",
                ));
            }
            if policy.permissions.is_empty() {
                return Err(Error::signature_input(
                    "service sas without signed identifier requires permissions",
                ));
            }
        }

        let service = self.resource.service();
        if self.table_range != TableRange::default() && service != SasService::Table {
            return Err(Error::signature_input(
                "key range is only valid for table sas",
            ));
        }
        if !self.response_headers.is_empty()
            && !matches!(service, SasService::Blob | SasService::File)
        {
            return Err(Error::signature_input(
                "response headers are only valid for blob and file sas",
            ));
        }

        policy
            .permissions
            .to_sas_string(self.resource.permission_order())
            .map(|_| ())
    }

    fn unsigned_token(&self) -> Result<SasToken> {
        self.validate()?;

        let policy = &self.policy;
        let mut token = SasToken::default();
        token.push(SAS_VERSION, self.version.as_str());
        if let Some(sr) = self.resource.signed_resource() {
            token.push(SAS_RESOURCE, sr);
        }
        if let SasResource::Table { table } = &self.resource {
            token.push(SAS_TABLE_NAME, table.as_str());
        }
        token.push(
            SAS_PERMISSIONS,
            policy
                .permissions
                .to_sas_string(self.resource.permission_order())?,
        );
        token.push(SAS_START, policy.start.map(format_iso8601).unwrap_or_default());
        token.push(SAS_EXPIRY, policy.expiry.map(format_iso8601).unwrap_or_default());
        token.push(SAS_IDENTIFIER, policy.identifier.clone().unwrap_or_default());
        token.push(SAS_IP, policy.ip_range.clone().unwrap_or_default());
        token.push(
            SAS_PROTOCOL,
            policy.protocol.map(|v| v.to_string()).unwrap_or_default(),
        );

        let range = &self.table_range;
        for (name, value) in [
            (SAS_START_PARTITION_KEY, &range.start_partition_key),
            (SAS_START_ROW_KEY, &range.start_row_key),
            (SAS_END_PARTITION_KEY, &range.end_partition_key),
            (SAS_END_ROW_KEY, &range.end_row_key),
        ] {
            token.push(name, value.clone().unwrap_or_default());
        }

        let headers = &self.response_headers;
        for (name, value) in [
            (SAS_CACHE_CONTROL, &headers.cache_control),
            (SAS_CONTENT_DISPOSITION, &headers.content_disposition),
            (SAS_CONTENT_ENCODING, &headers.content_encoding),
            (SAS_CONTENT_LANGUAGE, &headers.content_language),
            (SAS_CONTENT_TYPE, &headers.content_type),
        ] {
            token.push(name, value.clone().unwrap_or_default());
        }

        token.push(SAS_API_VERSION, self.version.as_str());
        Ok(token)
    }

    /// Build the canonical string the signature covers.
    pub fn string_to_sign(&self) -> Result<String> {
        let token = self.unsigned_token()?;
        Ok(service_sas_string_to_sign(
            &self.account_name,
            &self.resource,
            &token,
        ))
    }

    /// Build and sign the token.
    pub fn token(&self) -> Result<SasToken> {
        let mut token = self.unsigned_token()?;
        let string_to_sign = service_sas_string_to_sign(&self.account_name, &self.resource, &token);
        debug!("service sas string to sign: {string_to_sign:?}");

        token.push(SAS_SIGNATURE, self.key.sign(&string_to_sign));
        Ok(token)
    }
}
