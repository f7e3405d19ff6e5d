use log::debug;
use storauth_core::time::format_iso8601;
use storauth_core::{Error, Result};

use super::{AccessPolicy, ResourceTypes, SasToken, Services};
use crate::canonical::account_sas_string_to_sign;
use crate::constants::*;
use crate::AccountKey;

/// Builder of an account SAS.
///
/// An account SAS delegates access to one or more services of the storage
/// account, including service level operations a service SAS can't grant.
#[derive(Clone, Debug)]
pub struct AccountSas {
    account_name: String,
    key: AccountKey,
    policy: AccessPolicy,
    services: Services,
    resource_types: ResourceTypes,
    version: String,
}

impl AccountSas {
    /// Create a builder for `account_name` signed with `key`.
    ///
    /// Covers every service and resource type until narrowed.
    pub fn new(account_name: impl Into<String>, key: AccountKey, policy: AccessPolicy) -> Self {
        Self {
            account_name: account_name.into(),
            key,
            policy,
            services: Services::all(),
            resource_types: ResourceTypes::all(),
            version: SIGNING_VERSION.to_string(),
        }
    }

    /// Restrict the services the token covers.
    pub fn services(mut self, services: Services) -> Self {
        self.services = services;
        self
    }

    /// Restrict the resource types the token covers.
    pub fn resource_types(mut self, resource_types: ResourceTypes) -> Self {
        self.resource_types = resource_types;
        self
    }

    /// Override the signing version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Check the policy can produce a token.
    pub fn validate(&self) -> Result<()> {
        if self.policy.start.is_none() || self.policy.expiry.is_none() {
            return Err(Error::signature_input(
                "account sas requires both start and expiry",
            ));
        }
        self.policy.check_window()?;
        if self.policy.identifier.is_some() {
            return Err(Error::signature_input(
                "account sas can't reference a signed identifier",
            ));
        }
        if self.policy.permissions.is_empty() {
            return Err(Error::signature_input("account sas requires permissions"));
        }
        if self.services.is_empty() {
            return Err(Error::signature_input("account sas requires services"));
        }
        if self.resource_types.is_empty() {
            return Err(Error::signature_input(
                "account sas requires resource types",
            ));
        }
        Ok(())
    }

    fn unsigned_token(&self) -> Result<SasToken> {
        self.validate()?;

        let policy = &self.policy;
        let mut token = SasToken::default();
        token.push(SAS_VERSION, self.version.as_str());
        token.push(SAS_SERVICES, self.services.to_string());
        token.push(SAS_RESOURCE_TYPES, self.resource_types.to_string());
        token.push(
            SAS_PERMISSIONS,
            policy.permissions.to_sas_string(ACCOUNT_PERMISSION_ORDER)?,
        );
        token.push(SAS_START, policy.start.map(format_iso8601).unwrap_or_default());
        token.push(SAS_EXPIRY, policy.expiry.map(format_iso8601).unwrap_or_default());
        token.push(SAS_IP, policy.ip_range.clone().unwrap_or_default());
        token.push(
            SAS_PROTOCOL,
            policy.protocol.map(|v| v.to_string()).unwrap_or_default(),
        );
        Ok(token)
    }

    /// Build the canonical string the signature covers.
    pub fn string_to_sign(&self) -> Result<String> {
        let token = self.unsigned_token()?;
        Ok(account_sas_string_to_sign(&self.account_name, &token))
    }

    /// Build and sign the token.
    pub fn token(&self) -> Result<SasToken> {
        let mut token = self.unsigned_token()?;
        let string_to_sign = account_sas_string_to_sign(&self.account_name, &token);
        debug!("account sas string to sign: {string_to_sign:?}");

        token.push(SAS_SIGNATURE, self.key.sign(&string_to_sign));
        Ok(token)
    }
}

/// Canonical permission order of an account SAS.
const ACCOUNT_PERMISSION_ORDER: &str = "racwdlup";
