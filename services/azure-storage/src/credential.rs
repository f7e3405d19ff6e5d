// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::AccountKey;
use storauth_core::time::{now, DateTime};
use storauth_core::utils::Redact;
use storauth_core::{Result, SigningCredential};
use std::fmt::{Debug, Formatter};

/// Credential enum for the supported authentication methods.
#[derive(Clone)]
pub enum Credential {
    /// Shared Key authentication with account name and key
    SharedKey {
        /// Storage account name.
        account_name: String,
        /// Decoded storage account key.
        account_key: AccountKey,
    },
    /// Pre-issued SAS (Shared Access Signature) token
    SasToken {
        /// SAS token, already url encoded.
        token: String,
    },
    /// Pre-issued bearer token
    BearerToken {
        /// Bearer token.
        token: String,
        /// Expiration time for this credential.
        expires_in: Option<DateTime>,
    },
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::SharedKey {
                account_name,
                account_key,
            } => f
                .debug_struct("Credential::SharedKey")
                .field("account_name", account_name)
                .field("account_key", account_key)
                .finish(),
            Credential::SasToken { token } => f
                .debug_struct("Credential::SasToken")
                .field("token", &Redact::from(token))
                .finish(),
            Credential::BearerToken { token, expires_in } => f
                .debug_struct("Credential::BearerToken")
                .field("token", &Redact::from(token))
                .field("expires_in", expires_in)
                .finish(),
        }
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        match self {
            Credential::SharedKey {
                account_name,
                account_key,
            } => !account_name.is_empty() && !account_key.is_empty(),
            Credential::SasToken { token } => !token.is_empty(),
            Credential::BearerToken { token, expires_in } => {
                if token.is_empty() {
                    return false;
                }
                // Take 20s as buffer so a token doesn't expire in flight.
                match expires_in {
                    Some(expires) => *expires > now() + chrono::TimeDelta::seconds(20),
                    None => true,
                }
            }
        }
    }
}

impl Credential {
    /// Create a new credential with shared key authentication.
    ///
    /// Fails with [`storauth_core::ErrorKind::MalformedKey`] when
    /// `account_key` isn't valid base64.
    pub fn with_shared_key(account_name: &str, account_key: &str) -> Result<Self> {
        Ok(Self::SharedKey {
            account_name: account_name.to_string(),
            account_key: AccountKey::new(account_key)?,
        })
    }

    /// Create a new credential with SAS token authentication.
    ///
    /// A leading `?` is stripped.
    pub fn with_sas_token(sas_token: &str) -> Self {
        Self::SasToken {
            token: sas_token.trim_start_matches('?').to_string(),
        }
    }

    /// Create a new credential with bearer token authentication.
    pub fn with_bearer_token(bearer_token: &str, expires_in: Option<DateTime>) -> Self {
        Self::BearerToken {
            token: bearer_token.to_string(),
            expires_in,
        }
    }
}
