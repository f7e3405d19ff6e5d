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

use storauth_core::{Context, ProvideCredential, Result};

use crate::Credential;

/// Provides a credential fixed at construction.
#[derive(Clone, Debug)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Provide a shared key credential.
    ///
    /// Fails if `account_key` isn't valid base64.
    pub fn new_shared_key(account_name: &str, account_key: &str) -> Result<Self> {
        Ok(Self {
            credential: Credential::with_shared_key(account_name, account_key)?,
        })
    }

    /// Provide a pre-issued SAS token.
    pub fn new_sas_token(sas_token: &str) -> Self {
        Self {
            credential: Credential::with_sas_token(sas_token),
        }
    }

    /// Provide a pre-issued bearer token that never expires.
    pub fn new_bearer_token(bearer_token: &str) -> Self {
        Self {
            credential: Credential::with_bearer_token(bearer_token, None),
        }
    }
}

impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_static_credential_provider_shared_key() {
        let provider = StaticCredentialProvider::new_shared_key("myaccount", "a2V5").unwrap();
        let cred = provider.provide_credential(&Context::new()).unwrap();

        match cred {
            Some(Credential::SharedKey {
                account_name,
                account_key,
            }) => {
                assert_eq!(account_name, "myaccount");
                assert_eq!(account_key.encoded(), "a2V5");
            }
            _ => panic!("Expected SharedKey credential"),
        }
    }

    #[test]
    fn test_static_credential_provider_sas_token() {
        let provider = StaticCredentialProvider::new_sas_token("mysastoken");
        let cred = provider.provide_credential(&Context::new()).unwrap();

        match cred {
            Some(Credential::SasToken { token }) => assert_eq!(token, "mysastoken"),
            _ => panic!("Expected SasToken credential"),
        }
    }

    #[test]
    fn test_static_credential_provider_bearer_token() {
        let provider = StaticCredentialProvider::new_bearer_token("mybearertoken");
        let cred = provider.provide_credential(&Context::new()).unwrap();

        match cred {
            Some(Credential::BearerToken { token, expires_in }) => {
                assert_eq!(token, "mybearertoken");
                assert!(expires_in.is_none());
            }
            _ => panic!("Expected BearerToken credential"),
        }
    }

    #[test]
    fn test_malformed_shared_key() {
        assert!(StaticCredentialProvider::new_shared_key("myaccount", "Buggy").is_err());
    }
}
