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

use crate::{Config, Credential};
use async_trait::async_trait;
use cos_core::{Context, ProvideCredential, ProvideCredentialChain, Result};
use std::sync::Arc;

/// Default loader for Tencent COS.
///
/// This loader will try to load credentials in the following order:
/// 1. From static configuration
/// 2. From environment variables
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl DefaultCredentialProvider {
    /// Create a new DefaultCredentialProvider
    pub fn new(config: Config) -> Self {
        let chain = ProvideCredentialChain::new()
            .push(super::ConfigCredentialProvider::new(Arc::new(config)))
            .push(super::EnvCredentialProvider::new());

        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use cos_core::StaticEnv;

    #[tokio::test]
    async fn test_default_from_config() -> anyhow::Result<()> {
        let provider = DefaultCredentialProvider::new(
            Config::default().with_secret_id("id").with_secret_key("key"),
        );

        let cred = provider
            .provide_credential(&Context::new())
            .await?
            .expect("credential must be loaded");
        assert_eq!(cred.secret_id, "id");
        assert_eq!(cred.secret_key, "key");
        Ok(())
    }

    #[tokio::test]
    async fn test_default_from_env() -> anyhow::Result<()> {
        let ctx = Context::new().with_env(StaticEnv::from_pairs([
            (TKE_SECRET_ID, "tke_id"),
            (TKE_SECRET_KEY, "tke_key"),
        ]));

        let cred = DefaultCredentialProvider::default()
            .provide_credential(&ctx)
            .await?
            .expect("credential must be loaded");
        assert_eq!(cred.secret_id, "tke_id");
        Ok(())
    }

    #[tokio::test]
    async fn test_default_nothing_found() -> anyhow::Result<()> {
        let cred = DefaultCredentialProvider::default()
            .provide_credential(&Context::new())
            .await?;
        assert!(cred.is_none());
        Ok(())
    }
}
