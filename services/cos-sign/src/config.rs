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

use std::fmt::{Debug, Formatter};

use cos_core::utils::Redact;
use cos_core::Context;

use crate::constants::*;

/// Config for Tencent COS services.
#[derive(Clone, Default)]
pub struct Config {
    /// Secret ID.
    pub secret_id: Option<String>,
    /// Secret Key.
    pub secret_key: Option<String>,
    /// Security token for temporary credentials.
    pub security_token: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret_id", &Redact::from(&self.secret_id))
            .field("secret_key", &Redact::from(&self.secret_key))
            .field("security_token", &Redact::from(&self.security_token))
            .finish()
    }
}

impl Config {
    /// Load config from environment variables.
    pub fn from_env(ctx: &Context) -> Self {
        Self {
            secret_id: ctx
                .env_var(TENCENTCLOUD_SECRET_ID)
                .or_else(|| ctx.env_var(TKE_SECRET_ID)),
            secret_key: ctx
                .env_var(TENCENTCLOUD_SECRET_KEY)
                .or_else(|| ctx.env_var(TKE_SECRET_KEY)),
            security_token: ctx
                .env_var(TENCENTCLOUD_TOKEN)
                .or_else(|| ctx.env_var(TENCENTCLOUD_SECURITY_TOKEN))
                .or_else(|| ctx.env_var(QCLOUD_SECRET_TOKEN)),
        }
    }

    /// Set the secret id.
    pub fn with_secret_id(mut self, secret_id: impl Into<String>) -> Self {
        self.secret_id = Some(secret_id.into());
        self
    }

    /// Set the secret key.
    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set the security token.
    pub fn with_security_token(mut self, token: impl Into<String>) -> Self {
        self.security_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cos_core::StaticEnv;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_env() {
        let ctx = Context::new().with_env(StaticEnv::from_pairs([
            (TENCENTCLOUD_SECRET_ID, "id"),
            (TKE_SECRET_ID, "tke-id"),
            (TKE_SECRET_KEY, "key"),
            (QCLOUD_SECRET_TOKEN, "token"),
        ]));

        let cfg = Config::from_env(&ctx);
        assert_eq!(cfg.secret_id.as_deref(), Some("id"));
        assert_eq!(cfg.secret_key.as_deref(), Some("key"));
        assert_eq!(cfg.security_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cfg = Config::default()
            .with_secret_id("AKIDexampleexample")
            .with_secret_key("secretkeysecretkey");

        let dbg = format!("{cfg:?}");
        assert!(dbg.starts_with("Config"));
        assert!(!dbg.contains("secretkeysecretkey"));
    }
}
