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

use std::time::Duration;

use async_trait::async_trait;
use cos_core::time::{now, DateTime};
use cos_core::{Context, Error, Result, SignRequest, SigningRequest};
use http::header::AUTHORIZATION;
use http::request::Parts;
use http::HeaderValue;
use log::debug;

use crate::canonical::Canonicalizer;
use crate::constants::*;
use crate::sign::{AuthorizationToken, SignTime, SignatureMaterial};
use crate::Credential;

/// RequestSigner that implements Tencent COS signing.
///
/// - [Tencent COS Signature](https://cloud.tencent.com/document/product/436/7778)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    canonicalizer: Canonicalizer,
    ttl: Duration,
    time: Option<DateTime>,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner {
    /// Create a new request signer for Tencent COS.
    pub fn new() -> Self {
        Self {
            canonicalizer: Canonicalizer::default(),
            ttl: DEFAULT_SIGN_TTL,
            time: None,
        }
    }

    /// Set the validity window of header signatures.
    ///
    /// Pre-signed URLs use the `expires_in` passed at signing time instead.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the headers that take part in the signature.
    pub fn with_signed_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.canonicalizer = Canonicalizer::new(headers);
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    fn build_token(
        &self,
        req: &SigningRequest,
        cred: &Credential,
        ttl: Duration,
    ) -> Result<AuthorizationToken> {
        let sign_time = SignTime::new(self.time.unwrap_or_else(now), ttl)?;
        let material =
            SignatureMaterial::derive(req, &self.canonicalizer, sign_time, &cred.secret_key)?;
        debug!(
            "signed with header list {:?} and param list {:?}",
            material.header_list(),
            material.param_list()
        );

        Ok(AuthorizationToken::new(&cred.secret_id, &material))
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::credential_invalid(
                "no valid credential found for cos signing",
            ));
        };

        let mut signing_req = SigningRequest::build(req)?;

        if let Some(expires) = expires_in {
            // Query signing
            let token = self.build_token(&signing_req, cred, expires)?;

            signing_req.query_push(URL_SIGN_PARAM, token.as_str());
            if let Some(token) = &cred.security_token {
                signing_req.query_push(X_COS_SECURITY_TOKEN, token.as_str());
            }
        } else {
            // Header signing
            let token = self.build_token(&signing_req, cred, self.ttl)?;

            signing_req
                .headers
                .insert(AUTHORIZATION, token.to_header_value()?);
            if let Some(token) = &cred.security_token {
                signing_req.headers.insert(X_COS_SECURITY_TOKEN, {
                    let mut value = HeaderValue::from_str(token)?;
                    value.set_sensitive(true);
                    value
                });
            }
        }

        signing_req.apply(req)
    }
}
