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

use bytes::Bytes;
use cos_core::{Context, OsEnv, ProvideCredential, Signer};
use cos_http_send_reqwest::ReqwestHttpSend;
use cos_sign::{Credential, RequestSigner, StaticCredentialProvider};
use http::{Response, StatusCode, Uri};
use log::debug;

use crate::{ApiError, CosRequest, Result};

/// Client signs requests and sends them to COS.
///
/// It is cheap to clone and can be shared across tasks. The credential is
/// loaded once and cached until it is no longer valid.
#[derive(Debug, Clone)]
pub struct Client {
    signer: Signer<Credential>,
}

impl Client {
    /// Create a client on top of a context and a credential provider.
    pub fn new(ctx: Context, provider: impl ProvideCredential<Credential = Credential>) -> Self {
        Self {
            signer: Signer::new(ctx, provider, RequestSigner::new()),
        }
    }

    /// Create a client sending with reqwest and signing with a static key pair.
    pub fn with_credential(secret_id: &str, secret_key: &str) -> Self {
        let ctx = Context::new()
            .with_http_send(ReqwestHttpSend::default())
            .with_env(OsEnv);
        Self::new(ctx, StaticCredentialProvider::new(secret_id, secret_key))
    }

    /// Set the validity window of the `Authorization` header.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.signer = self.signer.with_builder(RequestSigner::new().with_ttl(ttl));
        self
    }

    /// Sign and send a request.
    ///
    /// Only `200`, `204` and `206` count as success. Any other status is
    /// returned as [`ApiError`].
    pub async fn send(&self, req: CosRequest) -> Result<Response<Bytes>> {
        let (mut parts, body) = req.into_http()?.into_parts();
        self.signer.sign(&mut parts, None).await?;
        debug!("sending request: {} {}", parts.method, parts.uri);

        let resp = self
            .signer
            .context()
            .http_send(http::Request::from_parts(parts, body))
            .await?;
        let status = resp.status();
        debug!("got response: {status}");

        match status {
            StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::PARTIAL_CONTENT => Ok(resp),
            _ => Err(ApiError::from_response(status, resp.headers(), resp.body()).into()),
        }
    }

    /// Build a pre-signed url for the request, valid for `expires_in`.
    ///
    /// Headers and body of the request are not part of the url.
    pub async fn presign(&self, req: CosRequest, expires_in: Duration) -> Result<Uri> {
        let (mut parts, _) = req.into_http()?.into_parts();
        self.signer.sign(&mut parts, Some(expires_in)).await?;
        Ok(parts.uri)
    }
}
