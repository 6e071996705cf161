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

use bytes::Bytes;
use cos_core::{Error, Result};
use cos_sign::COS_URI_ENCODE_SET;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use percent_encoding::utf8_percent_encode;

/// A request to COS before it is signed.
///
/// The url is parsed on construction, so a malformed url fails before any
/// signing work happens.
#[derive(Debug, Clone)]
pub struct CosRequest {
    method: Method,
    uri: Uri,
    params: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
}

impl CosRequest {
    /// Create a new request against an absolute url.
    pub fn new(method: Method, url: &str) -> Result<Self> {
        let uri: Uri = url.parse()?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(Error::request_invalid(format!("url {url} must be absolute")));
        }

        Ok(Self {
            method,
            uri,
            params: Vec::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        })
    }

    /// Add a query parameter. The value is percent encoded when sent.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the `Content-Type` header.
    pub fn with_content_type(self, content_type: HeaderValue) -> Self {
        self.with_header(CONTENT_TYPE, content_type)
    }

    /// Set the payload.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Method of this request.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Url of this request, without the extra params.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Build the http request that will be signed and sent.
    ///
    /// Extra params are appended to the query of the url, so the signer
    /// sees exactly what goes over the wire.
    pub fn into_http(self) -> Result<http::Request<Bytes>> {
        let uri = if self.params.is_empty() {
            self.uri
        } else {
            let mut parts = self.uri.into_parts();
            let mut paq = parts
                .path_and_query
                .as_ref()
                .map(|v| v.as_str().to_string())
                .unwrap_or_default();
            if !paq.starts_with('/') {
                paq.insert(0, '/');
            }
            let mut sep = if paq.contains('?') { '&' } else { '?' };
            for (k, v) in &self.params {
                paq.push(sep);
                paq.extend(utf8_percent_encode(k, &COS_URI_ENCODE_SET));
                paq.push('=');
                paq.extend(utf8_percent_encode(v, &COS_URI_ENCODE_SET));
                sep = '&';
            }
            parts.path_and_query = Some(paq.parse()?);
            Uri::from_parts(parts)?
        };

        let mut req = http::Request::builder()
            .method(self.method)
            .uri(uri)
            .body(self.body)?;
        *req.headers_mut() = self.headers;
        Ok(req)
    }
}
