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
use http::{HeaderMap, HeaderValue, Method, Response, Uri};
use log::debug;
use mime_guess::MimeGuess;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use quick_xml::de;

use crate::{Client, CosRequest, ListObjectsResult, Result};

/// Object keys keep `/` as the path separator, everything else is encoded
/// as in the signature.
static OBJECT_KEY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Options for [`Bucket::list_objects`].
#[derive(Debug, Clone, Default)]
pub struct ListObjectsOptions {
    prefix: Option<String>,
    delimiter: Option<String>,
    marker: Option<String>,
    max_keys: Option<usize>,
}

impl ListObjectsOptions {
    /// Only list keys starting with `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Roll up keys sharing a prefix up to `delimiter`.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Start listing after `marker`.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Return at most `max_keys` keys.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = Some(max_keys);
        self
    }

    fn apply(&self, mut req: CosRequest) -> CosRequest {
        if let Some(v) = &self.prefix {
            req = req.with_param("prefix", v);
        }
        if let Some(v) = &self.delimiter {
            req = req.with_param("delimiter", v);
        }
        if let Some(v) = &self.marker {
            req = req.with_param("marker", v);
        }
        if let Some(v) = self.max_keys {
            req = req.with_param("max-keys", v.to_string());
        }
        req
    }
}

/// Guess the content type of an object from its key.
///
/// Falls back to `application/octet-stream`.
pub fn content_type_for(key: &str) -> String {
    MimeGuess::from_path(key).first_or_octet_stream().to_string()
}

/// Bucket operations on top of a [`Client`].
#[derive(Debug, Clone)]
pub struct Bucket {
    client: Client,
    url: String,
}

impl Bucket {
    /// Create a bucket from its endpoint, e.g.
    /// `https://bucket-1250000000.cos.ap-guangzhou.myqcloud.com`.
    pub fn from_url(url: &str, client: Client) -> Self {
        Self {
            client,
            url: url.trim_end_matches('/').to_string(),
        }
    }

    /// Endpoint of this bucket, without trailing `/`.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn request(&self, method: Method, key: &str) -> Result<CosRequest> {
        let key = key.strip_prefix('/').unwrap_or(key);
        let url = format!(
            "{}/{}",
            self.url,
            utf8_percent_encode(key, &OBJECT_KEY_ENCODE_SET)
        );
        Ok(CosRequest::new(method, &url)?)
    }

    /// Check if the bucket exists.
    pub async fn exists(&self) -> Result<bool> {
        let req = self.request(Method::HEAD, "/")?;
        match self.client.send(req).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// List objects of the bucket.
    pub async fn list_objects(&self, opts: &ListObjectsOptions) -> Result<ListObjectsResult> {
        let req = opts.apply(self.request(Method::GET, "/")?);
        let resp = self.client.send(req).await?;

        let body = String::from_utf8_lossy(resp.body());
        let result: ListObjectsResult = de::from_str(&body)?;
        debug!(
            "listed {} objects, truncated: {}",
            result.contents.len(),
            result.is_truncated
        );
        Ok(result)
    }

    /// Get an object and return the whole response.
    pub async fn do_get_object(&self, key: &str) -> Result<Response<Bytes>> {
        self.client.send(self.request(Method::GET, key)?).await
    }

    /// Get the content of an object.
    pub async fn get_object(&self, key: &str) -> Result<Bytes> {
        Ok(self.do_get_object(key).await?.into_body())
    }

    /// Get the metadata of an object.
    pub async fn get_object_meta(&self, key: &str) -> Result<HeaderMap> {
        let resp = self.client.send(self.request(Method::HEAD, key)?).await?;
        Ok(resp.into_parts().0.headers)
    }

    /// Upload an object. `Content-Type` is guessed from the key.
    pub async fn put_object(&self, key: &str, body: impl Into<Bytes>) -> Result<()> {
        let content_type = HeaderValue::try_from(content_type_for(key))?;
        let req = self
            .request(Method::PUT, key)?
            .with_content_type(content_type)
            .with_body(body);

        self.client.send(req).await?;
        Ok(())
    }

    /// Delete an object.
    pub async fn delete_object(&self, key: &str) -> Result<()> {
        self.client.send(self.request(Method::DELETE, key)?).await?;
        Ok(())
    }

    /// Build a pre-signed url to download an object.
    pub async fn presign_get_object(&self, key: &str, expires_in: Duration) -> Result<Uri> {
        self.client
            .presign(self.request(Method::GET, key)?, expires_in)
            .await
    }
}
