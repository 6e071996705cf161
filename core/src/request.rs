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

use std::borrow::Cow;
use std::mem;
use std::str::FromStr;

use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;
use percent_encoding::percent_decode_str;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

use crate::{Error, Result};

/// Bytes allowed to appear unescaped in a query component written by [`SigningRequest::apply`].
static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Signing context for request.
///
/// Query pairs are kept percent decoded so that signers can apply their own
/// canonical encoding. They are encoded again when written back by [`SigningRequest::apply`].
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, as sent on the wire.
    pub path: String,
    /// HTTP query parameters, percent decoded.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    ///
    /// Returns a `RequestInvalid` error if the uri carries no authority, or if
    /// its path or query does not percent decode to valid UTF-8.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        // A rejected request keeps its uri.
        decode_utf8(parts.uri.path(), "path")?;
        // `&`, `=` and `+` are ASCII, so a valid whole query means valid pairs.
        if let Some(query) = parts.uri.query() {
            decode_utf8(query, "query")?;
        }

        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let mut paq = self.path;
                if !self.query.is_empty() {
                    paq.push('?');
                    paq.push_str(&Self::query_to_encoded_string(&self.query));
                }

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get the path percent decoded.
    ///
    /// Returns a `RequestInvalid` error if the decoded bytes are not valid UTF-8.
    pub fn path_percent_decoded(&self) -> Result<Cow<'_, str>> {
        decode_utf8(&self.path, "path")
    }

    /// Push a new query pair into query list.
    ///
    /// Both key and value are expected to be percent decoded.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Encode query pairs in their current order.
    ///
    /// ```shell
    /// [(a, b c), (d, "")] => "a=b%20c&d"
    /// ```
    pub fn query_to_encoded_string(query: &[(String, String)]) -> String {
        let mut s = String::with_capacity(16);

        for (idx, (k, v)) in query.iter().enumerate() {
            if idx != 0 {
                s.push('&');
            }

            s.extend(utf8_percent_encode(k, &QUERY_ENCODE_SET));
            if !v.is_empty() {
                s.push('=');
                s.extend(utf8_percent_encode(v, &QUERY_ENCODE_SET));
            }
        }

        s
    }
}

fn decode_utf8<'a>(v: &'a str, part: &str) -> Result<Cow<'a, str>> {
    percent_decode_str(v).decode_utf8().map_err(|e| {
        Error::request_invalid(format!("request {part} is not valid percent encoded UTF-8"))
            .with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn parts(uri: &str) -> http::request::Parts {
        http::Request::get(uri)
            .header("x-cos-meta-tag", "  value  ")
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0
    }

    #[test]
    fn test_build() -> Result<()> {
        let mut parts = parts("https://bucket.example.com/test/?prefix=/test/&max-keys=30&acl");
        let req = SigningRequest::build(&mut parts)?;

        assert_eq!(req.method, Method::GET);
        assert_eq!(req.scheme, Scheme::HTTPS);
        assert_eq!(req.authority.as_str(), "bucket.example.com");
        assert_eq!(req.path, "/test/");
        assert_eq!(
            req.query,
            vec![
                ("prefix".to_string(), "/test/".to_string()),
                ("max-keys".to_string(), "30".to_string()),
                ("acl".to_string(), "".to_string()),
            ]
        );
        assert_eq!(req.headers["x-cos-meta-tag"], "  value  ");
        assert!(req.headers.get(http::header::HOST).is_none());
        // Headers are moved out of the parts.
        assert!(parts.headers.is_empty());
        Ok(())
    }

    #[test]
    fn test_build_without_authority() {
        let mut parts = parts("/relative/path");
        let err = SigningRequest::build(&mut parts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test_case("https://bucket.example.com/obj?versionId=%FF%FE&x=1"; "query value")]
    #[test_case("https://bucket.example.com/obj?%FF=1"; "query key")]
    #[test_case("https://bucket.example.com/%FF.txt"; "path segment")]
    fn test_build_rejects_invalid_utf8(uri: &str) {
        let mut parts = parts(uri);
        let err = SigningRequest::build(&mut parts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
        assert_eq!(parts.uri.to_string(), uri);
        assert_eq!(parts.headers["x-cos-meta-tag"], "  value  ");
    }

    #[test]
    fn test_path_percent_decoded_rejects_invalid_utf8() {
        let req = SigningRequest {
            method: Method::GET,
            scheme: Scheme::HTTPS,
            authority: Authority::from_static("bucket.example.com"),
            path: "/%FF%FE".to_string(),
            query: vec![],
            headers: HeaderMap::new(),
        };
        let err = req.path_percent_decoded().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_apply_round_trip() -> Result<()> {
        let mut parts = parts("https://bucket.example.com/%E4%BD%A0%E5%A5%BD.txt?a=b+c&acl");
        let mut req = SigningRequest::build(&mut parts)?;
        assert_eq!(req.path_percent_decoded()?, "/你好.txt");

        req.query_push("q-sign-time", "1500000000;1500086400");
        req.apply(&mut parts)?;

        assert_eq!(
            parts.uri.to_string(),
            "https://bucket.example.com/%E4%BD%A0%E5%A5%BD.txt?a=b%20c&acl&q-sign-time=1500000000%3B1500086400"
        );
        assert_eq!(parts.headers["x-cos-meta-tag"], "  value  ");
        Ok(())
    }
}
