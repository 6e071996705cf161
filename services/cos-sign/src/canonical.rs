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

//! Canonicalization of a request into the byte strings COS signs.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write;

use cos_core::{Result, SigningRequest};
use log::debug;
use percent_encoding::utf8_percent_encode;

use crate::constants::{COS_URI_ENCODE_SET, SIGNED_HEADERS};

/// Canonical `key=value` groups of one request component, sorted by key.
///
/// The key list reported in the token (`q-url-param-list` and
/// `q-header-list`) is read from the same groups that are rendered into
/// the format string, so the two cannot disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalPairs {
    groups: BTreeMap<String, String>,
}

impl CanonicalPairs {
    /// Names that take part in this component, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Names joined by `;`, as used by `q-url-param-list` and `q-header-list`.
    pub fn name_list(&self) -> String {
        self.names().collect::<Vec<_>>().join(";")
    }

    /// Returns true if nothing takes part in this component.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl fmt::Display for CanonicalPairs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, entry) in self.groups.values().enumerate() {
            if idx != 0 {
                f.write_char('&')?;
            }
            f.write_str(entry)?;
        }
        Ok(())
    }
}

/// The canonical request block hashed into the string to sign.
///
/// ```text
/// lower(method) + "\n" +
/// canonical uri + "\n" +
/// canonical query + "\n" +
/// canonical headers + "\n"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatString {
    value: String,
    header_list: String,
    param_list: String,
}

impl FormatString {
    /// The format string itself.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Sorted, `;` joined names of the headers that were signed.
    pub fn header_list(&self) -> &str {
        &self.header_list
    }

    /// Sorted, `;` joined names of the query parameters that were signed.
    pub fn param_list(&self) -> &str {
        &self.param_list
    }
}

/// Canonicalizer turns a [`SigningRequest`] into the canonical strings of
/// the [COS signature](https://cloud.tencent.com/document/product/436/7778).
///
/// Only the configured signed headers take part in the signature. The
/// default set is [`SIGNED_HEADERS`].
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    signed_headers: Vec<String>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(SIGNED_HEADERS)
    }
}

impl Canonicalizer {
    /// Create a canonicalizer signing the given headers.
    ///
    /// Header names are compared case-insensitively.
    pub fn new<I, S>(signed_headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut signed_headers: Vec<String> = signed_headers
            .into_iter()
            .map(|v| v.as_ref().to_ascii_lowercase())
            .collect();
        signed_headers.sort();
        signed_headers.dedup();

        Self { signed_headers }
    }

    /// Lower-cased names of the headers this canonicalizer signs.
    pub fn signed_headers(&self) -> &[String] {
        &self.signed_headers
    }

    /// Percent decoded request path, `/` if empty.
    pub fn canonical_uri<'a>(&self, req: &'a SigningRequest) -> Result<Cow<'a, str>> {
        let path = req.path_percent_decoded()?;
        if path.is_empty() {
            Ok(Cow::Borrowed("/"))
        } else {
            Ok(path)
        }
    }

    /// Canonical query string.
    ///
    /// Keys are lower-cased and encoded, values are encoded, repeated keys
    /// keep their values in request order.
    pub fn canonical_query(&self, req: &SigningRequest) -> CanonicalPairs {
        let mut groups: BTreeMap<String, String> = BTreeMap::new();

        for (k, v) in &req.query {
            let key = uri_encode(&k.to_lowercase()).to_lowercase();
            let entry = format!("{key}={}", uri_encode(v));

            match groups.get_mut(&key) {
                Some(group) => {
                    group.push('&');
                    group.push_str(&entry);
                }
                None => {
                    groups.insert(key, entry);
                }
            }
        }

        // Space must be `%20`, never the form encoded `+`.
        for group in groups.values_mut() {
            if group.contains('+') {
                *group = group.replace('+', "%20");
            }
        }

        CanonicalPairs { groups }
    }

    /// Canonical header string built from the signed headers present in the request.
    ///
    /// `host` falls back to the request authority when no `Host` header is set.
    pub fn canonical_headers(&self, req: &SigningRequest) -> Result<CanonicalPairs> {
        let mut groups = BTreeMap::new();

        for name in &self.signed_headers {
            let mut values = req
                .headers
                .get_all(name.as_str())
                .iter()
                .map(|v| -> Result<String> { Ok(uri_encode(v.to_str()?.trim())) })
                .collect::<Result<Vec<_>>>()?;
            if values.is_empty() && name == "host" {
                values.push(uri_encode(req.authority.as_str()));
            }
            if values.is_empty() {
                continue;
            }

            values.sort();
            groups.insert(name.clone(), format!("{name}={}", values.join(",")));
        }

        Ok(CanonicalPairs { groups })
    }

    /// Build the format string along with the name lists it was built from.
    pub fn format_string(&self, req: &SigningRequest) -> Result<FormatString> {
        let uri = self.canonical_uri(req)?;
        let query = self.canonical_query(req);
        let headers = self.canonical_headers(req)?;

        let mut value = String::new();
        writeln!(value, "{}", req.method.as_str().to_lowercase())?;
        writeln!(value, "{uri}")?;
        writeln!(value, "{query}")?;
        writeln!(value, "{headers}")?;

        let format_string = FormatString {
            value,
            header_list: headers.name_list(),
            param_list: query.name_list(),
        };
        debug!("param list: {}", format_string.param_list);
        debug!("header list: {}", format_string.header_list);
        debug!("format string: {:?}", format_string.value);

        Ok(format_string)
    }
}

fn uri_encode(v: &str) -> String {
    utf8_percent_encode(v, &COS_URI_ENCODE_SET).to_string()
}
