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

//! The COS signing pipeline.
//!
//! Every step takes the output of the previous one and returns a new value:
//!
//! ```text
//! SignTime ─┬─────────────────────────────► sign_key = HMAC-SHA1(secret_key, key_time)
//!           │                                        │
//! request ──┴► format_string ─► string_to_sign ──────┴► signature = HMAC-SHA1(sign_key, string_to_sign)
//! ```

use std::fmt;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

use cos_core::hash::{hex_hmac_sha1, hex_sha1};
use cos_core::time::DateTime;
use cos_core::utils::Redact;
use cos_core::{Error, Result, SigningRequest};
use http::HeaderValue;
use log::debug;

use crate::canonical::Canonicalizer;
use crate::constants::*;

/// SignTime is the validity window `[start, end]` of a signature, in unix seconds.
///
/// It is captured once per request and rendered as `start;end` for both
/// `q-sign-time` and `q-key-time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignTime {
    start: i64,
    end: i64,
}

impl SignTime {
    /// Create a window starting at `now` and lasting `ttl`.
    pub fn new(now: DateTime, ttl: Duration) -> Result<Self> {
        let start = now.timestamp();
        let end = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|ttl| start.checked_add(ttl))
            .ok_or_else(|| Error::request_invalid(format!("sign ttl {ttl:?} is too large")))?;

        Ok(Self { start, end })
    }

    /// Create a window from raw unix timestamps.
    pub fn from_timestamps(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Start of the window.
    pub fn start(&self) -> i64 {
        self.start
    }

    /// End of the window.
    pub fn end(&self) -> i64 {
        self.end
    }
}

impl fmt::Display for SignTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.start, self.end)
    }
}

/// Derive the time scoped signing key: `hex(HMAC-SHA1(secret_key, key_time))`.
pub fn derive_sign_key(secret_key: &str, key_time: &str) -> String {
    hex_hmac_sha1(secret_key.as_bytes(), key_time.as_bytes())
}

/// Build the string to sign: `sha1\n{sign_time}\n{hex(SHA1(format_string))}\n`.
pub fn build_string_to_sign(sign_time: &str, format_string: &str) -> String {
    let mut s = String::with_capacity(SIGN_ALGORITHM.len() + sign_time.len() + 43);
    s.push_str(SIGN_ALGORITHM);
    s.push('\n');
    s.push_str(sign_time);
    s.push('\n');
    s.push_str(&hex_sha1(format_string.as_bytes()));
    s.push('\n');
    s
}

/// Derive the signature: `hex(HMAC-SHA1(sign_key, string_to_sign))`.
pub fn derive_signature(sign_key: &str, string_to_sign: &str) -> String {
    hex_hmac_sha1(sign_key.as_bytes(), string_to_sign.as_bytes())
}

/// Everything derived while signing one request.
///
/// The secret key itself is never stored here, only the time scoped key
/// derived from it.
#[derive(Clone, PartialEq, Eq)]
pub struct SignatureMaterial {
    sign_time: String,
    key_time: String,
    sign_key: String,
    format_string: String,
    string_to_sign: String,
    signature: String,
    header_list: String,
    param_list: String,
}

impl SignatureMaterial {
    /// Run the signing pipeline for `req`.
    ///
    /// Canonicalization happens first so that an unsignable request fails
    /// before any HMAC is computed.
    pub fn derive(
        req: &SigningRequest,
        canonicalizer: &Canonicalizer,
        sign_time: SignTime,
        secret_key: &str,
    ) -> Result<Self> {
        let format_string = canonicalizer.format_string(req)?;

        let sign_time = sign_time.to_string();
        let key_time = sign_time.clone();
        let sign_key = derive_sign_key(secret_key, &key_time);
        let string_to_sign = build_string_to_sign(&sign_time, format_string.as_str());
        debug!("string to sign: {string_to_sign:?}");
        let signature = derive_signature(&sign_key, &string_to_sign);

        Ok(Self {
            header_list: format_string.header_list().to_string(),
            param_list: format_string.param_list().to_string(),
            format_string: format_string.as_str().to_string(),
            sign_time,
            key_time,
            sign_key,
            string_to_sign,
            signature,
        })
    }

    /// `start;end` of the signature.
    pub fn sign_time(&self) -> &str {
        &self.sign_time
    }

    /// `start;end` of the signing key, always equal to [`Self::sign_time`].
    pub fn key_time(&self) -> &str {
        &self.key_time
    }

    /// Hex encoded time scoped signing key.
    pub fn sign_key(&self) -> &str {
        &self.sign_key
    }

    /// Canonical request block.
    pub fn format_string(&self) -> &str {
        &self.format_string
    }

    /// String that has been signed.
    pub fn string_to_sign(&self) -> &str {
        &self.string_to_sign
    }

    /// Hex encoded signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Sorted, `;` joined names of the signed headers.
    pub fn header_list(&self) -> &str {
        &self.header_list
    }

    /// Sorted, `;` joined names of the signed query parameters.
    pub fn param_list(&self) -> &str {
        &self.param_list
    }
}

impl Debug for SignatureMaterial {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureMaterial")
            .field("sign_time", &self.sign_time)
            .field("key_time", &self.key_time)
            .field("sign_key", &Redact::from(&self.sign_key))
            .field("format_string", &self.format_string)
            .field("string_to_sign", &self.string_to_sign)
            .field("signature", &self.signature)
            .field("header_list", &self.header_list)
            .field("param_list", &self.param_list)
            .finish()
    }
}

/// The `Authorization` value of a signed COS request.
///
/// ```text
/// q-sign-algorithm=sha1&q-ak={secret_id}&q-sign-time={t}&q-key-time={t}
///     &q-header-list={headers}&q-url-param-list={params}&q-signature={signature}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationToken {
    pairs: [(&'static str, String); 7],
    value: String,
}

impl AuthorizationToken {
    /// Assemble the token from derived material.
    pub fn new(secret_id: &str, material: &SignatureMaterial) -> Self {
        let pairs = [
            (Q_SIGN_ALGORITHM, SIGN_ALGORITHM.to_string()),
            (Q_AK, secret_id.to_string()),
            (Q_SIGN_TIME, material.sign_time.clone()),
            (Q_KEY_TIME, material.key_time.clone()),
            (Q_HEADER_LIST, material.header_list.clone()),
            (Q_URL_PARAM_LIST, material.param_list.clone()),
            (Q_SIGNATURE, material.signature.clone()),
        ];
        let value = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        Self { pairs, value }
    }

    /// Rendered token.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Token fields in their fixed order.
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.pairs
    }

    /// Convert into a sensitive header value.
    pub fn to_header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&self.value)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for AuthorizationToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Sign `req` with the default signed header set.
///
/// This is a pure function: the same request, window and secrets always
/// produce the same token.
pub fn sign(
    req: &SigningRequest,
    sign_time: SignTime,
    secret_id: &str,
    secret_key: &str,
) -> Result<AuthorizationToken> {
    let material = SignatureMaterial::derive(req, &Canonicalizer::default(), sign_time, secret_key)?;
    Ok(AuthorizationToken::new(secret_id, &material))
}
