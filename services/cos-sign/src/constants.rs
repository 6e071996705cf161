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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

// Env values used in COS signing.
pub const TENCENTCLOUD_SECRET_ID: &str = "TENCENTCLOUD_SECRET_ID";
pub const TKE_SECRET_ID: &str = "TKE_SECRET_ID";
pub const TENCENTCLOUD_SECRET_KEY: &str = "TENCENTCLOUD_SECRET_KEY";
pub const TKE_SECRET_KEY: &str = "TKE_SECRET_KEY";
pub const TENCENTCLOUD_TOKEN: &str = "TENCENTCLOUD_TOKEN";
pub const TENCENTCLOUD_SECURITY_TOKEN: &str = "TENCENTCLOUD_SECURITY_TOKEN";
pub const QCLOUD_SECRET_TOKEN: &str = "QCLOUD_SECRET_TOKEN";

// Headers used in COS signing.
pub const X_COS_SECURITY_TOKEN: &str = "x-cos-security-token";

/// Algorithm used for both the digest and the `q-sign-algorithm` field.
pub const SIGN_ALGORITHM: &str = "sha1";

// Keys of the authorization token, in their fixed order.
pub const Q_SIGN_ALGORITHM: &str = "q-sign-algorithm";
pub const Q_AK: &str = "q-ak";
pub const Q_SIGN_TIME: &str = "q-sign-time";
pub const Q_KEY_TIME: &str = "q-key-time";
pub const Q_HEADER_LIST: &str = "q-header-list";
pub const Q_URL_PARAM_LIST: &str = "q-url-param-list";
pub const Q_SIGNATURE: &str = "q-signature";

/// Query parameter carrying the whole token in a pre-signed URL.
pub const URL_SIGN_PARAM: &str = "sign";

/// Default validity window of a signature.
pub const DEFAULT_SIGN_TTL: Duration = Duration::from_secs(86400);

/// Headers that take part in the signature unless configured otherwise.
pub const SIGNED_HEADERS: &[&str] = &["host"];

/// AsciiSet for [Tencent UriEncode](https://cloud.tencent.com/document/product/436/7778)
///
/// Everything except `A-Z a-z 0-9 - _ . ~` is escaped, space included, so a
/// space always ends up as `%20` and never as `+`.
pub static COS_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');
