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

use http::{HeaderMap, StatusCode};
use quick_xml::de;
use serde::Deserialize;

/// Header carrying the request id when the body has none.
const X_COS_REQUEST_ID: &str = "x-cos-request-id";

/// Error returned by the COS service for a non-successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("COS API Error: RequestId: {request_id} Status Code: {status_code} Code: {code} Message: {message}")]
pub struct ApiError {
    /// HTTP status code, e.g. `403`.
    pub status_code: u16,
    /// COS error code, e.g. `NoSuchKey`.
    pub code: String,
    /// Human oriented message.
    pub message: String,
    /// Resource the request was made against.
    pub resource: String,
    /// Request id assigned by COS.
    pub request_id: String,
    /// Trace id assigned by COS.
    pub trace_id: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorBody {
    code: String,
    message: String,
    resource: String,
    request_id: String,
    trace_id: String,
}

impl ApiError {
    /// Build an error from a response.
    ///
    /// An empty or malformed body (HEAD responses have none) still yields an
    /// error carrying the status. An empty message falls back to the status line.
    pub fn from_response(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Self {
        let body: ErrorBody = std::str::from_utf8(body)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| de::from_str(s).ok())
            .unwrap_or_default();

        let message = if body.message.is_empty() {
            status_line(status)
        } else {
            body.message
        };
        let request_id = if body.request_id.is_empty() {
            headers
                .get(X_COS_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        } else {
            body.request_id
        };

        Self {
            status_code: status.as_u16(),
            code: body.code,
            message,
            resource: body.resource,
            request_id,
            trace_id: body.trace_id,
        }
    }

    /// Returns true if the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status_code == StatusCode::NOT_FOUND.as_u16()
    }

    /// Returns true if the request was rejected for authentication reasons.
    pub fn is_forbidden(&self) -> bool {
        self.status_code == StatusCode::FORBIDDEN.as_u16()
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

/// Error type of the COS client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Building, signing or sending the request failed.
    #[error(transparent)]
    Core(#[from] cos_core::Error),
    /// COS answered with a non-successful status.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The response body is not the expected XML document.
    #[error("failed to decode xml response")]
    Xml(#[from] de::DeError),
}

impl Error {
    /// Returns true if COS reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_not_found())
    }

    /// Returns true if COS rejected the request for authentication reasons.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_forbidden())
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Error::Core(err.into())
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Error::Core(err.into())
    }
}

/// Result type of the COS client.
pub type Result<T> = std::result::Result<T, Error>;
