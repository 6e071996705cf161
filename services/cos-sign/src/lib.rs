//! Tencent Cloud COS signing implementation.
//!
//! ## Overview
//!
//! COS authenticates every request with an HMAC-SHA1 token that covers the
//! method, the path, the query parameters and a small set of headers within
//! a validity window. This crate implements the canonicalization and the
//! signing pipeline, and plugs them into [`cos_core::Signer`] together with
//! credential loading from config and environment variables.
//!
//! ## Quick Start
//!
//! ```no_run
//! use anyhow::Result;
//! use cos_core::{Context, OsEnv, Signer};
//! use cos_http_send_reqwest::ReqwestHttpSend;
//! use cos_sign::{DefaultCredentialProvider, RequestSigner};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let loader = DefaultCredentialProvider::default();
//!     let builder = RequestSigner::new();
//!     let signer = Signer::new(ctx, loader, builder);
//!
//!     let mut req = http::Request::get("https://bucket-1250000000.cos.ap-guangzhou.myqcloud.com/object.txt")
//!         .body(())?
//!         .into_parts()
//!         .0;
//!
//!     // Sign with the `Authorization` header.
//!     signer.sign(&mut req, None).await?;
//!     Ok(())
//! }
//! ```
//!
//! Passing `Some(duration)` as `expires_in` produces a pre-signed URL that
//! carries the token in the `sign` query parameter instead.
//!
//! ## Signing without a Signer
//!
//! ```
//! use cos_core::time::from_timestamp;
//! use cos_core::SigningRequest;
//! use cos_sign::{sign, SignTime, DEFAULT_SIGN_TTL};
//!
//! # fn main() -> cos_core::Result<()> {
//! let mut parts = http::Request::get("https://bucket.example.com/test/?prefix=/test/&max-keys=30")
//!     .body(())?
//!     .into_parts()
//!     .0;
//! let req = SigningRequest::build(&mut parts)?;
//! let sign_time = SignTime::new(from_timestamp(1500000000)?, DEFAULT_SIGN_TTL)?;
//!
//! let token = sign(&req, sign_time, "AKIDtest", "testkey")?;
//! assert!(token.as_str().ends_with("q-signature=0446cdda349028bfb9fa5e3142968f8a75186062"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Credential Sources
//!
//! ```bash
//! export TENCENTCLOUD_SECRET_ID=your-secret-id
//! export TENCENTCLOUD_SECRET_KEY=your-secret-key
//! export TENCENTCLOUD_TOKEN=your-sts-token  # Optional
//! ```
//!
//! The `TKE_*` variants are read as well.

#![warn(missing_docs)]

mod constants;
pub use constants::{COS_URI_ENCODE_SET, DEFAULT_SIGN_TTL, SIGNED_HEADERS, URL_SIGN_PARAM};

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod canonical;
pub use canonical::{CanonicalPairs, Canonicalizer, FormatString};

mod sign;
pub use sign::{
    build_string_to_sign, derive_sign_key, derive_signature, sign, AuthorizationToken, SignTime,
    SignatureMaterial,
};

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::*;
