//! Tencent Cloud COS client.
//!
//! This crate sends signed requests to COS and decodes the answers. Signing
//! is done by [`cos_sign`], sending by any [`cos_core::HttpSend`], reqwest
//! by default.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cos_client::{Bucket, Client, ListObjectsOptions};
//!
//! #[tokio::main]
//! async fn main() -> cos_client::Result<()> {
//!     let client = Client::with_credential("your-secret-id", "your-secret-key");
//!     let bucket = Bucket::from_url(
//!         "https://bucket-1250000000.cos.ap-guangzhou.myqcloud.com",
//!         client,
//!     );
//!
//!     bucket.put_object("hello.txt", "Hello, COS!").await?;
//!     let content = bucket.get_object("hello.txt").await?;
//!     assert_eq!(content.as_ref(), b"Hello, COS!");
//!
//!     let result = bucket
//!         .list_objects(&ListObjectsOptions::default().with_prefix("hello"))
//!         .await?;
//!     for object in result.contents {
//!         println!("{} {}", object.key, object.size);
//!     }
//!
//!     bucket.delete_object("hello.txt").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Statuses other than `200`, `204` and `206` are returned as [`ApiError`],
//! decoded from the `<Error>` document COS sends back.

#![warn(missing_docs)]

mod error;
pub use error::{ApiError, Error, Result};

mod model;
pub use model::{CommonPrefix, ListObjectsResult, ObjectProperties, Owner};

mod request;
pub use request::CosRequest;

mod client;
pub use client::Client;

mod bucket;
pub use bucket::{content_type_for, Bucket, ListObjectsOptions};
