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

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use cos_client::{Bucket, Client, Error, ListObjectsOptions};
use cos_core::{Context, HttpSend};
use cos_sign::{EnvCredentialProvider, StaticCredentialProvider};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use pretty_assertions::assert_eq;

/// HttpSend that records requests and answers with queued responses.
#[derive(Debug, Clone, Default)]
struct MockHttpSend {
    requests: Arc<Mutex<Vec<Request<Bytes>>>>,
    responses: Arc<Mutex<VecDeque<Response<Bytes>>>>,
}

impl MockHttpSend {
    fn respond(&self, status: StatusCode, body: &'static str) {
        let resp = Response::builder()
            .status(status)
            .header("x-cos-request-id", "mock-request-id")
            .body(Bytes::from_static(body.as_bytes()))
            .expect("response must be valid");
        self.responses.lock().unwrap().push_back(resp);
    }

    fn requests(&self) -> Vec<Request<Bytes>> {
        std::mem::take(&mut *self.requests.lock().unwrap())
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: Request<Bytes>) -> cos_core::Result<Response<Bytes>> {
        self.requests.lock().unwrap().push(req);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| cos_core::Error::unexpected("no response queued"))
    }
}

fn init() -> (MockHttpSend, Bucket) {
    let _ = env_logger::builder().is_test(true).try_init();

    let http = MockHttpSend::default();
    let ctx = Context::new().with_http_send(http.clone());
    let client = Client::new(ctx, StaticCredentialProvider::new("AKIDtest", "testkey"));
    (http, Bucket::from_url("https://bucket.example.com/", client))
}

fn authorization(req: &Request<Bytes>) -> &str {
    req.headers()
        .get(AUTHORIZATION)
        .expect("authorization must be set")
        .to_str()
        .expect("authorization must be ascii")
}

fn sign_window(auth: &str) -> (i64, i64) {
    let sign_time = auth
        .split('&')
        .find_map(|kv| kv.strip_prefix("q-sign-time="))
        .expect("q-sign-time must be set");
    let (start, end) = sign_time.split_once(';').expect("window must have two ends");
    (
        start.parse().expect("start must be a number"),
        end.parse().expect("end must be a number"),
    )
}

#[tokio::test]
async fn test_list_objects() -> Result<()> {
    let (http, bucket) = init();
    http.respond(
        StatusCode::OK,
        r#"<ListBucketResult>
  <Name>bucket</Name>
  <Prefix>test/</Prefix>
  <MaxKeys>10</MaxKeys>
  <IsTruncated>false</IsTruncated>
  <Contents>
    <Key>test/a.txt</Key>
    <LastModified>2017-06-23T12:33:27.000Z</LastModified>
    <ETag>"79f2a852fac7e826c9f4dbe037f8a63b"</ETag>
    <Size>10</Size>
    <StorageClass>STANDARD</StorageClass>
  </Contents>
</ListBucketResult>"#,
    );

    let result = bucket
        .list_objects(
            &ListObjectsOptions::default()
                .with_prefix("test/")
                .with_max_keys(10),
        )
        .await?;
    assert_eq!(result.name, "bucket");
    assert_eq!(result.contents.len(), 1);
    assert_eq!(result.contents[0].key, "test/a.txt");
    assert_eq!(result.contents[0].size, 10);

    let reqs = http.requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].method(), Method::GET);
    assert_eq!(
        reqs[0].uri().to_string(),
        "https://bucket.example.com/?prefix=test%2F&max-keys=10"
    );
    let auth = authorization(&reqs[0]);
    assert!(auth.starts_with("q-sign-algorithm=sha1&q-ak=AKIDtest&"));
    assert!(auth.contains("&q-header-list=host&q-url-param-list=max-keys;prefix&"));
    let (start, end) = sign_window(auth);
    assert_eq!(end - start, 86400);
    Ok(())
}

#[tokio::test]
async fn test_list_objects_malformed_body() -> Result<()> {
    let (http, bucket) = init();
    http.respond(
        StatusCode::OK,
        "<ListBucketResult><MaxKeys>many</MaxKeys></ListBucketResult>",
    );

    let err = bucket
        .list_objects(&ListObjectsOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Xml(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn test_exists() -> Result<()> {
    let (http, bucket) = init();
    http.respond(StatusCode::OK, "");
    http.respond(StatusCode::NOT_FOUND, "");
    http.respond(StatusCode::FORBIDDEN, "");

    assert!(bucket.exists().await?);
    assert!(!bucket.exists().await?);
    let err = bucket.exists().await.unwrap_err();
    assert!(err.is_forbidden());

    let reqs = http.requests();
    assert_eq!(reqs.len(), 3);
    assert!(reqs.iter().all(|r| r.method() == Method::HEAD));
    assert_eq!(reqs[0].uri().to_string(), "https://bucket.example.com/");
    Ok(())
}

#[tokio::test]
async fn test_put_object() -> Result<()> {
    let (http, bucket) = init();
    http.respond(StatusCode::OK, "");

    bucket.put_object("/dir/hello world.txt", "Hello, COS!").await?;

    let reqs = http.requests();
    assert_eq!(reqs[0].method(), Method::PUT);
    assert_eq!(
        reqs[0].uri().to_string(),
        "https://bucket.example.com/dir/hello%20world.txt"
    );
    assert_eq!(reqs[0].headers()[CONTENT_TYPE], "text/plain");
    assert_eq!(reqs[0].body().as_ref(), b"Hello, COS!");
    assert!(authorization(&reqs[0]).contains("&q-url-param-list=&"));
    Ok(())
}

#[tokio::test]
async fn test_get_object() -> Result<()> {
    let (http, bucket) = init();
    http.respond(StatusCode::OK, "Hello, COS!");
    http.respond(StatusCode::PARTIAL_CONTENT, "Hello");

    assert_eq!(bucket.get_object("hello.txt").await?.as_ref(), b"Hello, COS!");
    let resp = bucket.do_get_object("hello.txt").await?;
    assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(resp.body().as_ref(), b"Hello");
    Ok(())
}

#[tokio::test]
async fn test_get_object_not_found() -> Result<()> {
    let (http, bucket) = init();
    http.respond(
        StatusCode::NOT_FOUND,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>NoSuchKey</Code>
  <Message>The specified key does not exist.</Message>
  <Resource>bucket.example.com/missing.txt</Resource>
  <RequestId>NWQ1ZTNhOTNfMjNiMjU4NjRfMzc0OF8xMjM0</RequestId>
  <TraceId>trace</TraceId>
</Error>"#,
    );

    let err = bucket.get_object("missing.txt").await.unwrap_err();
    let Error::Api(api) = &err else {
        panic!("expected api error, got {err:?}");
    };
    assert_eq!(api.code, "NoSuchKey");
    assert_eq!(api.trace_id, "trace");
    assert_eq!(
        err.to_string(),
        "COS API Error: RequestId: NWQ1ZTNhOTNfMjNiMjU4NjRfMzc0OF8xMjM0 Status Code: 404 Code: NoSuchKey Message: The specified key does not exist."
    );
    Ok(())
}

#[tokio::test]
async fn test_get_object_meta_and_delete() -> Result<()> {
    let (http, bucket) = init();
    http.respond(StatusCode::OK, "");
    http.respond(StatusCode::NO_CONTENT, "");

    let headers = bucket.get_object_meta("hello.txt").await?;
    assert_eq!(headers["x-cos-request-id"], "mock-request-id");
    bucket.delete_object("hello.txt").await?;

    let reqs = http.requests();
    assert_eq!(reqs[0].method(), Method::HEAD);
    assert_eq!(reqs[1].method(), Method::DELETE);
    assert_eq!(reqs[1].uri().path(), "/hello.txt");
    Ok(())
}

#[tokio::test]
async fn test_with_ttl() -> Result<()> {
    let http = MockHttpSend::default();
    http.respond(StatusCode::OK, "");
    let client = Client::new(
        Context::new().with_http_send(http.clone()),
        StaticCredentialProvider::new("AKIDtest", "testkey"),
    )
    .with_ttl(Duration::from_secs(600));

    Bucket::from_url("https://bucket.example.com", client)
        .exists()
        .await?;

    let reqs = http.requests();
    let (start, end) = sign_window(authorization(&reqs[0]));
    assert_eq!(end - start, 600);
    Ok(())
}

#[tokio::test]
async fn test_presign_get_object() -> Result<()> {
    let (http, bucket) = init();

    let uri = bucket
        .presign_get_object("hello.txt", Duration::from_secs(3600))
        .await?;

    assert!(http.requests().is_empty());
    assert_eq!(uri.path(), "/hello.txt");
    let query = uri.query().expect("query must be set");
    assert!(query.starts_with("sign=q-sign-algorithm%3Dsha1%26q-ak%3DAKIDtest%26"));
    Ok(())
}

#[tokio::test]
async fn test_missing_credential() -> Result<()> {
    let http = MockHttpSend::default();
    let client = Client::new(
        Context::new().with_http_send(http.clone()),
        EnvCredentialProvider::new(),
    );

    let err = Bucket::from_url("https://bucket.example.com", client)
        .exists()
        .await
        .unwrap_err();

    let Error::Core(err) = err else {
        panic!("expected core error, got {err:?}");
    };
    assert!(err.is_credential_error());
    assert!(http.requests().is_empty());
    Ok(())
}
