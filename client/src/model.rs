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

//! XML documents returned by COS.

use cos_core::time::{parse_rfc3339, DateTime};
use serde::{Deserialize, Deserializer};

/// Result of listing a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ListObjectsResult {
    /// Bucket name.
    pub name: String,
    /// Prefix the listing was restricted to.
    pub prefix: String,
    /// Marker the listing started after.
    pub marker: String,
    /// Maximum number of keys requested.
    pub max_keys: u64,
    /// True if there are more keys than returned. Pass [`Self::next_marker`]
    /// as the next marker to continue.
    pub is_truncated: bool,
    /// Objects in this page.
    #[serde(rename = "Contents")]
    pub contents: Vec<ObjectProperties>,
    /// Key prefixes rolled up by the delimiter.
    pub common_prefixes: Vec<CommonPrefix>,
    /// Marker of the next page.
    pub next_marker: String,
}

/// An object stored in a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ObjectProperties {
    /// Object key.
    pub key: String,
    /// Last modified time, `None` if the element is missing or empty.
    #[serde(deserialize_with = "deserialize_last_modified")]
    pub last_modified: Option<DateTime>,
    /// Object size in bytes.
    pub size: u64,
    /// Hex encoded MD5 of the content, surrounded with double quotes.
    #[serde(rename = "ETag")]
    pub etag: String,
    /// Owner of the object.
    pub owner: Owner,
    /// Storage class, e.g. `STANDARD`.
    pub storage_class: String,
}

/// Owner of an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Owner {
    /// Owner id.
    #[serde(rename = "ID")]
    pub id: String,
    /// Display name.
    pub display_name: String,
}

/// A key prefix rolled up by the delimiter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CommonPrefix {
    /// The prefix, delimiter included.
    pub prefix: String,
}

fn deserialize_last_modified<'de, D>(d: D) -> Result<Option<DateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    parse_rfc3339(s).map(Some).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quick_xml::de;

    #[test]
    fn test_list_objects_result() -> anyhow::Result<()> {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult>
  <Name>bucket-1250000000</Name>
  <Prefix>test/</Prefix>
  <Marker/>
  <MaxKeys>30</MaxKeys>
  <Delimiter>/</Delimiter>
  <IsTruncated>true</IsTruncated>
  <NextMarker>test/b.txt</NextMarker>
  <Contents>
    <Key>test/a.txt</Key>
    <LastModified>2017-06-23T12:33:27.000Z</LastModified>
    <ETag>"79f2a852fac7e826c9f4dbe037f8a63b"</ETag>
    <Size>10</Size>
    <Owner>
      <ID>1250000000</ID>
      <DisplayName>1250000000</DisplayName>
    </Owner>
    <StorageClass>STANDARD</StorageClass>
  </Contents>
  <Contents>
    <Key>test/b.txt</Key>
    <LastModified>2017-06-23T12:33:28.000Z</LastModified>
    <ETag>"d41d8cd98f00b204e9800998ecf8427e"</ETag>
    <Size>0</Size>
    <StorageClass>STANDARD_IA</StorageClass>
  </Contents>
  <CommonPrefixes>
    <Prefix>test/dir/</Prefix>
  </CommonPrefixes>
</ListBucketResult>"#;

        let result: ListObjectsResult = de::from_str(body)?;
        assert_eq!(result.name, "bucket-1250000000");
        assert_eq!(result.prefix, "test/");
        assert_eq!(result.marker, "");
        assert_eq!(result.max_keys, 30);
        assert!(result.is_truncated);
        assert_eq!(result.next_marker, "test/b.txt");
        assert_eq!(result.contents.len(), 2);
        assert_eq!(
            result.contents[0],
            ObjectProperties {
                key: "test/a.txt".to_string(),
                last_modified: Some(parse_rfc3339("2017-06-23T12:33:27Z")?),
                size: 10,
                etag: "\"79f2a852fac7e826c9f4dbe037f8a63b\"".to_string(),
                owner: Owner {
                    id: "1250000000".to_string(),
                    display_name: "1250000000".to_string(),
                },
                storage_class: "STANDARD".to_string(),
            }
        );
        assert_eq!(result.contents[1].owner, Owner::default());
        assert_eq!(
            result.common_prefixes,
            vec![CommonPrefix {
                prefix: "test/dir/".to_string()
            }]
        );
        Ok(())
    }

    #[test]
    fn test_empty_list_objects_result() -> anyhow::Result<()> {
        let body = r#"<ListBucketResult><Name>bucket</Name><IsTruncated>false</IsTruncated></ListBucketResult>"#;

        let result: ListObjectsResult = de::from_str(body)?;
        assert_eq!(result.name, "bucket");
        assert!(!result.is_truncated);
        assert!(result.contents.is_empty());
        assert!(result.common_prefixes.is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_last_modified() -> anyhow::Result<()> {
        let body = r#"<ListBucketResult>
  <Contents><Key>a.txt</Key><LastModified/><Size>1</Size></Contents>
  <Contents><Key>b.txt</Key><LastModified> </LastModified></Contents>
  <Contents><Key>c.txt</Key></Contents>
</ListBucketResult>"#;

        let result: ListObjectsResult = de::from_str(body)?;
        assert_eq!(result.contents.len(), 3);
        assert!(result.contents.iter().all(|o| o.last_modified.is_none()));
        assert_eq!(result.contents[0].size, 1);
        Ok(())
    }

    #[test]
    fn test_invalid_last_modified() {
        let body = r#"<ListBucketResult><Contents><LastModified>yesterday</LastModified></Contents></ListBucketResult>"#;

        assert!(de::from_str::<ListObjectsResult>(body).is_err());
    }
}
