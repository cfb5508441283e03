// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// One object returned by a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    /// Full key inside the bucket.
    pub key: String,
    pub size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Minimal bucket/object API the service needs.
///
/// Implementations report every failure as [`KitError::Storage`] with a
/// classified kind, never by panicking.
///
/// [`KitError::Storage`]: crate::error::KitError::Storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// All objects whose key starts with `prefix`, recursively, in key order.
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>>;

    /// Stream object `key` into a new file at `dest`.
    async fn get_to_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<()>;

    /// Upload the file at `src` as object `key`.
    async fn put_file(&self, bucket: &str, key: &str, src: &Path) -> Result<()>;

    /// Upload `data` as object `key` with an explicit content type.
    async fn put_bytes(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<()>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for Arc<T> {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        (**self).list(bucket, prefix).await
    }

    async fn get_to_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<()> {
        (**self).get_to_file(bucket, key, dest).await
    }

    async fn put_file(&self, bucket: &str, key: &str, src: &Path) -> Result<()> {
        (**self).put_file(bucket, key, src).await
    }

    async fn put_bytes(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<()> {
        (**self).put_bytes(bucket, key, data, content_type).await
    }
}
