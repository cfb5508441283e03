// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! S3-compatible backend on `aws-sdk-s3`.
//!
//! Works against AWS S3 and MinIO-style servers: the endpoint is explicit,
//! credentials are static and requests use path-style addressing
//! (`http://host:port/bucket/key`).

use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::DateTime;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::error::{KitError, Result, StorageErrorKind};
use crate::storage::backend::{ObjectInfo, ObjectStore};
use crate::storage::payload::CONTENT_TYPE_BINARY;

pub struct S3Store {
    client: Client,
}

impl S3Store {
    /// Build a client from connection settings.
    ///
    /// No request is sent here; an unreachable server shows up on the first
    /// call as a [`StorageErrorKind::Connection`] error.
    pub fn connect(cfg: &StorageConfig) -> Result<Self> {
        cfg.validate_s3()?;
        let credentials = Credentials::new(
            cfg.access_key.clone(),
            cfg.secret_key.clone(),
            None,
            None,
            "bucketkit-static",
        );
        let conf = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .endpoint_url(cfg.endpoint_url())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        info!(endpoint = %cfg.endpoint, secure = cfg.secure, region = %cfg.region, "Object storage client ready");
        Ok(Self { client: Client::from_conf(conf) })
    }
}

/// Kind for an S3 service error code.
fn kind_for_code(code: Option<&str>) -> StorageErrorKind {
    match code {
        Some("NoSuchBucket" | "NoSuchKey" | "NotFound") => StorageErrorKind::NotFound,
        Some("AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch") => {
            StorageErrorKind::PermissionDenied
        }
        _ => StorageErrorKind::Backend,
    }
}

/// Map an SDK failure onto a storage error kind.
fn classify<E, R>(op: &str, err: SdkError<E, R>) -> KitError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let kind = match &err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => StorageErrorKind::Connection,
        _ => kind_for_code(err.as_service_error().and_then(|e| e.code())),
    };
    KitError::storage(kind, format!("{op}: {}", DisplayErrorContext(&err)))
}

fn local_err(path: &Path, e: impl std::fmt::Display) -> KitError {
    KitError::storage(StorageErrorKind::LocalFile, format!("{path:?}: {e}"))
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let mut objects = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(|e| classify("list_objects_v2", e))?;

            for obj in resp.contents() {
                let Some(key) = obj.key() else { continue };
                objects.push(ObjectInfo {
                    key: key.to_string(),
                    size: obj.size().map(|s| s.max(0) as u64),
                    last_modified: obj
                        .last_modified()
                        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
                });
            }

            match resp.next_continuation_token() {
                Some(next) => token = Some(next.to_string()),
                None => break,
            }
        }
        debug!(bucket, prefix, count = objects.len(), "Listed objects");
        Ok(objects)
    }

    async fn get_to_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<()> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify("get_object", e))?;

        let mut file = tokio::fs::File::create(dest).await.map_err(|e| local_err(dest, e))?;
        let mut body = resp.body.into_async_read();
        let copied = async {
            tokio::io::copy(&mut body, &mut file).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = copied {
            // Leave no partial file behind; it would be skipped as "existing" next time.
            let _ = tokio::fs::remove_file(dest).await;
            return Err(KitError::storage(
                StorageErrorKind::Connection,
                format!("get_object {key}: body read failed: {e}"),
            ));
        }
        Ok(())
    }

    async fn put_file(&self, bucket: &str, key: &str, src: &Path) -> Result<()> {
        let body = ByteStream::from_path(src).await.map_err(|e| local_err(src, e))?;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(CONTENT_TYPE_BINARY)
            .body(body)
            .send()
            .await
            .map_err(|e| classify("put_object", e))?;
        Ok(())
    }

    async fn put_bytes(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(data.len() as i64)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| classify("put_object", e))?;
        Ok(())
    }
}
