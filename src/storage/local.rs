// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Directory-tree backend.
//!
//! ```text
//! <root>/
//!   <bucket>/
//!     <key with '/' mapped to sub-directories>
//! ```
//!
//! Content types of `put_bytes` objects are kept in memory only.

use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::fs;
use tracing::debug;

use crate::error::{KitError, Result, StorageErrorKind};
use crate::storage::backend::{ObjectInfo, ObjectStore};
use crate::storage::payload::CONTENT_TYPE_BINARY;

pub struct LocalStore {
    root: PathBuf,
    content_types: RwLock<HashMap<(String, String), String>>,
}

impl LocalStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf(), content_types: RwLock::new(HashMap::new()) }
    }

    /// Content type recorded for an object written through this store.
    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.content_types.read().get(&(bucket.to_string(), key.to_string())).cloned()
    }

    /// Create the directory backing `bucket`. Idempotent.
    pub async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let dir = self.bucket_dir(bucket)?;
        fs::create_dir_all(&dir).await.map_err(|e| io_err(&dir, e))
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
            return Err(KitError::storage(
                StorageErrorKind::Backend,
                format!("invalid bucket name '{bucket}'"),
            ));
        }
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key);
        let clean = !key.is_empty()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(KitError::storage(
                StorageErrorKind::Backend,
                format!("invalid object key '{key}'"),
            ));
        }
        Ok(self.bucket_dir(bucket)?.join(rel))
    }

    async fn existing_bucket(&self, bucket: &str) -> Result<PathBuf> {
        let dir = self.bucket_dir(bucket)?;
        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return Err(KitError::storage(
                StorageErrorKind::NotFound,
                format!("bucket '{bucket}' does not exist"),
            ));
        }
        Ok(dir)
    }

    fn record_content_type(&self, bucket: &str, key: &str, content_type: &str) {
        self.content_types
            .write()
            .insert((bucket.to_string(), key.to_string()), content_type.to_string());
    }
}

fn io_err(path: &Path, e: std::io::Error) -> KitError {
    let kind = match e.kind() {
        std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
        std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
        _ => StorageErrorKind::Backend,
    };
    KitError::storage(kind, format!("{path:?}: {e}"))
}

async fn prepare_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|e| io_err(parent, e))?;
    }
    Ok(())
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let bucket_dir = self.existing_bucket(bucket).await?;

        let mut objects = Vec::new();
        let mut pending = vec![bucket_dir.clone()];
        let mut visited = HashSet::new();
        while let Some(dir) = pending.pop() {
            // Linked directories can form cycles.
            let real = fs::canonicalize(&dir).await.map_err(|e| io_err(&dir, e))?;
            if !visited.insert(real) {
                continue;
            }
            let mut entries = fs::read_dir(&dir).await.map_err(|e| io_err(&dir, e))?;
            while let Some(entry) = entries.next_entry().await.map_err(|e| io_err(&dir, e))? {
                let path = entry.path();
                // Follows symlinks: a linked file or directory is listed as its target.
                let meta = match fs::metadata(&path).await {
                    Ok(meta) => meta,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        debug!(path = ?path, "Skipping dangling symlink");
                        continue;
                    }
                    Err(e) => return Err(io_err(&path, e)),
                };
                if meta.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(rel) = path.strip_prefix(&bucket_dir) else { continue };
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if !key.starts_with(prefix) {
                    continue;
                }
                objects.push(ObjectInfo {
                    key,
                    size: Some(meta.len()),
                    last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
                });
            }
        }
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        debug!(bucket, prefix, count = objects.len(), "Listed objects");
        Ok(objects)
    }

    async fn get_to_file(&self, bucket: &str, key: &str, dest: &Path) -> Result<()> {
        self.existing_bucket(bucket).await?;
        let src = self.object_path(bucket, key)?;
        fs::copy(&src, dest).await.map_err(|e| io_err(&src, e))?;
        Ok(())
    }

    async fn put_file(&self, bucket: &str, key: &str, src: &Path) -> Result<()> {
        self.existing_bucket(bucket).await?;
        let dest = self.object_path(bucket, key)?;
        if !fs::try_exists(src).await.unwrap_or(false) {
            return Err(KitError::storage(
                StorageErrorKind::LocalFile,
                format!("{src:?} does not exist"),
            ));
        }
        prepare_parent(&dest).await?;
        fs::copy(src, &dest).await.map_err(|e| io_err(&dest, e))?;
        self.record_content_type(bucket, key, CONTENT_TYPE_BINARY);
        Ok(())
    }

    async fn put_bytes(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<()> {
        self.existing_bucket(bucket).await?;
        let dest = self.object_path(bucket, key)?;
        prepare_parent(&dest).await?;
        fs::write(&dest, &data).await.map_err(|e| io_err(&dest, e))?;
        self.record_content_type(bucket, key, content_type);
        Ok(())
    }
}
