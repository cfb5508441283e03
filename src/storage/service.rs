// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Convenience operations over one [`ObjectStore`].
//!
//! Every operation returns `Result`; backend failures arrive as
//! [`KitError::Storage`] with a kind, local-file problems are detected before
//! the backend is touched.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, error, info};

use crate::config::{BackendKind, StorageConfig};
use crate::error::{KitError, Result, StorageErrorKind};
use crate::storage::backend::{ObjectInfo, ObjectStore};
use crate::storage::local::LocalStore;
use crate::storage::payload::Payload;
use crate::storage::s3::S3Store;

pub struct StorageService {
    store: Box<dyn ObjectStore>,
}

/// `prefix` joined with `name` by a single `/`. An empty prefix yields `name`.
pub fn object_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Last `/` segment of a key, or `None` for directory markers like `"a/b/"`.
pub fn local_name(key: &str) -> Option<&str> {
    key.rsplit('/').next().filter(|name| !name.is_empty())
}

/// Temporary download target next to `path`.
pub fn staging_path(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    path.with_file_name(format!(".{name}.part"))
}

impl StorageService {
    /// Build the backend named in `cfg`. Setup failures are returned, not logged
    /// and dropped.
    pub fn connect(cfg: &StorageConfig) -> Result<Self> {
        cfg.validate().inspect_err(|e| {
            error!(endpoint = %cfg.endpoint, error = %e, "Failed to set up object storage");
        })?;
        let store: Box<dyn ObjectStore> = match cfg.backend {
            BackendKind::S3 => Box::new(S3Store::connect(cfg)?),
            BackendKind::Local => {
                let root = cfg
                    .root
                    .as_ref()
                    .ok_or_else(|| KitError::Config("root must be set for the local backend".into()))?;
                info!(root = ?root, "Using local directory store");
                Box::new(LocalStore::new(root))
            }
        };
        Ok(Self { store })
    }

    pub fn with_store(store: impl ObjectStore + 'static) -> Self {
        Self { store: Box::new(store) }
    }

    /// Recursive listing of `bucket` under `prefix`.
    pub async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectInfo>> {
        self.store
            .list(bucket, prefix)
            .await
            .inspect_err(|e| error!(bucket, prefix, error = %e, "Listing failed"))
    }

    /// Download every object under `prefix` into `local_dir`.
    ///
    /// Objects are saved under the last segment of their key. A file that is
    /// already present is left untouched and not reported. Returns the paths
    /// written by this call, in listing order.
    pub async fn download_files(
        &self,
        bucket: &str,
        prefix: &str,
        local_dir: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>> {
        let local_dir = local_dir.as_ref();
        self.download_inner(bucket, prefix, local_dir)
            .await
            .inspect_err(|e| error!(bucket, prefix, dir = ?local_dir, error = %e, "Download failed"))
    }

    async fn download_inner(&self, bucket: &str, prefix: &str, local_dir: &Path) -> Result<Vec<PathBuf>> {
        if !local_dir.exists() {
            tokio::fs::create_dir_all(local_dir).await.map_err(|e| {
                KitError::storage(StorageErrorKind::LocalFile, format!("create {local_dir:?}: {e}"))
            })?;
            info!(dir = ?local_dir, "Created directory");
        }

        let started = Instant::now();
        info!(bucket, prefix, dir = ?local_dir, "Download started");
        let objects = self.store.list(bucket, prefix).await?;

        let mut downloaded = Vec::new();
        for obj in objects {
            let Some(name) = local_name(&obj.key) else {
                debug!(key = %obj.key, "Skipping directory marker");
                continue;
            };
            let path = local_dir.join(name);
            if path.exists() {
                info!(path = ?path, "File already exists, skipping download");
                continue;
            }

            info!(bucket, key = %obj.key, "Downloading");
            self.fetch_into_place(bucket, &obj.key, &path).await?;
            info!(path = ?path, bytes = ?obj.size, "Downloaded");
            downloaded.push(path);
        }

        let elapsed_secs = format!("{:.2}", started.elapsed().as_secs_f64());
        info!(
            bucket,
            prefix,
            files = downloaded.len(),
            elapsed_secs = %elapsed_secs,
            "Download completed"
        );
        Ok(downloaded)
    }

    /// Fetch `key` into a hidden `.<name>.part` sibling and rename it onto
    /// `path` only once the backend finished. A call abandoned mid-stream
    /// never leaves a file under the final name.
    async fn fetch_into_place(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        let staging = staging_path(path);
        if let Err(e) = self.store.get_to_file(bucket, key, &staging).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }
        tokio::fs::rename(&staging, path).await.map_err(|e| {
            KitError::storage(StorageErrorKind::LocalFile, format!("rename {staging:?} -> {path:?}: {e}"))
        })
    }

    /// Upload `local_file` as `<prefix>/<file name>`.
    pub async fn upload_file(
        &self,
        bucket: &str,
        prefix: &str,
        local_file: impl AsRef<Path>,
    ) -> Result<String> {
        let local_file = local_file.as_ref();
        self.upload_inner(bucket, prefix, local_file)
            .await
            .inspect_err(|e| error!(bucket, prefix, file = ?local_file, error = %e, "Upload failed"))
    }

    async fn upload_inner(&self, bucket: &str, prefix: &str, local_file: &Path) -> Result<String> {
        if !local_file.exists() {
            return Err(KitError::storage(
                StorageErrorKind::LocalFile,
                format!("File not found: {}", local_file.display()),
            ));
        }
        if !local_file.is_file() {
            return Err(KitError::storage(
                StorageErrorKind::LocalFile,
                format!("Not a regular file: {}", local_file.display()),
            ));
        }
        let name = local_file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                KitError::storage(
                    StorageErrorKind::LocalFile,
                    format!("File name is not valid UTF-8: {}", local_file.display()),
                )
            })?;

        let started = Instant::now();
        let key = object_key(prefix, name);
        info!(bucket, key = %key, file = ?local_file, "Upload started");
        self.store.put_file(bucket, &key, local_file).await?;
        let elapsed_secs = format!("{:.2}", started.elapsed().as_secs_f64());
        info!(
            bucket,
            key = %key,
            elapsed_secs = %elapsed_secs,
            "Upload completed"
        );
        Ok(format!("Successfully uploaded {name}"))
    }

    /// Write `payload` to `key`. `content_type` overrides the one inferred
    /// from the payload variant.
    pub async fn write_file(
        &self,
        bucket: &str,
        key: &str,
        payload: impl Into<Payload>,
        content_type: Option<&str>,
    ) -> Result<String> {
        let payload = payload.into();
        let content_type = content_type.unwrap_or_else(|| payload.content_type()).to_string();
        self.write_inner(bucket, key, payload, &content_type)
            .await
            .inspect_err(|e| error!(bucket, key, error = %e, "Write failed"))
    }

    async fn write_inner(&self, bucket: &str, key: &str, payload: Payload, content_type: &str) -> Result<String> {
        let started = Instant::now();
        let data = payload.into_bytes()?;
        let len = data.len();

        info!(bucket, key, content_type, bytes = len, "Write started");
        self.store.put_bytes(bucket, key, data, content_type).await?;
        let elapsed_secs = format!("{:.2}", started.elapsed().as_secs_f64());
        info!(
            bucket,
            key,
            elapsed_secs = %elapsed_secs,
            "Write completed"
        );
        Ok(format!("Successfully wrote {key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_joining() {
        assert_eq!(object_key("", "a.txt"), "a.txt");
        assert_eq!(object_key("models", "a.txt"), "models/a.txt");
        assert_eq!(object_key("models/", "a.txt"), "models/a.txt");
        assert_eq!(object_key("models/v1//", "a.txt"), "models/v1/a.txt");
    }

    #[test]
    fn staging_path_is_hidden_sibling() {
        let p = staging_path(Path::new("/tmp/models/weights.bin"));
        assert_eq!(p, Path::new("/tmp/models/.weights.bin.part"));
    }

    #[test]
    fn local_names() {
        assert_eq!(local_name("a/b/c.bin"), Some("c.bin"));
        assert_eq!(local_name("c.bin"), Some("c.bin"));
        assert_eq!(local_name("a/b/"), None);
    }
}
