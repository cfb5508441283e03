// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// What went wrong at a storage call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// Endpoint unreachable, DNS failure, transport timeout.
    Connection,
    /// Bucket or object does not exist.
    NotFound,
    /// Rejected credentials or missing permission.
    PermissionDenied,
    /// Local file or directory missing or unusable.
    LocalFile,
    /// Any other backend failure.
    Backend,
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageErrorKind::Connection => "connection",
            StorageErrorKind::NotFound => "not found",
            StorageErrorKind::PermissionDenied => "permission denied",
            StorageErrorKind::LocalFile => "local file",
            StorageErrorKind::Backend => "backend",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum KitError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{message} (deadline {limit:?})")]
    Timeout { message: String, limit: Duration },

    #[error("Storage error ({kind}): {detail}")]
    Storage { kind: StorageErrorKind, detail: String },
}

impl KitError {
    pub fn storage(kind: StorageErrorKind, detail: impl Into<String>) -> Self {
        KitError::Storage { kind, detail: detail.into() }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, KitError::Timeout { .. })
    }

    /// Storage failure kind, if this is a storage error.
    pub fn storage_kind(&self) -> Option<StorageErrorKind> {
        match self {
            KitError::Storage { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, KitError>;
