//! S3 backend tests that need no server: an endpoint nobody listens on.
//!
//! Run with: `cargo test`

use std::time::Duration;

use bytes::Bytes;

use bucketkit::config::{BackendKind, StorageConfig};
use bucketkit::deadline::Deadline;
use bucketkit::error::StorageErrorKind;
use bucketkit::storage::s3::S3Store;
use bucketkit::storage::ObjectStore;

fn closed_port_config() -> StorageConfig {
    StorageConfig {
        backend: BackendKind::S3,
        endpoint: "127.0.0.1:1".into(),
        access_key: "access".into(),
        secret_key: "secret".into(),
        secure: false,
        region: "us-east-1".into(),
        root: None,
    }
}

#[tokio::test]
async fn test_unreachable_endpoint_is_connection_error() {
    let store = S3Store::connect(&closed_port_config()).expect("client builds without network");
    let deadline = Deadline::new(Duration::from_secs(60));

    let err = deadline.try_run(store.list("data", "models/")).await.unwrap_err();
    assert_eq!(err.storage_kind(), Some(StorageErrorKind::Connection), "{err}");

    let err = deadline
        .try_run(store.put_bytes("data", "a.txt", Bytes::from_static(b"hi"), "text/plain"))
        .await
        .unwrap_err();
    assert_eq!(err.storage_kind(), Some(StorageErrorKind::Connection), "{err}");
}

#[tokio::test]
async fn test_get_from_unreachable_endpoint_leaves_no_file() {
    let dir = tempfile::tempdir().expect("create tempdir");
    let dest = dir.path().join("weights.bin");
    let store = S3Store::connect(&closed_port_config()).expect("client");

    let err = Deadline::new(Duration::from_secs(60))
        .try_run(store.get_to_file("data", "models/weights.bin", &dest))
        .await
        .unwrap_err();
    assert_eq!(err.storage_kind(), Some(StorageErrorKind::Connection), "{err}");
    assert!(!dest.exists());
}
