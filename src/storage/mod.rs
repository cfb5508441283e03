// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Storage subsystem: backend trait, S3 + local backends, payloads, and the
//! convenience service on top.

pub mod backend;
pub mod local;
pub mod payload;
pub mod s3;
pub mod service;

pub use backend::{ObjectInfo, ObjectStore};
pub use payload::Payload;
pub use service::StorageService;
