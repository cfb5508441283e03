// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

pub mod config;
pub mod deadline;
pub mod error;
pub mod storage;

pub use deadline::Deadline;
pub use error::{KitError, Result, StorageErrorKind};
pub use storage::{Payload, StorageService};
