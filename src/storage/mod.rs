// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod content_id;
pub mod content;
pub mod error;

pub use content_id::{bytes32_to_cid, cid_digest, cid_to_bytes32, content_cid};
pub use content::{ContentStore, MemoryContentStore};
pub use error::StorageError;
