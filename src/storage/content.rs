// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Content-addressed blob storage

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::content_id::content_cid;
use super::error::StorageError;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `data`, returning its CID
    async fn add(&self, data: Vec<u8>) -> Result<String, StorageError>;

    /// CID `data` would be stored under, without storing it
    async fn add_only_hash(&self, data: &[u8]) -> Result<String, StorageError>;

    async fn cat(&self, cid: &str) -> Result<Vec<u8>, StorageError>;
}

/// In-process store addressing blobs by CIDv0 over sha2-256
#[derive(Clone, Default)]
pub struct MemoryContentStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    injected_error: Arc<Mutex<Option<StorageError>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next operation with `error`
    pub async fn inject_error(&self, error: StorageError) {
        *self.injected_error.lock().await = Some(error);
    }

    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    async fn check_injected_error(&self) -> Result<(), StorageError> {
        match self.injected_error.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn add(&self, data: Vec<u8>) -> Result<String, StorageError> {
        self.check_injected_error().await?;
        let cid = content_cid(&data)?;
        debug!("Stored {} bytes as {}", data.len(), cid);
        self.blobs.lock().await.insert(cid.clone(), data);
        Ok(cid)
    }

    async fn add_only_hash(&self, data: &[u8]) -> Result<String, StorageError> {
        self.check_injected_error().await?;
        content_cid(data)
    }

    async fn cat(&self, cid: &str) -> Result<Vec<u8>, StorageError> {
        self.check_injected_error().await?;
        self.blobs
            .lock()
            .await
            .get(cid)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(cid.to_string()))
    }
}
