//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::quiz::{Question, ScoredResult};
use crate::session::SessionId;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// A message that could not be delivered. Never changes session state.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DeliveryError(pub String);

/// Outbound side of the chat: the runtime only ever emits these intents
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn present_greeting(&self, session: SessionId) -> Result<(), DeliveryError>;

    /// Send question `index` together with its answer options
    async fn present_question(
        &self,
        session: SessionId,
        index: usize,
        question: &Question,
    ) -> Result<(), DeliveryError>;

    /// Send a determined result, with its image when one resolves
    async fn present_result(
        &self,
        session: SessionId,
        result: &ScoredResult,
    ) -> Result<(), DeliveryError>;

    async fn present_undetermined(&self, session: SessionId) -> Result<(), DeliveryError>;

    async fn present_help(&self, session: SessionId) -> Result<(), DeliveryError>;
}

/// Lookup of illustrative images for results
#[async_trait]
pub trait ImageResolver: Send + Sync {
    /// Image bytes for result `key`, or `None` when there is no usable image
    async fn resolve(&self, key: &str, image: Option<&str>) -> Option<Vec<u8>>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: Delivery + ?Sized> Delivery for Arc<T> {
    async fn present_greeting(&self, session: SessionId) -> Result<(), DeliveryError> {
        (**self).present_greeting(session).await
    }

    async fn present_question(
        &self,
        session: SessionId,
        index: usize,
        question: &Question,
    ) -> Result<(), DeliveryError> {
        (**self).present_question(session, index, question).await
    }

    async fn present_result(
        &self,
        session: SessionId,
        result: &ScoredResult,
    ) -> Result<(), DeliveryError> {
        (**self).present_result(session, result).await
    }

    async fn present_undetermined(&self, session: SessionId) -> Result<(), DeliveryError> {
        (**self).present_undetermined(session).await
    }

    async fn present_help(&self, session: SessionId) -> Result<(), DeliveryError> {
        (**self).present_help(session).await
    }
}

#[async_trait]
impl<T: ImageResolver + ?Sized> ImageResolver for Arc<T> {
    async fn resolve(&self, key: &str, image: Option<&str>) -> Option<Vec<u8>> {
        (**self).resolve(key, image).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Reads result images from a directory on disk
#[derive(Debug, Clone)]
pub struct FsImageResolver {
    dir: PathBuf,
}

impl FsImageResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `image` relative to the directory, or `<key>.jpg` when unset
    pub fn path_for(&self, key: &str, image: Option<&str>) -> PathBuf {
        match image {
            Some(image) => self.dir.join(image),
            None => self.dir.join(format!("{key}.jpg")),
        }
    }
}

#[async_trait]
impl ImageResolver for FsImageResolver {
    async fn resolve(&self, key: &str, image: Option<&str>) -> Option<Vec<u8>> {
        let path = self.path_for(key, image);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::debug!(
                    key = %key,
                    path = %path.display(),
                    error = %e,
                    "No image for result, sending text only"
                );
                None
            }
        }
    }
}
