//! # ActorClient Trait
//!
//! Shared read operations for the domain clients ([`CatalogClient`](crate::clients::CatalogClient),
//! [`LedgerClient`](crate::clients::LedgerClient)), built on top of the generic
//! [`ResourceClient`].

use crate::framework::{ActorEntity, FrameworkError, ResourceClient};
use async_trait::async_trait;

/// Implemented by each domain client wrapping a [`ResourceClient`].
///
/// Provides `get` and `list` with the client's own error type, so callers never
/// handle [`FrameworkError`] directly.
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The domain error type.
    type Error: Send + Sync;

    /// The wrapped generic client.
    fn inner(&self) -> &ResourceClient<T>;

    /// Translates plumbing errors into the domain error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetches one row; `Ok(None)` when it does not exist.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Every row, ascending by id.
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list().await.map_err(Self::map_error)
    }
}
