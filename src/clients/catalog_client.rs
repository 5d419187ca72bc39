use crate::catalog_actor::{ProductAction, ProductActionResult, ProductError, StockChange};
use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::model::{Product, ProductCreate, ProductId, ProductUpdate, StockLevel};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the catalog actor.
#[derive(Clone)]
pub struct CatalogClient {
    inner: ResourceClient<Product>,
}

#[async_trait]
impl ActorClient<Product> for CatalogClient {
    type Error = ProductError;

    fn inner(&self) -> &ResourceClient<Product> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> ProductError {
        match e.into_entity_error::<ProductError>() {
            Ok(typed) => typed,
            Err(other) => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl CatalogClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }

    fn map_for(id: ProductId) -> impl Fn(FrameworkError) -> ProductError {
        move |e| match e {
            FrameworkError::NotFound(_) => ProductError::NotFound(id),
            other => Self::map_error(other),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<ProductId, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner
            .update(id, update)
            .await
            .map_err(Self::map_for(id))
    }

    /// Price and stock of one product; `NotFound` if it does not exist.
    #[instrument(skip(self))]
    pub async fn stock_level(&self, id: ProductId) -> Result<StockLevel, ProductError> {
        debug!("Sending request");
        self.get(id)
            .await?
            .map(|product| product.stock_level())
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn try_decrement(
        &self,
        id: ProductId,
        quantity: u32,
        expected_min_stock: u32,
    ) -> Result<StockChange, ProductError> {
        debug!("Sending request");
        let action = ProductAction::TryDecrement {
            quantity,
            expected_min_stock,
        };
        match self
            .inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_for(id))?
        {
            ProductActionResult::TryDecrement(change) => Ok(change),
            other => Err(unexpected(other)),
        }
    }

    /// Compensating increment; returns the stock after the restock.
    #[instrument(skip(self))]
    pub async fn restock(&self, id: ProductId, quantity: u32) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, ProductAction::Restock { quantity })
            .await
            .map_err(Self::map_for(id))?
        {
            ProductActionResult::Restock(stock) => Ok(stock),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(reply: ProductActionResult) -> ProductError {
    ProductError::ActorCommunicationError(format!("unexpected reply {reply:?}"))
}
