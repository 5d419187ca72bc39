//! The Catalog Store: one actor owning every product row.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::CatalogClient;
use crate::framework::ResourceActor;
use crate::model::Product;

/// Creates the catalog actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Product>, CatalogClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    (actor, CatalogClient::new(generic_client))
}
