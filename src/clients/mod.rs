//! Typed wrappers around [`ResourceClient`](crate::framework::ResourceClient).

pub mod catalog_client;
pub mod consumption_client;
pub mod ledger_client;

pub use catalog_client::*;
pub use consumption_client::*;
pub use ledger_client::*;
