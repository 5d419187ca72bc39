//! Plain data: catalog rows, ledger rows, order requests and consumption
//! records.

pub mod account;
pub mod consumption;
pub mod order;
pub mod product;

pub use account::*;
pub use consumption::*;
pub use order::*;
pub use product::*;
