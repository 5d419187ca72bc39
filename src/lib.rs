//! # Café Settlement
//!
//! > **Atomic multi-item checkout over actor-owned catalog and ledger rows.**
//!
//! A cart of (product, quantity) lines plus a paying account becomes a single
//! settlement: every stock counter drops by its quantity and the balance drops
//! by the total, or nothing changes at all. Many shoppers settle concurrently.
//!
//! ## Outcome codes
//!
//! | Code | Meaning |
//! |---|---|
//! | `0` | Settled |
//! | `1` | Rejected: insufficient stock |
//! | `2` | Rejected: insufficient balance |
//!
//! Malformed carts, unknown products or accounts, and infrastructure failures
//! are [`SettlementError`](settlement::SettlementError)s, never codes.
//!
//! ## Architecture
//!
//! ### Rows live in actors
//! The catalog, the ledger and the consumption records are each one
//! [`ResourceActor`](framework::ResourceActor) owning a map of rows. A request to one actor is atomic on its own, including
//! the conditional actions (`TryDecrement`, `TryDebit`) the settlement path uses.
//!
//! ### Settlements span actors
//! One settlement touches several products and one account. The engine holds a
//! read/write right per row in a [`LockTable`](settlement::LockTable), always
//! acquired products-first in ascending id, then the account. Consistent reads
//! take shared rights; settlements and admin writes take exclusive ones. Every
//! applied mutation is recorded in an [`UndoLog`](settlement::UndoLog) and
//! compensated in reverse if a later step is refused or fails.
//!
//! ### Errors
//! Each actor has its own `thiserror` enum ([`ProductError`](catalog_actor::ProductError),
//! [`AccountError`](ledger_actor::AccountError)). Entity errors cross the actor
//! boundary boxed and are recovered by downcast in the clients.
//!
//! ## Module Tour
//!
//! - [`framework`]: the generic actor, client and mock.
//! - [`model`]: products, accounts, order requests.
//! - [`catalog_actor`], [`ledger_actor`]: the rows a settlement moves.
//! - [`consumption_actor`]: spending records written after each commit.
//! - [`clients`]: typed handles to the three actors.
//! - [`settlement`]: validator, executor, reporter and the engine.
//! - [`lifecycle`]: startup, shutdown, config, logging.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=info cargo run
//! cargo test
//! ```

pub mod catalog_actor;
pub mod clients;
pub mod consumption_actor;
pub mod framework;
pub mod ledger_actor;
pub mod lifecycle;
pub mod model;
pub mod settlement;
