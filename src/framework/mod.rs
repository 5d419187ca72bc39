//! Generic resource-actor framework.
//!
//! The catalog and the ledger are both "a map of rows owned by one task". This
//! module implements that once:
//!
//! - [`ActorEntity`] - contract a row type implements
//! - [`ResourceActor`] - the task that owns the rows and serves requests sequentially
//! - [`ResourceClient`] - the cloneable sending half
//! - [`ActorClient`] - shared read operations for domain clients
//! - [`FrameworkError`] - plumbing errors
//!
//! See [`mock`] for scripted clients used to inject faults in tests.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{ResourceRequest, Response};
