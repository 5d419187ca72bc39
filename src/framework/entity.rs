//! # ActorEntity Trait
//!
//! The contract every stored row type (products in the catalog, accounts in the
//! ledger) implements so that a generic [`ResourceActor`](crate::framework::ResourceActor)
//! can own it. Associated types pin the creation payload, the admin update
//! payload, the conditional actions and their results, so a ledger payload can
//! never be sent to the catalog.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_delete`]
//! - [`ActorEntity::check_conflict`]
//!
//! The defaults do nothing (`Ok(())`).

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A row type owned by a [`ResourceActor`](crate::framework::ResourceActor).
///
/// # Async & Context
/// Hooks are `#[async_trait]` so an entity may call other actors. The `Context`
/// type is injected into every hook when the actor loop starts, not when the
/// actor is constructed.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Row identifier. Generated from a `u32` counter; `Ord` gives listings a
    /// stable order.
    type Id: Eq + Ord + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// Payload for creating a row.
    type Create: Send + Sync + Debug;

    /// Payload for a direct (admin) update of a row.
    type Update: Send + Sync + Debug;

    /// Row-specific atomic operations (e.g. a conditional decrement).
    type Action: Send + Sync + Debug;

    /// Result of an [`ActorEntity::Action`].
    type ActionResult: Send + Sync + Debug;

    /// Dependencies injected into hooks. `()` when none.
    type Context: Send + Sync;

    /// One error enum per entity; it crosses the actor boundary boxed inside
    /// [`FrameworkError::EntityError`](crate::framework::FrameworkError::EntityError).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Builds the row from its id and creation payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Called after construction, before the row becomes visible.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies an update in place. A failed update must leave the row untouched.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Rejects a row that may not coexist with `other` (e.g. a duplicate
    /// name). Checked inside the actor turn against every other stored row,
    /// before a created row becomes visible and before an update is applied.
    fn check_conflict(&self, _other: &Self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called before the row is removed.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Executes a row-specific action. Runs inside the actor loop, so it is
    /// atomic with respect to every other request on the same actor.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
