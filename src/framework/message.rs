//! # Generic Messages
//!
//! Requests sent from a [`ResourceClient`](crate::framework::ResourceClient) to its
//! [`ResourceActor`](crate::framework::ResourceActor).

use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use tokio::sync::oneshot;

/// One-shot reply channel used by every request.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// A request against the rows owned by one actor.
///
/// CRUD plus `List` for catalog refreshes and `Action` for the row-specific
/// conditional operations (stock decrement, balance debit, ...). Payload types
/// come from the entity's associated types, so they cannot be mixed up between
/// actors.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}
