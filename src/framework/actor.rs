//! # Generic Actor Server
//!
//! [`ResourceActor`] owns the rows of one entity type and serves requests one
//! at a time. Because a single task owns the map, every request (including a
//! conditional action) is atomic with respect to every other request on the
//! same actor without any locking around the rows.

use crate::framework::client::ResourceClient;
use crate::framework::entity::ActorEntity;
use crate::framework::error::FrameworkError;
use crate::framework::message::ResourceRequest;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The server half of an actor: the row store plus the request receiver.
///
/// # Usage Pattern
///
/// 1. **Create**: `ResourceActor::new()` returns the actor and its client.
/// 2. **Wire**: pass dependencies into `actor.run(context)`.
/// 3. **Run**: spawn the run loop on the tokio runtime.
///
/// ```rust,ignore
/// let (actor, client) = ResourceActor::<Product>::new(32);
/// let handle = tokio::spawn(actor.run(()));
/// let id = client.create(ProductCreate { .. }).await?;
/// ```
///
/// Ids come from an internal `u32` counter starting at 1, converted with
/// `T::Id::from`. A failed create does not consume an id.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id: u32,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates the actor and a client bound to it.
    ///
    /// `buffer_size` is the request channel capacity; senders wait when it is
    /// full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id: 1,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the event loop until every client has been dropped.
    ///
    /// `context` is handed to every entity hook.
    pub async fn run(mut self, context: T::Context) {
        // "Product" instead of "cafe_settlement::model::product::Product"
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = T::Id::from(self.next_id);

                    match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => {
                            if let Err(e) = self.check_conflicts(&item, None) {
                                warn!(entity_type, error = %e, "Create conflicts");
                                let _ =
                                    respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                                continue;
                            }
                            if let Err(e) = item.on_create(&context).await {
                                warn!(entity_type, error = %e, "on_create failed");
                                let _ =
                                    respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                                continue;
                            }
                            self.next_id += 1;
                            self.store.insert(id.clone(), item);
                            info!(entity_type, %id, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    let mut ids: Vec<&T::Id> = self.store.keys().collect();
                    ids.sort();
                    let items: Vec<T> = ids
                        .into_iter()
                        .filter_map(|id| self.store.get(id).cloned())
                        .collect();
                    debug!(entity_type, size = items.len(), "List");
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    // Work on a copy so a rejected update leaves the row as it was.
                    if let Some(mut staged) = self.store.get(&id).cloned() {
                        let applied = match staged.on_update(update, &context).await {
                            Ok(()) => self.check_conflicts(&staged, Some(&id)),
                            Err(e) => Err(e),
                        };
                        if let Err(e) = applied {
                            warn!(entity_type, %id, error = %e, "Update failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                        self.store.insert(id.clone(), staged.clone());
                        info!(entity_type, %id, "Updated");
                        let _ = respond_to.send(Ok(staged));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    if let Some(item) = self.store.get(&id) {
                        if let Err(e) = item.on_delete(&context).await {
                            warn!(entity_type, %id, error = %e, "on_delete failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                            continue;
                        }
                        self.store.remove(&id);
                        info!(entity_type, %id, size = self.store.len(), "Deleted");
                        let _ = respond_to.send(Ok(()));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    if let Some(item) = self.store.get_mut(&id) {
                        let result = item
                            .handle_action(action, &context)
                            .await
                            .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                        match &result {
                            Ok(outcome) => info!(entity_type, %id, ?outcome, "Action ok"),
                            Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                        }
                        let _ = respond_to.send(result);
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    /// Runs [`ActorEntity::check_conflict`] against every stored row except
    /// `own`.
    fn check_conflicts(&self, candidate: &T, own: Option<&T::Id>) -> Result<(), T::Error> {
        self.store
            .iter()
            .filter(|(id, _)| Some(*id) != own)
            .try_for_each(|(_, row)| candidate.check_conflict(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Shelf {
        id: u32,
        label: String,
        units: u32,
    }

    #[derive(Debug)]
    struct ShelfCreate {
        label: String,
        units: u32,
    }

    #[derive(Debug)]
    struct ShelfUpdate {
        label: Option<String>,
        units: Option<u32>,
    }

    #[derive(Debug)]
    enum ShelfAction {
        Take(u32),
    }

    #[derive(Debug, thiserror::Error, PartialEq)]
    enum ShelfError {
        #[error("label cannot be empty")]
        EmptyLabel,
        #[error("only {0} units left")]
        Short(u32),
        #[error("label '{0}' is taken")]
        Taken(String),
    }

    #[async_trait]
    impl ActorEntity for Shelf {
        type Id = u32;
        type Create = ShelfCreate;
        type Update = ShelfUpdate;
        type Action = ShelfAction;
        type ActionResult = u32;
        type Context = ();
        type Error = ShelfError;

        fn from_create_params(id: u32, params: ShelfCreate) -> Result<Self, ShelfError> {
            if params.label.is_empty() {
                return Err(ShelfError::EmptyLabel);
            }
            Ok(Self {
                id,
                label: params.label,
                units: params.units,
            })
        }

        fn check_conflict(&self, other: &Self) -> Result<(), ShelfError> {
            if self.label == other.label {
                return Err(ShelfError::Taken(self.label.clone()));
            }
            Ok(())
        }

        async fn on_update(&mut self, update: ShelfUpdate, _ctx: &()) -> Result<(), ShelfError> {
            if let Some(units) = update.units {
                self.units = units;
            }
            if let Some(label) = update.label {
                if label.is_empty() {
                    return Err(ShelfError::EmptyLabel);
                }
                self.label = label;
            }
            Ok(())
        }

        async fn handle_action(&mut self, action: ShelfAction, _ctx: &()) -> Result<u32, ShelfError> {
            match action {
                ShelfAction::Take(n) if n <= self.units => {
                    self.units -= n;
                    Ok(self.units)
                }
                ShelfAction::Take(_) => Err(ShelfError::Short(self.units)),
            }
        }
    }

    fn shelf(label: &str, units: u32) -> ShelfCreate {
        ShelfCreate {
            label: label.to_string(),
            units,
        }
    }

    #[tokio::test]
    async fn test_crud_and_actions_round_trip() {
        let (actor, client) = ResourceActor::<Shelf>::new(8);
        let handle = tokio::spawn(actor.run(()));

        let id = client.create(shelf("beans", 5)).await.unwrap();
        assert_eq!(id, 1);

        let left = client.perform_action(id, ShelfAction::Take(2)).await.unwrap();
        assert_eq!(left, 3);

        let err = client
            .perform_action(id, ShelfAction::Take(9))
            .await
            .unwrap_err();
        assert_eq!(err.into_entity_error::<ShelfError>().unwrap(), ShelfError::Short(3));

        client.delete(id).await.unwrap();
        assert!(client.get(id).await.unwrap().is_none());

        drop(client);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_create_does_not_consume_an_id() {
        let (actor, client) = ResourceActor::<Shelf>::new(8);
        tokio::spawn(actor.run(()));

        assert!(client.create(shelf("", 1)).await.is_err());
        let id = client.create(shelf("milk", 1)).await.unwrap();
        assert_eq!(id, 1);
    }

    #[tokio::test]
    async fn test_rejected_update_leaves_row_untouched() {
        let (actor, client) = ResourceActor::<Shelf>::new(8);
        tokio::spawn(actor.run(()));

        let id = client.create(shelf("tea", 4)).await.unwrap();
        let update = ShelfUpdate {
            label: Some(String::new()),
            units: Some(40),
        };
        assert!(client.update(id, update).await.is_err());

        let row = client.get(id).await.unwrap().unwrap();
        assert_eq!(row.units, 4);
        assert_eq!(row.label, "tea");
    }

    #[tokio::test]
    async fn test_conflicting_rows_are_refused() {
        let (actor, client) = ResourceActor::<Shelf>::new(8);
        tokio::spawn(actor.run(()));

        let beans = client.create(shelf("beans", 1)).await.unwrap();
        let err = client.create(shelf("beans", 9)).await.unwrap_err();
        assert_eq!(
            err.into_entity_error::<ShelfError>().unwrap(),
            ShelfError::Taken("beans".into())
        );

        // The refused create did not consume an id.
        let oats = client.create(shelf("oats", 2)).await.unwrap();
        assert_eq!(oats, 2);

        let rename = ShelfUpdate {
            label: Some("beans".into()),
            units: Some(7),
        };
        let err = client.update(oats, rename).await.unwrap_err();
        assert_eq!(
            err.into_entity_error::<ShelfError>().unwrap(),
            ShelfError::Taken("beans".into())
        );
        let row = client.get(oats).await.unwrap().unwrap();
        assert_eq!((row.label.as_str(), row.units), ("oats", 2));

        // A row never conflicts with itself.
        let same = ShelfUpdate {
            label: Some("beans".into()),
            units: Some(3),
        };
        assert_eq!(client.update(beans, same).await.unwrap().units, 3);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let (actor, client) = ResourceActor::<Shelf>::new(8);
        tokio::spawn(actor.run(()));

        for label in ["a", "b", "c"] {
            client.create(shelf(label, 1)).await.unwrap();
        }
        let ids: Vec<u32> = client.list().await.unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_missing_row_is_not_found() {
        let (actor, client) = ResourceActor::<Shelf>::new(8);
        tokio::spawn(actor.run(()));

        let err = client
            .perform_action(42, ShelfAction::Take(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FrameworkError::NotFound(id) if id == "42"));
    }
}
