//! # Mock Clients
//!
//! [`MockClient<T>`] hands out a real [`ResourceClient<T>`] whose requests are
//! answered from a queue of expectations instead of a running actor. It is the
//! tool for the cases a live actor cannot produce on demand: a ledger that goes
//! away halfway through a settlement, a catalog that answers a decrement with a
//! race-induced shortfall, and so on.
//!
//! | | MockClient | Real actor |
//! |---|---|---|
//! | State | scripted replies | real rows |
//! | Fault injection | `return_err(FrameworkError::ActorClosed)` | hard |
//! | Use case | executor rollback paths, client mapping | full system |
//!
//! Expectations are consumed in order. A request that does not match the next
//! expectation (wrong kind or wrong id) is not answered; the caller observes
//! [`FrameworkError::ActorDropped`] and [`MockClient::verify`] panics with the
//! mismatch.
//!
//! ```rust,ignore
//! let mut ledger = MockClient::<Account>::new();
//! ledger.expect_get(AccountId(1)).return_ok(Some(account));
//! ledger.expect_action(AccountId(1)).return_err(FrameworkError::ActorClosed);
//! let client = LedgerClient::new(ledger.client());
//! // ... drive the code under test ...
//! ledger.verify();
//! ```

use crate::framework::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

enum Expectation<T: ActorEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Create {
        response: Result<T::Id, FrameworkError>,
    },
    Update {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
}

impl<T: ActorEntity> Expectation<T> {
    fn describe(&self) -> String {
        match self {
            Expectation::Get { id, .. } => format!("Get {id}"),
            Expectation::Create { .. } => "Create".to_string(),
            Expectation::Update { id, .. } => format!("Update {id}"),
            Expectation::Action { id, .. } => format!("Action {id}"),
        }
    }
}

struct MockState<T: ActorEntity> {
    expectations: VecDeque<Expectation<T>>,
    journal: Vec<String>,
    mismatches: Vec<String>,
}

fn lock<T: ActorEntity>(state: &Mutex<MockState<T>>) -> MutexGuard<'_, MockState<T>> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A scripted stand-in for a [`ResourceActor`](crate::framework::ResourceActor).
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    state: Arc<Mutex<MockState<T>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a mock with no expectations. Must be called inside a tokio runtime.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let state = Arc::new(Mutex::new(MockState {
            expectations: VecDeque::new(),
            journal: Vec::new(),
            mismatches: Vec::new(),
        }));
        let shared = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                answer(&shared, request);
            }
        });

        Self {
            client: ResourceClient::new(sender),
            state,
            _handle: handle,
        }
    }

    /// A client whose requests are answered by this mock.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        ExpectationBuilder::new(self.state.clone(), move |response| Expectation::Get { id, response })
    }

    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T::Id> {
        ExpectationBuilder::new(self.state.clone(), |response| Expectation::Create { response })
    }

    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        ExpectationBuilder::new(self.state.clone(), move |response| Expectation::Update { id, response })
    }

    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        ExpectationBuilder::new(self.state.clone(), move |response| Expectation::Action { id, response })
    }

    /// Requests answered so far, in arrival order (e.g. `"Action product_2 Restock { quantity: 1 }"`).
    pub fn journal(&self) -> Vec<String> {
        lock(&self.state).journal.clone()
    }

    /// Panics unless every expectation was consumed and every request matched.
    pub fn verify(&self) {
        let state = lock(&self.state);
        if !state.mismatches.is_empty() {
            panic!("Unexpected requests: {:?}", state.mismatches);
        }
        if !state.expectations.is_empty() {
            let remaining: Vec<String> = state.expectations.iter().map(Expectation::describe).collect();
            panic!("Not all expectations were met. Remaining: {:?}", remaining);
        }
    }
}

/// Answers one request from the front of the expectation queue.
fn answer<T: ActorEntity>(state: &Mutex<MockState<T>>, request: ResourceRequest<T>) {
    let mut guard = lock(state);
    let expectation = guard.expectations.pop_front();

    match (request, expectation) {
        (ResourceRequest::Get { id, respond_to }, Some(Expectation::Get { id: want, response }))
            if id == want =>
        {
            guard.journal.push(format!("Get {id}"));
            let _ = respond_to.send(response);
        }
        (ResourceRequest::Create { params, respond_to }, Some(Expectation::Create { response })) => {
            guard.journal.push(format!("Create {params:?}"));
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::Update { id, update, respond_to },
            Some(Expectation::Update { id: want, response }),
        ) if id == want => {
            guard.journal.push(format!("Update {id} {update:?}"));
            let _ = respond_to.send(response);
        }
        (
            ResourceRequest::Action { id, action, respond_to },
            Some(Expectation::Action { id: want, response }),
        ) if id == want => {
            guard.journal.push(format!("Action {id} {action:?}"));
            let _ = respond_to.send(response);
        }
        (request, expectation) => {
            let got = describe_request(&request);
            let wanted = expectation
                .as_ref()
                .map(Expectation::describe)
                .unwrap_or_else(|| "nothing".to_string());
            guard.mismatches.push(format!("got {got}, expected {wanted}"));
            // Dropping the request drops its responder: the caller sees ActorDropped.
        }
    }
}

fn describe_request<T: ActorEntity>(request: &ResourceRequest<T>) -> String {
    match request {
        ResourceRequest::Create { params, .. } => format!("Create {params:?}"),
        ResourceRequest::Get { id, .. } => format!("Get {id}"),
        ResourceRequest::List { .. } => "List".to_string(),
        ResourceRequest::Update { id, .. } => format!("Update {id}"),
        ResourceRequest::Delete { id, .. } => format!("Delete {id}"),
        ResourceRequest::Action { id, action, .. } => format!("Action {id} {action:?}"),
    }
}

/// Completes an expectation with the reply the mock will send.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    state: Arc<Mutex<MockState<T>>>,
    make: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    fn new(
        state: Arc<Mutex<MockState<T>>>,
        make: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send + 'static,
    ) -> Self {
        Self {
            state,
            make: Box::new(make),
        }
    }

    pub fn return_ok(self, value: R) {
        let expectation = (self.make)(Ok(value));
        lock(&self.state).expectations.push_back(expectation);
    }

    pub fn return_err(self, error: FrameworkError) {
        let expectation = (self.make)(Err(error));
        lock(&self.state).expectations.push_back(expectation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Clone, Debug, PartialEq)]
    struct Till {
        id: u32,
        float: u32,
    }

    #[derive(Debug)]
    struct TillCreate;

    #[derive(Debug)]
    struct TillUpdate;

    #[derive(Debug)]
    enum TillAction {
        Open,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("till error")]
    struct TillError;

    #[async_trait]
    impl ActorEntity for Till {
        type Id = u32;
        type Create = TillCreate;
        type Update = TillUpdate;
        type Action = TillAction;
        type ActionResult = bool;
        type Context = ();
        type Error = TillError;

        fn from_create_params(id: u32, _: TillCreate) -> Result<Self, TillError> {
            Ok(Self { id, float: 0 })
        }
        async fn on_update(&mut self, _: TillUpdate, _: &()) -> Result<(), TillError> {
            Ok(())
        }
        async fn handle_action(&mut self, _: TillAction, _: &()) -> Result<bool, TillError> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_expectations_answer_in_order() {
        let mut mock = MockClient::<Till>::new();
        mock.expect_create().return_ok(1);
        mock.expect_get(1).return_ok(Some(Till { id: 1, float: 50 }));
        mock.expect_action(1).return_err(FrameworkError::ActorClosed);

        let client = mock.client();
        assert_eq!(client.create(TillCreate).await.unwrap(), 1);
        assert_eq!(client.get(1).await.unwrap().unwrap().float, 50);
        assert!(matches!(
            client.perform_action(1, TillAction::Open).await,
            Err(FrameworkError::ActorClosed)
        ));

        mock.verify();
        assert_eq!(mock.journal(), vec!["Create TillCreate", "Get 1", "Action 1 Open"]);
    }

    #[tokio::test]
    async fn test_wrong_id_is_not_answered() {
        let mut mock = MockClient::<Till>::new();
        mock.expect_get(1).return_ok(None);

        let client = mock.client();
        let result = client.get(2).await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn test_verify_reports_unused_expectations() {
        let mut mock = MockClient::<Till>::new();
        mock.expect_get(7).return_ok(None);
        mock.verify();
    }
}
