use crate::framework::{ActorClient, FrameworkError, ResourceClient};
use crate::ledger_actor::{AccountAction, AccountActionResult, AccountError, BalanceChange};
use crate::model::{Account, AccountCreate, AccountId, AccountUpdate};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

/// Client for the ledger actor.
#[derive(Clone)]
pub struct LedgerClient {
    inner: ResourceClient<Account>,
}

#[async_trait]
impl ActorClient<Account> for LedgerClient {
    type Error = AccountError;

    fn inner(&self) -> &ResourceClient<Account> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> AccountError {
        match e.into_entity_error::<AccountError>() {
            Ok(typed) => typed,
            Err(other) => AccountError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl LedgerClient {
    pub fn new(inner: ResourceClient<Account>) -> Self {
        Self { inner }
    }

    fn map_for(id: AccountId) -> impl Fn(FrameworkError) -> AccountError {
        move |e| match e {
            FrameworkError::NotFound(_) => AccountError::NotFound(id),
            other => Self::map_error(other),
        }
    }

    async fn act(
        &self,
        id: AccountId,
        action: AccountAction,
    ) -> Result<AccountActionResult, AccountError> {
        self.inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_for(id))
    }

    #[instrument(skip(self))]
    pub async fn open_account(&self, params: AccountCreate) -> Result<AccountId, AccountError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    pub async fn update_account(
        &self,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<Account, AccountError> {
        debug!("Sending request");
        self.inner
            .update(id, update)
            .await
            .map_err(Self::map_for(id))
    }

    #[instrument(skip(self))]
    pub async fn balance(&self, id: AccountId) -> Result<Decimal, AccountError> {
        debug!("Sending request");
        self.get(id)
            .await?
            .map(|account| account.balance)
            .ok_or(AccountError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn try_debit(
        &self,
        id: AccountId,
        amount: Decimal,
    ) -> Result<BalanceChange, AccountError> {
        debug!("Sending request");
        match self.act(id, AccountAction::TryDebit(amount)).await? {
            AccountActionResult::TryDebit(change) => Ok(change),
            other => Err(unexpected(other)),
        }
    }

    /// Returns the balance after the credit.
    #[instrument(skip(self))]
    pub async fn credit(&self, id: AccountId, amount: Decimal) -> Result<Decimal, AccountError> {
        debug!("Sending request");
        match self.act(id, AccountAction::Credit(amount)).await? {
            AccountActionResult::Credit(balance) => Ok(balance),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(reply: AccountActionResult) -> AccountError {
    AccountError::ActorCommunicationError(format!("unexpected reply {reply:?}"))
}
