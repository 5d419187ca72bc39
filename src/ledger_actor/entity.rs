//! [`ActorEntity`] implementation for [`Account`].
//!
//! The ledger actor is the only place a balance changes. Admin updates can
//! rename an account but never touch its balance.

use super::actions::{AccountAction, AccountActionResult, BalanceChange};
use super::error::AccountError;
use crate::framework::ActorEntity;
use crate::model::{Account, AccountCreate, AccountId, AccountUpdate};
use async_trait::async_trait;
use rust_decimal::Decimal;

fn positive(amount: Decimal) -> Result<Decimal, AccountError> {
    if amount <= Decimal::ZERO {
        return Err(AccountError::InvalidAmount(amount));
    }
    Ok(amount)
}

#[async_trait]
impl ActorEntity for Account {
    type Id = AccountId;
    type Create = AccountCreate;
    type Update = AccountUpdate;
    type Action = AccountAction;
    type ActionResult = AccountActionResult;
    type Context = ();
    type Error = AccountError;

    fn from_create_params(id: AccountId, params: AccountCreate) -> Result<Self, AccountError> {
        let username = params.username.trim();
        if username.is_empty() {
            return Err(AccountError::InvalidUsername);
        }
        if params.opening_balance < Decimal::ZERO {
            return Err(AccountError::NegativeOpeningBalance(params.opening_balance));
        }
        Ok(Self {
            id,
            username: username.to_string(),
            balance: params.opening_balance,
        })
    }

    async fn on_update(&mut self, update: AccountUpdate, _ctx: &()) -> Result<(), AccountError> {
        if let Some(username) = update.username {
            let username = username.trim();
            if username.is_empty() {
                return Err(AccountError::InvalidUsername);
            }
            self.username = username.to_string();
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: AccountAction,
        _ctx: &(),
    ) -> Result<AccountActionResult, AccountError> {
        match action {
            AccountAction::CheckBalance => Ok(AccountActionResult::CheckBalance(self.balance)),
            AccountAction::TryDebit(amount) => {
                let amount = positive(amount)?;
                let change = if self.balance >= amount {
                    self.balance -= amount;
                    BalanceChange::Applied {
                        remaining: self.balance,
                    }
                } else {
                    BalanceChange::Insufficient {
                        available: self.balance,
                    }
                };
                Ok(AccountActionResult::TryDebit(change))
            }
            AccountAction::Credit(amount) => {
                let amount = positive(amount)?;
                self.balance = self
                    .balance
                    .checked_add(amount)
                    .ok_or(AccountError::InvalidAmount(amount))?;
                Ok(AccountActionResult::Credit(self.balance))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn alice(balance: Decimal) -> Account {
        Account::from_create_params(
            AccountId(1),
            AccountCreate {
                username: "alice".into(),
                opening_balance: balance,
            },
        )
        .unwrap()
    }

    #[test]
    fn opening_balance_cannot_be_negative() {
        let err = Account::from_create_params(
            AccountId(1),
            AccountCreate {
                username: "bob".into(),
                opening_balance: dec!(-0.01),
            },
        )
        .unwrap_err();
        assert_eq!(err, AccountError::NegativeOpeningBalance(dec!(-0.01)));
    }

    #[tokio::test]
    async fn debit_never_overdraws() {
        let mut account = alice(dec!(10));

        let short = account
            .handle_action(AccountAction::TryDebit(dec!(10.01)), &())
            .await
            .unwrap();
        assert_eq!(
            short,
            AccountActionResult::TryDebit(BalanceChange::Insufficient {
                available: dec!(10)
            })
        );

        let exact = account
            .handle_action(AccountAction::TryDebit(dec!(10)), &())
            .await
            .unwrap();
        assert_eq!(
            exact,
            AccountActionResult::TryDebit(BalanceChange::Applied {
                remaining: dec!(0)
            })
        );
    }

    #[tokio::test]
    async fn credit_requires_positive_amount() {
        let mut account = alice(dec!(5));
        let err = account
            .handle_action(AccountAction::Credit(Decimal::ZERO), &())
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::InvalidAmount(Decimal::ZERO));

        let credited = account
            .handle_action(AccountAction::Credit(dec!(2.5)), &())
            .await
            .unwrap();
        assert_eq!(credited, AccountActionResult::Credit(dec!(7.5)));
    }

    #[tokio::test]
    async fn rename_leaves_balance_alone() {
        let mut account = alice(dec!(3));
        account
            .on_update(
                AccountUpdate {
                    username: Some("alicia".into()),
                },
                &(),
            )
            .await
            .unwrap();
        assert_eq!(account.username, "alicia");
        assert_eq!(account.balance, dec!(3));
    }
}
