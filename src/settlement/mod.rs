//! Purchase settlement: the order validator, the executor and the result
//! reporter, tied together by [`SettlementEngine`].

pub mod engine;
pub mod error;
pub mod executor;
pub mod locks;
pub mod outcome;
pub mod validator;

pub use engine::SettlementEngine;
pub use error::SettlementError;
pub use executor::{execute, Applied, Execution, UndoLog};
pub use locks::{LockError, LockKey, LockMode, LockSet, LockTable};
pub use outcome::{
    report, OrderOutcome, SettlementPhase, SettlementReceipt, INSUFFICIENT_BALANCE,
    INSUFFICIENT_STOCK, SETTLED,
};
pub use validator::{assess, validate_shape, Assessment, MalformedOrder, PricedLine, Snapshot};
