//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG`. Module paths are hidden; actors identify themselves with the
//! `entity_type` field and settlement logs carry the `attempt` span.
//!
//! ```bash
//! RUST_LOG=info cargo run    # one line per actor operation and attempt phase
//! RUST_LOG=debug cargo run   # plus request payloads and lock acquisitions
//! ```
//!
//! A typical settlement at `info`:
//!
//! ```text
//! INFO settlement: Attempt received attempt=1 account_id=account_1 phase=pending items=2
//! INFO settlement: Validating attempt=1 account_id=account_1 phase=validating
//! INFO settlement:execute: Stock decremented product_id=product_1 remaining=2
//! INFO settlement:execute: Balance debited account_id=account_1 remaining=70
//! INFO settlement: Attempt finished attempt=1 account_id=account_1 phase=committed code=0
//! ```

/// Installs the global subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
