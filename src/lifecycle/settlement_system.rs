use crate::clients::{CatalogClient, ConsumptionClient, LedgerClient};
use crate::lifecycle::EngineConfig;
use crate::settlement::SettlementEngine;
use tracing::{error, info};

/// Starts and stops every actor behind the settlement engine.
///
/// Three actors run, none of which depends on another:
/// - **Catalog**: product rows
/// - **Ledger**: account rows
/// - **Consumption**: one record per settled line
///
/// The engine coordinates the first two under its lock table and writes to
/// the third after each commit.
///
/// ```ignore
/// let system = SettlementSystem::new(&EngineConfig::default());
/// let code = system.engine.submit(&session, items).await?;
/// system.shutdown().await?;
/// ```
pub struct SettlementSystem {
    pub engine: SettlementEngine,
    pub catalog: CatalogClient,
    pub ledger: LedgerClient,
    pub consumption: ConsumptionClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl SettlementSystem {
    /// Spawns the actors on the current tokio runtime.
    pub fn new(config: &EngineConfig) -> Self {
        let (catalog_actor, catalog) = crate::catalog_actor::new(config.actor_buffer);
        let (ledger_actor, ledger) = crate::ledger_actor::new(config.actor_buffer);
        let (consumption_actor, consumption) = crate::consumption_actor::new(config.actor_buffer);

        let handles = vec![
            tokio::spawn(catalog_actor.run(())),
            tokio::spawn(ledger_actor.run(())),
            tokio::spawn(consumption_actor.run(())),
        ];

        let engine = SettlementEngine::new(
            catalog.clone(),
            ledger.clone(),
            consumption.clone(),
            config.lock_timeout(),
        );
        info!(?config, "Settlement system started");

        Self {
            engine,
            catalog,
            ledger,
            consumption,
            handles,
        }
    }

    /// Drops every client held here and waits for the actors to drain.
    ///
    /// Engine clones handed out elsewhere keep their actors alive; drop them
    /// first or this waits for them.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.engine);
        drop(self.catalog);
        drop(self.ledger);
        drop(self.consumption);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
