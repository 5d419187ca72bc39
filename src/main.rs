//! Demo: stock a small catalog, open an account and settle a few carts.

use cafe_settlement::lifecycle::{setup_tracing, EngineConfig, SettlementSystem};
use cafe_settlement::model::{AccountCreate, LineItem, ProductCreate, Session};
use rust_decimal_macros::dec;
use std::path::Path;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config =
        EngineConfig::load(Some(Path::new("cafe-settlement.json"))).map_err(|e| e.to_string())?;
    info!(?config, "Starting café settlement demo");

    let system = SettlementSystem::new(&config);
    let engine = system.engine.clone();

    let span = tracing::info_span!("catalog_setup");
    let (latte, muffin) = async {
        info!("Creating products");
        let latte = engine
            .create_product(ProductCreate {
                name: "Latte".to_string(),
                category: Some("Coffee".to_string()),
                price: dec!(10),
                stock: 5,
            })
            .await
            .map_err(|e| e.to_string())?;
        let muffin = engine
            .create_product(ProductCreate {
                name: "Muffin".to_string(),
                category: Some("Bakery".to_string()),
                price: dec!(4.50),
                stock: 0,
            })
            .await
            .map_err(|e| e.to_string())?;
        Ok::<_, String>((latte, muffin))
    }
    .instrument(span)
    .await?;

    let account_id = engine
        .open_account(AccountCreate {
            username: "alice".to_string(),
            opening_balance: dec!(100),
        })
        .await
        .map_err(|e| e.to_string())?;
    let session = Session::new(account_id);
    info!(%account_id, "Account opened");

    let carts = [
        vec![LineItem::new(latte, 3)],
        vec![LineItem::new(muffin, 1)],
        vec![LineItem::new(latte, 2), LineItem::new(muffin, 1)],
    ];
    for items in carts {
        match engine.submit(&session, items).await {
            Ok(code) => info!(code, "Cart submitted"),
            Err(e) => error!(error = %e, retryable = e.is_retryable(), "Cart failed"),
        }
    }

    let balance = engine.balance(account_id).await.map_err(|e| e.to_string())?;
    let stock = engine.stock_level(latte).await.map_err(|e| e.to_string())?;
    info!(%balance, latte_stock = stock.stock, "Final state");

    let summary = system
        .consumption
        .monthly_summary()
        .await
        .map_err(|e| e.to_string())?;
    info!(?summary, "Monthly consumption");

    drop(engine);
    system.shutdown().await?;

    info!("Demo completed");
    Ok(())
}
