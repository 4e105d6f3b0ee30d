//! itemtrade - client engine for an HTTP-polling item trade protocol.
//!
//! Drives one trade session with a remote counterpart: polls the trade
//! status endpoint, reconciles the event log against locally tracked state
//! and reports counterpart activity to a [`TradeObserver`].
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use itemtrade::models::ItemTradeConfig;
//! use itemtrade::session::{SessionCredentials, TradeSession};
//! use itemtrade::engine::{TradeEngine, TradeObserver};
//! use itemtrade::{LoggingObserver, TradeDriver};
//! ```

pub use itemtrade_engine as engine;
pub use itemtrade_inventory as inventory;
pub use itemtrade_models as models;
pub use itemtrade_session as session;

pub mod driver;
pub mod observer;

pub use driver::{DriverOutcome, TradeDriver, TradeSummary};
pub use observer::LoggingObserver;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use itemtrade_engine::{TradeEngine, TradeObserver, TradeSetup};
use itemtrade_inventory::{load_inventory, load_schema, InventoryLookup};
use itemtrade_models::{InventoryConfig, ItemTradeConfig};
use itemtrade_session::{SessionCredentials, TradeSession};
use tracing::warn;

/// Read and parse a TOML configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ItemTradeConfig, anyhow::Error> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Load the inventories and schema for one trade.
///
/// An unreadable counterpart inventory is not an error: the trade proceeds
/// with the private-inventory fallback.
pub fn build_setup(
    config: &InventoryConfig,
    agent_id: u64,
    counterpart_id: u64,
) -> Result<TradeSetup, anyhow::Error> {
    let agent_inventory = load_inventory(&config.agent_inventory_path).with_context(|| {
        format!("Failed to load agent inventory: {}", config.agent_inventory_path)
    })?;
    let schema = load_schema(&config.schema_path)
        .with_context(|| format!("Failed to load item schema: {}", config.schema_path))?;

    let counterpart_inventory = match &config.counterpart_inventory_path {
        Some(path) => match load_inventory(path) {
            Ok(inventory) => Some(Arc::new(inventory) as Arc<dyn InventoryLookup>),
            Err(e) => {
                warn!(path = %path, error = %e, "Counterpart inventory unreadable; treating it as private");
                None
            }
        },
        None => None,
    };

    Ok(TradeSetup {
        agent_id,
        counterpart_id,
        agent_inventory: Arc::new(agent_inventory),
        counterpart_inventory,
        schema: Arc::new(schema),
    })
}

/// Build a trade engine talking to the configured trade endpoint.
pub fn build_engine(
    config: &ItemTradeConfig,
    credentials: &SessionCredentials,
    agent_id: u64,
    counterpart_id: u64,
    observer: Box<dyn TradeObserver>,
) -> Result<TradeEngine<TradeSession>, anyhow::Error> {
    let session = TradeSession::new(&config.session, credentials, counterpart_id)
        .context("Failed to create trade session")?;
    let setup = build_setup(&config.inventory, agent_id, counterpart_id)?;
    Ok(TradeEngine::new(session, setup, observer))
}
