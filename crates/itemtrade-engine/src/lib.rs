pub mod engine;
pub mod error;
pub mod ledger;
pub mod observer;

pub mod test_support;

pub use engine::{EngineState, TradeEngine, TradeSetup};
pub use error::{TradeCommand, TradeError};
pub use ledger::TradeLedger;
pub use observer::TradeObserver;
