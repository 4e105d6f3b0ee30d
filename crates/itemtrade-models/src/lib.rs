pub mod config;
pub mod foreign_inventory;
pub mod item;
pub mod trade_event;
pub mod trade_status;
pub mod wire;

pub use config::{DriverConfig, InventoryConfig, ItemTradeConfig, SessionConfig};
pub use foreign_inventory::{ForeignAsset, ForeignDescription, ForeignInventory, ForeignInventoryPayload};
pub use item::{InventoryItem, ItemDefinition, TradeItem};
pub use trade_event::{TradeAction, TradeEvent};
pub use trade_status::{TradeAsset, TradeParty, TradeStatus, TradeStatusCode};
