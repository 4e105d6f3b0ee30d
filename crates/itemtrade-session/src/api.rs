use async_trait::async_trait;
use itemtrade_models::{ForeignInventory, TradeStatus};

use crate::cursor::TradeCursor;
use crate::error::SessionError;

/// Wire-level trade commands. Mockable for testing.
///
/// Command methods return `Ok(false)` when the remote side answers without a
/// truthy `success`; errors are reserved for transport and protocol failures.
#[async_trait]
pub trait TradeApi: Send + Sync {
    fn cursor(&self) -> TradeCursor;

    /// Adopts `cursor`; neither field is ever lowered.
    fn set_cursor(&mut self, cursor: TradeCursor);

    async fn fetch_status(&self) -> Result<TradeStatus, SessionError>;

    async fn add_item(&self, asset_id: u64, slot: u32) -> Result<bool, SessionError>;

    async fn remove_item(&self, asset_id: u64, slot: u32) -> Result<bool, SessionError>;

    async fn send_message(&self, text: &str) -> Result<bool, SessionError>;

    async fn set_ready(&self, ready: bool) -> Result<bool, SessionError>;

    async fn accept_trade(&self) -> Result<bool, SessionError>;

    async fn cancel_trade(&self) -> Result<bool, SessionError>;

    /// Best-effort: every failure is reported as [`ForeignInventory::Unavailable`].
    async fn fetch_foreign_inventory(&self, counterpart_id: u64, context_id: u64)
        -> ForeignInventory;
}
