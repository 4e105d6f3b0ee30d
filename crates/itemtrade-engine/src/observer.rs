use itemtrade_models::TradeItem;

use crate::error::TradeError;

/// Receives trade notifications from the engine.
///
/// Every method defaults to a no-op; implement the ones you care about.
/// Notifications for the agent's own events are never delivered.
pub trait TradeObserver: Send {
    fn on_trade_init(&mut self) {}

    fn on_user_add_item(&mut self, _item: &TradeItem) {}

    fn on_user_remove_item(&mut self, _item: &TradeItem) {}

    fn on_user_set_ready(&mut self, _ready: bool) {}

    fn on_user_accept(&mut self) {}

    fn on_message(&mut self, _text: &str) {}

    /// Fired once, when the trade reaches a terminal status or is cancelled.
    fn on_close(&mut self) {}

    fn on_warning(&mut self, _text: &str) {}

    /// Errors absorbed by a caller, such as a failed poll the driver retries.
    fn on_error(&mut self, _error: &TradeError) {}
}
