use itemtrade_engine::{TradeError, TradeObserver};
use itemtrade_models::TradeItem;
use tracing::{error, info, warn};

/// Observer that writes every notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl TradeObserver for LoggingObserver {
    fn on_trade_init(&mut self) {
        info!("Trade opened");
    }

    fn on_user_add_item(&mut self, item: &TradeItem) {
        info!(
            asset_id = item.asset_id,
            def_index = ?item.def_index(),
            name = item.name().unwrap_or("unknown"),
            "Counterpart offered an item"
        );
    }

    fn on_user_remove_item(&mut self, item: &TradeItem) {
        info!(
            asset_id = item.asset_id,
            def_index = ?item.def_index(),
            name = item.name().unwrap_or("unknown"),
            "Counterpart withdrew an item"
        );
    }

    fn on_user_set_ready(&mut self, ready: bool) {
        info!(ready, "Counterpart readiness changed");
    }

    fn on_user_accept(&mut self) {
        info!("Counterpart accepted the trade");
    }

    fn on_message(&mut self, text: &str) {
        info!(text, "Counterpart says");
    }

    fn on_close(&mut self) {
        info!("Trade closed");
    }

    fn on_warning(&mut self, text: &str) {
        warn!(text, "Trade warning");
    }

    fn on_error(&mut self, error: &TradeError) {
        if error.is_fatal() {
            error!(error = %error, "Trade error");
        } else {
            warn!(error = %error, "Trade error");
        }
    }
}
