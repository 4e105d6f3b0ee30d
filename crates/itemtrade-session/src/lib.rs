pub mod api;
pub mod cursor;
pub mod error;
pub mod session;

pub use api::TradeApi;
pub use cursor::TradeCursor;
pub use error::SessionError;
pub use session::{SessionCredentials, TradeSession};
