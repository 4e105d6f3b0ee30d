use serde::{Deserialize, Serialize};

/// Top-level configuration for itemtrade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemTradeConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    pub inventory: InventoryConfig,
}

/// Configuration for the trade endpoint session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Trade endpoint root; the counterpart id is appended to it.
    pub base_url: String,
    /// Domain the session cookies are scoped to.
    pub cookie_domain: String,
    pub app_id: u32,
    pub context_id: u64,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://steamcommunity.com/trade".to_string(),
            cookie_domain: "steamcommunity.com".to_string(),
            app_id: 440,
            context_id: 2,
            request_timeout_seconds: 10,
        }
    }
}

/// Configuration for the poll driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriverConfig {
    pub poll_interval_ms: u64,
    /// Cancel the trade once it has been open this long.
    pub max_trade_seconds: u64,
    /// Cancel the trade when the counterpart has been idle this long.
    pub max_action_gap_seconds: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            max_trade_seconds: 180,
            max_action_gap_seconds: 30,
        }
    }
}

/// Where the inventory and schema lookups are loaded from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryConfig {
    pub agent_inventory_path: String,
    /// Absent when the counterpart's inventory is not readable; item detail is
    /// then resolved through the private-inventory fallback.
    #[serde(default)]
    pub counterpart_inventory_path: Option<String>,
    pub schema_path: String,
}
