use serde::{Deserialize, Serialize};

use crate::trade_event::TradeEvent;
use crate::wire;

/// Response body of the `tradestatus` endpoint.
///
/// Either an incremental event log (`new_version == false`) or a full
/// snapshot of both parties' offered assets (`new_version == true`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeStatus {
    #[serde(default = "default_success", deserialize_with = "wire::flag_default_true")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "wire::number")]
    pub trade_status: i64,
    #[serde(rename = "newversion", default, deserialize_with = "wire::flag")]
    pub new_version: bool,
    #[serde(default, deserialize_with = "wire::number")]
    pub version: u32,
    #[serde(rename = "logpos", default, deserialize_with = "wire::number")]
    pub log_pos: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub me: Option<TradeParty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub them: Option<TradeParty>,
    #[serde(default, deserialize_with = "wire::indexed_list")]
    pub events: Vec<TradeEvent>,
}

fn default_success() -> bool {
    true
}

impl Default for TradeStatus {
    fn default() -> Self {
        Self {
            success: true,
            error: None,
            trade_status: 0,
            new_version: false,
            version: 0,
            log_pos: 0,
            me: None,
            them: None,
            events: Vec::new(),
        }
    }
}

impl TradeStatus {
    pub fn status_code(&self) -> TradeStatusCode {
        TradeStatusCode::from(self.trade_status)
    }
}

/// One side of the trade as reported by a status response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TradeParty {
    #[serde(default, deserialize_with = "wire::flag")]
    pub ready: bool,
    #[serde(default, deserialize_with = "wire::flag")]
    pub confirmed: bool,
    #[serde(rename = "sec_since_touch", default, deserialize_with = "wire::number")]
    pub seconds_since_touch: u64,
    #[serde(default, deserialize_with = "wire::indexed_list")]
    pub assets: Vec<TradeAsset>,
}

impl TradeParty {
    pub fn asset_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.assets.iter().map(|asset| asset.asset_id)
    }
}

/// An asset currently placed in the trade by one party.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TradeAsset {
    #[serde(rename = "appid", default, deserialize_with = "wire::number")]
    pub app_id: u32,
    #[serde(rename = "contextid", default, deserialize_with = "wire::number")]
    pub context_id: u64,
    #[serde(rename = "assetid", default, deserialize_with = "wire::number")]
    pub asset_id: u64,
    #[serde(default, deserialize_with = "wire::number")]
    pub amount: u32,
}

/// Interpretation of `trade_status`. Anything other than `Open` ends the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatusCode {
    Open,
    Completed,
    Cancelled,
    TimedOut,
    Failed,
    Other(i64),
}

impl TradeStatusCode {
    pub fn is_terminal(self) -> bool {
        self != TradeStatusCode::Open
    }
}

impl From<i64> for TradeStatusCode {
    fn from(code: i64) -> Self {
        match code {
            0 => TradeStatusCode::Open,
            1 => TradeStatusCode::Completed,
            3 => TradeStatusCode::Cancelled,
            4 => TradeStatusCode::TimedOut,
            5 => TradeStatusCode::Failed,
            other => TradeStatusCode::Other(other),
        }
    }
}
