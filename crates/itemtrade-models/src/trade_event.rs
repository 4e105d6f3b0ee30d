use std::fmt;

use serde::{Deserialize, Serialize};

use crate::wire;

/// One entry of the remote trade event log.
///
/// Two events are the same event iff every field matches; the derived
/// `Eq + Hash` is the dedup key used while reconciling polls.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TradeEvent {
    /// Id of the party that acted.
    #[serde(rename = "steamid", default, deserialize_with = "wire::text")]
    pub party_id: String,
    #[serde(default, deserialize_with = "wire::number")]
    pub action: i32,
    #[serde(default, deserialize_with = "wire::number")]
    pub timestamp: u64,
    #[serde(rename = "appid", default, deserialize_with = "wire::number")]
    pub app_id: u32,
    #[serde(rename = "contextid", default, deserialize_with = "wire::number")]
    pub context_id: u64,
    #[serde(rename = "assetid", default, deserialize_with = "wire::number")]
    pub asset_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl TradeEvent {
    pub fn kind(&self) -> TradeAction {
        TradeAction::from(self.action)
    }

    pub fn is_from(&self, party_id: &str) -> bool {
        self.party_id == party_id
    }
}

/// Known event action codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeAction {
    ItemAdded,
    ItemRemoved,
    SetReady,
    SetUnready,
    Accepted,
    Chat,
    Unknown(i32),
}

impl TradeAction {
    pub fn code(self) -> i32 {
        match self {
            TradeAction::ItemAdded => 0,
            TradeAction::ItemRemoved => 1,
            TradeAction::SetReady => 2,
            TradeAction::SetUnready => 3,
            TradeAction::Accepted => 4,
            TradeAction::Chat => 7,
            TradeAction::Unknown(code) => code,
        }
    }
}

impl From<i32> for TradeAction {
    fn from(code: i32) -> Self {
        match code {
            0 => TradeAction::ItemAdded,
            1 => TradeAction::ItemRemoved,
            2 => TradeAction::SetReady,
            3 => TradeAction::SetUnready,
            4 => TradeAction::Accepted,
            7 => TradeAction::Chat,
            other => TradeAction::Unknown(other),
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::ItemAdded => f.write_str("item_added"),
            TradeAction::ItemRemoved => f.write_str("item_removed"),
            TradeAction::SetReady => f.write_str("set_ready"),
            TradeAction::SetUnready => f.write_str("set_unready"),
            TradeAction::Accepted => f.write_str("accepted"),
            TradeAction::Chat => f.write_str("chat"),
            TradeAction::Unknown(code) => write!(f, "unknown({code})"),
        }
    }
}
