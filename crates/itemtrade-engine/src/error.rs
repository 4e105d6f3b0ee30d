use std::fmt;

use itemtrade_session::SessionError;
use thiserror::Error;

use crate::engine::EngineState;

#[derive(Error, Debug)]
pub enum TradeError {
    #[error("Trade status poll failed: {0}")]
    Poll(#[from] SessionError),

    #[error("Trade version desync: local version {local}, remote version {remote}")]
    DesyncDetected { local: u32, remote: u32 },

    #[error("{command} rejected by the trade endpoint")]
    CommandRejected { command: TradeCommand },

    #[error("{command} failed: {source}")]
    CommandFailed {
        command: TradeCommand,
        #[source]
        source: SessionError,
    },

    #[error("Asset {0} is not in the agent's inventory")]
    UnknownAsset(u64),

    #[error("Asset {0} is already offered")]
    AlreadyOffered(u64),

    #[error("Asset {0} is not offered by the agent")]
    ItemNotOffered(u64),

    #[error("Trade is not active (state: {0})")]
    NotActive(EngineState),

    #[error("Local item tracking disagrees with the trade: {0}")]
    LocalItemsMismatch(String),

    #[error("Counterpart's private inventory is unavailable")]
    PrivateInventoryUnavailable,
}

impl TradeError {
    /// The engine has aborted and will not recover.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TradeError::DesyncDetected { .. })
    }

    pub fn is_command_failure(&self) -> bool {
        matches!(
            self,
            TradeError::CommandRejected { .. } | TradeError::CommandFailed { .. }
        )
    }
}

/// Outbound commands, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeCommand {
    AddItem,
    RemoveItem,
    SendMessage,
    SetReady,
    AcceptTrade,
    CancelTrade,
}

impl fmt::Display for TradeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TradeCommand::AddItem => "add_item",
            TradeCommand::RemoveItem => "remove_item",
            TradeCommand::SendMessage => "send_message",
            TradeCommand::SetReady => "set_ready",
            TradeCommand::AcceptTrade => "accept_trade",
            TradeCommand::CancelTrade => "cancel_trade",
        };
        f.write_str(name)
    }
}
