//! Test support: a scripted trade endpoint, a recording observer and
//! fixtures for driving a `TradeEngine` without a network.
//!
//! `ScriptedApi` replays queued status responses in order and records every
//! command it receives. Clones share state, so a test can keep one handle
//! while the engine owns the other.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use itemtrade_inventory::{InventoryLookup, ItemSchema, MemoryInventory, MemorySchema};
use itemtrade_models::{
    ForeignInventory, InventoryItem, ItemDefinition, TradeAction, TradeAsset, TradeEvent,
    TradeItem, TradeParty, TradeStatus,
};
use itemtrade_session::{SessionError, TradeApi, TradeCursor};

use crate::error::{TradeCommand, TradeError};
use crate::observer::TradeObserver;

pub const AGENT_ID: u64 = 76561198000000001;
pub const COUNTERPART_ID: u64 = 76561198000000002;

pub const KEY_DEF_INDEX: u32 = 5021;
pub const REFINED_DEF_INDEX: u32 = 5002;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A command as received by [`ScriptedApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCommand {
    AddItem { asset_id: u64, slot: u32 },
    RemoveItem { asset_id: u64, slot: u32 },
    SendMessage(String),
    SetReady(bool),
    AcceptTrade,
    CancelTrade,
}

#[derive(Debug, Clone, Copy)]
enum CommandOutcome {
    Reject,
    Fail,
}

struct ScriptState {
    cursor: TradeCursor,
    statuses: VecDeque<Result<TradeStatus, SessionError>>,
    polls: usize,
    commands: Vec<RecordedCommand>,
    outcomes: HashMap<TradeCommand, CommandOutcome>,
    allowances: HashMap<TradeCommand, usize>,
    foreign_inventory: ForeignInventory,
    foreign_fetches: usize,
}

impl Default for ScriptState {
    fn default() -> Self {
        Self {
            cursor: TradeCursor::default(),
            statuses: VecDeque::new(),
            polls: 0,
            commands: Vec::new(),
            outcomes: HashMap::new(),
            allowances: HashMap::new(),
            foreign_inventory: ForeignInventory::Unavailable,
            foreign_fetches: 0,
        }
    }
}

/// A `TradeApi` that replays scripted responses.
///
/// Once the status queue is empty every poll answers with an open trade at
/// the current version and no events.
#[derive(Clone, Default)]
pub struct ScriptedApi {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_status(&self, status: TradeStatus) {
        lock(&self.state).statuses.push_back(Ok(status));
    }

    pub fn push_error(&self, error: SessionError) {
        lock(&self.state).statuses.push_back(Err(error));
    }

    /// Answer `command` with `success: false` from now on.
    pub fn reject(&self, command: TradeCommand) {
        lock(&self.state)
            .outcomes
            .insert(command, CommandOutcome::Reject);
    }

    /// Let `command` succeed `successes` more times, then reject it.
    pub fn reject_after(&self, command: TradeCommand, successes: usize) {
        let mut state = lock(&self.state);
        state.allowances.insert(command, successes);
        state.outcomes.insert(command, CommandOutcome::Reject);
    }

    /// Fail `command` with a transport error from now on.
    pub fn fail(&self, command: TradeCommand) {
        lock(&self.state).outcomes.insert(command, CommandOutcome::Fail);
    }

    pub fn set_foreign_inventory(&self, inventory: ForeignInventory) {
        lock(&self.state).foreign_inventory = inventory;
    }

    pub fn commands(&self) -> Vec<RecordedCommand> {
        lock(&self.state).commands.clone()
    }

    pub fn polls(&self) -> usize {
        lock(&self.state).polls
    }

    pub fn foreign_fetches(&self) -> usize {
        lock(&self.state).foreign_fetches
    }

    pub fn current_cursor(&self) -> TradeCursor {
        lock(&self.state).cursor
    }

    fn run_command(&self, command: TradeCommand, recorded: RecordedCommand) -> Result<bool, SessionError> {
        let mut state = lock(&self.state);
        state.commands.push(recorded);
        if let Some(remaining) = state.allowances.get_mut(&command) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(true);
            }
        }
        match state.outcomes.get(&command) {
            None => Ok(true),
            Some(CommandOutcome::Reject) => Ok(false),
            Some(CommandOutcome::Fail) => {
                Err(SessionError::Transport(format!("scripted {command} failure")))
            }
        }
    }
}

#[async_trait]
impl TradeApi for ScriptedApi {
    fn cursor(&self) -> TradeCursor {
        lock(&self.state).cursor
    }

    fn set_cursor(&mut self, cursor: TradeCursor) {
        lock(&self.state).cursor.advance(cursor);
    }

    async fn fetch_status(&self) -> Result<TradeStatus, SessionError> {
        let mut state = lock(&self.state);
        state.polls += 1;
        let version = state.cursor.version();
        state.statuses.pop_front().unwrap_or_else(|| {
            Ok(TradeStatus {
                version,
                ..TradeStatus::default()
            })
        })
    }

    async fn add_item(&self, asset_id: u64, slot: u32) -> Result<bool, SessionError> {
        self.run_command(
            TradeCommand::AddItem,
            RecordedCommand::AddItem { asset_id, slot },
        )
    }

    async fn remove_item(&self, asset_id: u64, slot: u32) -> Result<bool, SessionError> {
        self.run_command(
            TradeCommand::RemoveItem,
            RecordedCommand::RemoveItem { asset_id, slot },
        )
    }

    async fn send_message(&self, text: &str) -> Result<bool, SessionError> {
        self.run_command(
            TradeCommand::SendMessage,
            RecordedCommand::SendMessage(text.to_string()),
        )
    }

    async fn set_ready(&self, ready: bool) -> Result<bool, SessionError> {
        self.run_command(TradeCommand::SetReady, RecordedCommand::SetReady(ready))
    }

    async fn accept_trade(&self) -> Result<bool, SessionError> {
        self.run_command(TradeCommand::AcceptTrade, RecordedCommand::AcceptTrade)
    }

    async fn cancel_trade(&self) -> Result<bool, SessionError> {
        self.run_command(TradeCommand::CancelTrade, RecordedCommand::CancelTrade)
    }

    async fn fetch_foreign_inventory(
        &self,
        _counterpart_id: u64,
        _context_id: u64,
    ) -> ForeignInventory {
        let mut state = lock(&self.state);
        state.foreign_fetches += 1;
        state.foreign_inventory.clone()
    }
}

/// One observer callback, as recorded by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    TradeInit,
    UserAddItem(TradeItem),
    UserRemoveItem(TradeItem),
    UserSetReady(bool),
    UserAccept,
    Message(String),
    Close,
    Warning(String),
    Error(String),
}

/// Observer that appends every notification to a shared log.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.log).clone()
    }

    pub fn count(&self, predicate: impl Fn(&Notification) -> bool) -> usize {
        lock(&self.log).iter().filter(|n| predicate(n)).count()
    }

    fn record(&self, notification: Notification) {
        lock(&self.log).push(notification);
    }
}

impl TradeObserver for RecordingObserver {
    fn on_trade_init(&mut self) {
        self.record(Notification::TradeInit);
    }

    fn on_user_add_item(&mut self, item: &TradeItem) {
        self.record(Notification::UserAddItem(item.clone()));
    }

    fn on_user_remove_item(&mut self, item: &TradeItem) {
        self.record(Notification::UserRemoveItem(item.clone()));
    }

    fn on_user_set_ready(&mut self, ready: bool) {
        self.record(Notification::UserSetReady(ready));
    }

    fn on_user_accept(&mut self) {
        self.record(Notification::UserAccept);
    }

    fn on_message(&mut self, text: &str) {
        self.record(Notification::Message(text.to_string()));
    }

    fn on_close(&mut self) {
        self.record(Notification::Close);
    }

    fn on_warning(&mut self, text: &str) {
        self.record(Notification::Warning(text.to_string()));
    }

    fn on_error(&mut self, error: &TradeError) {
        self.record(Notification::Error(error.to_string()));
    }
}

fn item(id: u64, def_index: u32) -> InventoryItem {
    InventoryItem {
        id,
        def_index,
        level: 1,
        quality: 6,
        custom_name: None,
        untradable: false,
    }
}

/// Agent inventory: keys 1001-1003, refined metal 1004 and an untradable key 1005.
pub fn agent_inventory() -> Arc<dyn InventoryLookup> {
    let mut untradable = item(1005, KEY_DEF_INDEX);
    untradable.untradable = true;
    Arc::new(MemoryInventory::from_items([
        item(1001, KEY_DEF_INDEX),
        item(1002, KEY_DEF_INDEX),
        item(1003, KEY_DEF_INDEX),
        item(1004, REFINED_DEF_INDEX),
        untradable,
    ]))
}

/// Counterpart inventory: refined metal 111 and a key 222.
pub fn counterpart_inventory() -> Arc<dyn InventoryLookup> {
    Arc::new(MemoryInventory::from_items([
        item(111, REFINED_DEF_INDEX),
        item(222, KEY_DEF_INDEX),
    ]))
}

pub fn item_schema() -> Arc<dyn ItemSchema> {
    Arc::new(MemorySchema::from_definitions([
        ItemDefinition {
            def_index: KEY_DEF_INDEX,
            name: "Mann Co. Supply Crate Key".to_string(),
            item_class: "tool".to_string(),
            craft_material_type: None,
        },
        ItemDefinition {
            def_index: REFINED_DEF_INDEX,
            name: "Refined Metal".to_string(),
            item_class: "craft_item".to_string(),
            craft_material_type: Some("craft_bar".to_string()),
        },
    ]))
}

pub fn event(party_id: u64, action: TradeAction, asset_id: u64, timestamp: u64) -> TradeEvent {
    TradeEvent {
        party_id: party_id.to_string(),
        action: action.code(),
        timestamp,
        app_id: 440,
        context_id: 2,
        asset_id,
        text: None,
    }
}

pub fn chat(party_id: u64, text: &str, timestamp: u64) -> TradeEvent {
    TradeEvent {
        text: Some(text.to_string()),
        ..event(party_id, TradeAction::Chat, 0, timestamp)
    }
}

/// Incremental status carrying `events`.
pub fn events_status(version: u32, log_pos: u32, events: Vec<TradeEvent>) -> TradeStatus {
    TradeStatus {
        version,
        log_pos,
        events,
        ..TradeStatus::default()
    }
}

fn party(assets: &[u64]) -> TradeParty {
    TradeParty {
        assets: assets
            .iter()
            .map(|&asset_id| TradeAsset {
                app_id: 440,
                context_id: 2,
                asset_id,
                amount: 1,
            })
            .collect(),
        ..TradeParty::default()
    }
}

/// Snapshot status with the given offered assets.
pub fn snapshot(version: u32, agent_assets: &[u64], counterpart_assets: &[u64]) -> TradeStatus {
    TradeStatus {
        new_version: true,
        version,
        me: Some(party(agent_assets)),
        them: Some(party(counterpart_assets)),
        ..TradeStatus::default()
    }
}

pub fn terminal(trade_status: i64) -> TradeStatus {
    TradeStatus {
        trade_status,
        ..TradeStatus::default()
    }
}
