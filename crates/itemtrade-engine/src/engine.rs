use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use itemtrade_inventory::{InventoryLookup, ItemSchema};
use itemtrade_models::{ForeignInventory, TradeAction, TradeEvent, TradeItem, TradeStatus};
use itemtrade_session::{SessionError, TradeApi, TradeCursor};
use tracing::{debug, error, info, warn};

use crate::error::{TradeCommand, TradeError};
use crate::ledger::TradeLedger;
use crate::observer::TradeObserver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Active,
    Closed,
    Aborted,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Active => "active",
            EngineState::Closed => "closed",
            EngineState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Parties and lookup services for one trade.
pub struct TradeSetup {
    pub agent_id: u64,
    pub counterpart_id: u64,
    pub agent_inventory: Arc<dyn InventoryLookup>,
    /// `None` when the counterpart's inventory is private.
    pub counterpart_inventory: Option<Arc<dyn InventoryLookup>>,
    pub schema: Arc<dyn ItemSchema>,
}

/// Poll/reconcile state machine for one trade session.
///
/// Call [`TradeEngine::poll`] at a steady interval; counterpart activity is
/// reported through the observer. Every method takes `&mut self`, so at most
/// one request is in flight per engine.
pub struct TradeEngine<A: TradeApi> {
    api: A,
    agent_key: String,
    counterpart_id: u64,
    agent_inventory: Arc<dyn InventoryLookup>,
    counterpart_inventory: Option<Arc<dyn InventoryLookup>>,
    schema: Arc<dyn ItemSchema>,
    observer: Box<dyn TradeObserver>,
    state: EngineState,
    ledger: TradeLedger,
    counterpart_ready: bool,
    agent_ready: bool,
    private_inventory: Option<ForeignInventory>,
}

impl<A: TradeApi> TradeEngine<A> {
    pub fn new(api: A, setup: TradeSetup, observer: Box<dyn TradeObserver>) -> Self {
        Self {
            api,
            agent_key: setup.agent_id.to_string(),
            counterpart_id: setup.counterpart_id,
            agent_inventory: setup.agent_inventory,
            counterpart_inventory: setup.counterpart_inventory,
            schema: setup.schema,
            observer,
            state: EngineState::Uninitialized,
            ledger: TradeLedger::new(),
            counterpart_ready: false,
            agent_ready: false,
            private_inventory: None,
        }
    }

    /// Fetches the trade status and reconciles it against local state.
    ///
    /// Returns `true` when the counterpart did something (or a snapshot was
    /// adopted). Once the trade is closed or aborted this is a no-op.
    pub async fn poll(&mut self) -> Result<bool, TradeError> {
        match self.state {
            EngineState::Uninitialized => {
                self.state = EngineState::Active;
                info!(counterpart_id = self.counterpart_id, "Trade session started");
                self.observer.on_trade_init();
            }
            EngineState::Active => {}
            EngineState::Closed | EngineState::Aborted => {
                debug!(state = %self.state, "Poll skipped; trade is over");
                return Ok(false);
            }
        }

        // 1. Fetch; nothing is mutated on failure
        let status = self.api.fetch_status().await.map_err(|e| {
            if e.is_protocol() {
                warn!(error = %e, "Trade status response unreadable; remote API may have changed");
            } else {
                warn!(error = %e, "Trade status poll failed");
            }
            TradeError::Poll(e)
        })?;

        if !status.success {
            let reason = status.error.clone().unwrap_or_default();
            warn!(error = %reason, "Trade status poll rejected");
            return Err(TradeError::Poll(SessionError::Rejected(reason)));
        }

        // 2. Terminal status ends the trade
        let code = status.status_code();
        if code.is_terminal() {
            info!(trade_status = status.trade_status, "Trade reached terminal status");
            self.close();
            return Ok(false);
        }

        // 3. Snapshot replaces local asset state
        if status.new_version {
            self.apply_snapshot(&status);
            return Ok(true);
        }

        // 4. Incremental log must match our version
        let local = self.api.cursor().version();
        if status.version > local {
            self.state = EngineState::Aborted;
            error!(local, remote = status.version, "Trade version desync; aborting");
            return Err(TradeError::DesyncDetected {
                local,
                remote: status.version,
            });
        }

        // 5. Dispatch unseen counterpart events in delivered order
        let mut counterpart_acted = false;
        for event in &status.events {
            if !self.ledger.mark_processed(event) {
                debug!(action = event.action, asset_id = event.asset_id, "Skipping processed event");
                continue;
            }
            if event.is_from(&self.agent_key) {
                continue;
            }
            counterpart_acted = true;
            self.dispatch(event).await;
        }

        // 6. Readiness and log position
        if let Some(them) = &status.them {
            self.counterpart_ready = them.ready;
        }
        if let Some(me) = &status.me {
            self.agent_ready = me.ready;
        }
        if status.log_pos != 0 {
            let cursor = self.api.cursor().with_log_pos(status.log_pos);
            self.api.set_cursor(cursor);
        }

        Ok(counterpart_acted)
    }

    fn apply_snapshot(&mut self, status: &TradeStatus) {
        let cursor = self.api.cursor().with_version(status.version);
        self.api.set_cursor(cursor);
        self.ledger
            .apply_snapshot(status.me.as_ref(), status.them.as_ref());
        info!(
            version = status.version,
            counterpart_items = self.ledger.counterpart_offered().len(),
            agent_items = self.ledger.agent_offered().len(),
            "Adopted trade snapshot"
        );
    }

    async fn dispatch(&mut self, event: &TradeEvent) {
        match event.kind() {
            TradeAction::ItemAdded => {
                let item = self.resolve_item(event).await;
                info!(asset_id = event.asset_id, def_index = ?item.def_index(), "Counterpart added item");
                self.observer.on_user_add_item(&item);
                self.ledger.counterpart_added(event.asset_id);
            }
            TradeAction::ItemRemoved => {
                let item = self.resolve_item(event).await;
                info!(asset_id = event.asset_id, def_index = ?item.def_index(), "Counterpart removed item");
                self.observer.on_user_remove_item(&item);
                self.ledger.counterpart_removed(event.asset_id);
            }
            TradeAction::SetReady | TradeAction::SetUnready => {
                let ready = event.kind() == TradeAction::SetReady;
                self.counterpart_ready = ready;
                info!(ready, "Counterpart changed readiness");
                self.observer.on_user_set_ready(ready);
            }
            TradeAction::Accepted => {
                info!("Counterpart accepted");
                self.observer.on_user_accept();
            }
            TradeAction::Chat => {
                let text = event.text.as_deref().unwrap_or_default();
                info!(text, "Counterpart message");
                self.observer.on_message(text);
            }
            TradeAction::Unknown(code) => {
                warn!(action = code, "Unknown trade action");
                self.observer
                    .on_warning(&format!("Unknown trade action {code}"));
            }
        }
    }

    /// Looks up detail for the asset named by `event`. Never fails: missing
    /// detail yields a notification without it.
    async fn resolve_item(&mut self, event: &TradeEvent) -> TradeItem {
        let asset_id = event.asset_id;
        if let Some(inventory) = &self.counterpart_inventory {
            let item = inventory.get_item(asset_id);
            let definition = item
                .as_ref()
                .and_then(|item| self.schema.get_definition(item.def_index));
            return TradeItem {
                asset_id,
                item,
                definition,
            };
        }

        match self.private_def_index(event).await {
            Ok(Some(def_index)) => TradeItem {
                asset_id,
                item: None,
                definition: self.schema.get_definition(def_index),
            },
            Ok(None) => {
                debug!(asset_id, "Asset not listed in private inventory");
                TradeItem::unresolved(asset_id)
            }
            Err(e) => {
                debug!(asset_id, error = %e, "Item detail unavailable");
                TradeItem::unresolved(asset_id)
            }
        }
    }

    /// Fetches the counterpart's private inventory on first use and caches
    /// the result, failure included, for the rest of the trade. A failed
    /// fetch is reported to the observer once, as a warning.
    async fn private_def_index(&mut self, event: &TradeEvent) -> Result<Option<u32>, TradeError> {
        if self.private_inventory.is_none() {
            info!(context_id = event.context_id, "Fetching counterpart's private inventory");
            let fetched = self
                .api
                .fetch_foreign_inventory(self.counterpart_id, event.context_id)
                .await;
            if !fetched.is_loaded() {
                let reason = TradeError::PrivateInventoryUnavailable;
                warn!(error = %reason, "Counterpart items will be reported without detail");
                self.observer.on_warning(&reason.to_string());
            }
            self.private_inventory = Some(fetched);
        }

        match &self.private_inventory {
            Some(ForeignInventory::Loaded(payload)) => Ok(payload.def_index(event.asset_id)),
            _ => Err(TradeError::PrivateInventoryUnavailable),
        }
    }

    fn close(&mut self) {
        if self.state == EngineState::Closed {
            return;
        }
        self.state = EngineState::Closed;
        info!(counterpart_id = self.counterpart_id, "Trade closed");
        self.observer.on_close();
    }

    fn ensure_active(&self) -> Result<(), TradeError> {
        if self.state == EngineState::Active {
            Ok(())
        } else {
            Err(TradeError::NotActive(self.state))
        }
    }

    /// Checks the slot map against the assets the agent offers.
    pub fn validate_local_items(&self) -> Result<(), TradeError> {
        self.ledger.validate().map_err(|reason| {
            warn!(reason = %reason, "Local item tracking out of sync");
            TradeError::LocalItemsMismatch(reason)
        })
    }

    /// Offers an agent asset in the first free slot. Returns the slot used.
    pub async fn add_item(&mut self, asset_id: u64) -> Result<u32, TradeError> {
        self.ensure_active()?;
        if self.agent_inventory.get_item(asset_id).is_none() {
            return Err(TradeError::UnknownAsset(asset_id));
        }
        if self.ledger.is_agent_offered(asset_id) || self.ledger.slot_of(asset_id).is_some() {
            return Err(TradeError::AlreadyOffered(asset_id));
        }

        let slot = self.ledger.next_free_slot();
        command_outcome(TradeCommand::AddItem, self.api.add_item(asset_id, slot).await)?;
        self.ledger.record_agent_add(asset_id, slot);
        info!(asset_id, slot, "Offered item");
        Ok(slot)
    }

    /// Withdraws an offered agent asset and frees its slot.
    ///
    /// The asset must be offered and hold a slot. A slot whose asset a
    /// snapshot no longer lists is released locally without a request.
    pub async fn remove_item(&mut self, asset_id: u64) -> Result<(), TradeError> {
        self.ensure_active()?;
        let slot = self
            .ledger
            .slot_of(asset_id)
            .ok_or(TradeError::ItemNotOffered(asset_id))?;
        if !self.ledger.is_agent_offered(asset_id) {
            warn!(asset_id, slot, "Releasing slot of an item the remote side no longer lists");
            self.ledger.record_agent_remove(asset_id);
            return Err(TradeError::ItemNotOffered(asset_id));
        }

        command_outcome(
            TradeCommand::RemoveItem,
            self.api.remove_item(asset_id, slot).await,
        )?;
        self.ledger.record_agent_remove(asset_id);
        info!(asset_id, slot, "Withdrew item");
        Ok(())
    }

    /// Offers the first tradable, not yet offered item of `def_index`.
    /// Returns `false` if there is none.
    pub async fn add_item_by_def_index(&mut self, def_index: u32) -> Result<bool, TradeError> {
        self.ensure_active()?;
        let candidate = self
            .agent_inventory
            .items_by_def_index(def_index)
            .into_iter()
            .find(|item| !item.untradable && !self.ledger.is_agent_offered(item.id));

        match candidate {
            Some(item) => {
                self.add_item(item.id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Offers up to `limit` items of `def_index`. Returns how many were added.
    pub async fn add_all_items_by_def_index(
        &mut self,
        def_index: u32,
        limit: u32,
    ) -> Result<u32, TradeError> {
        let mut added = 0;
        while added < limit && self.add_item_by_def_index(def_index).await? {
            added += 1;
        }
        Ok(added)
    }

    /// Withdraws one offered item of `def_index`. Returns `false` if none is offered.
    pub async fn remove_item_by_def_index(&mut self, def_index: u32) -> Result<bool, TradeError> {
        self.ensure_active()?;
        let target = self.ledger.agent_slots().values().copied().find(|&asset_id| {
            self.ledger.is_agent_offered(asset_id)
                && self
                    .agent_inventory
                    .get_item(asset_id)
                    .is_some_and(|item| item.def_index == def_index)
        });

        match target {
            Some(asset_id) => {
                self.remove_item(asset_id).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn remove_all_items_by_def_index(
        &mut self,
        def_index: u32,
        limit: u32,
    ) -> Result<u32, TradeError> {
        let mut removed = 0;
        while removed < limit && self.remove_item_by_def_index(def_index).await? {
            removed += 1;
        }
        Ok(removed)
    }

    /// Withdraws every offered item. Returns how many were removed.
    ///
    /// Stops at the first failing removal. Items withdrawn before it stay
    /// withdrawn; [`TradeEngine::agent_slots`] shows what is still offered.
    pub async fn remove_all_items(&mut self) -> Result<u32, TradeError> {
        self.ensure_active()?;
        let assets: Vec<u64> = self
            .ledger
            .agent_slots()
            .values()
            .copied()
            .filter(|&asset_id| self.ledger.is_agent_offered(asset_id))
            .collect();
        let mut removed = 0;
        for asset_id in assets {
            self.remove_item(asset_id).await?;
            removed += 1;
        }
        Ok(removed)
    }

    pub async fn send_message(&mut self, text: &str) -> Result<(), TradeError> {
        self.ensure_active()?;
        command_outcome(TradeCommand::SendMessage, self.api.send_message(text).await)?;
        debug!(text, "Sent message");
        Ok(())
    }

    pub async fn set_ready(&mut self, ready: bool) -> Result<(), TradeError> {
        self.ensure_active()?;
        if ready {
            self.validate_local_items()?;
        }
        command_outcome(TradeCommand::SetReady, self.api.set_ready(ready).await)?;
        self.agent_ready = ready;
        info!(ready, "Set readiness");
        Ok(())
    }

    /// Confirms the trade. Completion is observed by a later poll.
    pub async fn accept_trade(&mut self) -> Result<(), TradeError> {
        self.ensure_active()?;
        self.validate_local_items()?;
        command_outcome(TradeCommand::AcceptTrade, self.api.accept_trade().await)?;
        info!("Accepted trade");
        Ok(())
    }

    pub async fn cancel_trade(&mut self) -> Result<(), TradeError> {
        self.ensure_active()?;
        command_outcome(TradeCommand::CancelTrade, self.api.cancel_trade().await)?;
        self.close();
        Ok(())
    }

    /// Forwards an error absorbed by the caller to the observer.
    pub fn report_error(&mut self, error: &TradeError) {
        self.observer.on_error(error);
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn counterpart_id(&self) -> u64 {
        self.counterpart_id
    }

    pub fn counterpart_offered(&self) -> &BTreeSet<u64> {
        self.ledger.counterpart_offered()
    }

    pub fn agent_offered(&self) -> &BTreeSet<u64> {
        self.ledger.agent_offered()
    }

    pub fn agent_slots(&self) -> &BTreeMap<u32, u64> {
        self.ledger.agent_slots()
    }

    pub fn counterpart_ready(&self) -> bool {
        self.counterpart_ready
    }

    pub fn agent_ready(&self) -> bool {
        self.agent_ready
    }

    pub fn processed_event_count(&self) -> usize {
        self.ledger.processed_event_count()
    }

    pub fn cursor(&self) -> TradeCursor {
        self.api.cursor()
    }
}

fn command_outcome(
    command: TradeCommand,
    result: Result<bool, SessionError>,
) -> Result<(), TradeError> {
    match result {
        Ok(true) => Ok(()),
        Ok(false) => {
            warn!(%command, "Trade command rejected");
            Err(TradeError::CommandRejected { command })
        }
        Err(source) => {
            warn!(%command, error = %source, "Trade command failed");
            Err(TradeError::CommandFailed { command, source })
        }
    }
}
