use std::collections::{BTreeMap, BTreeSet, HashSet};

use itemtrade_models::{TradeEvent, TradeParty};

/// Locally tracked state of one trade.
///
/// Asset sets are replaced wholesale by snapshots and mutated by events and
/// successful commands in between. The processed-event set only grows.
#[derive(Debug, Default)]
pub struct TradeLedger {
    counterpart_offered: BTreeSet<u64>,
    agent_offered: BTreeSet<u64>,
    agent_slots: BTreeMap<u32, u64>,
    processed_events: HashSet<TradeEvent>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `event` as seen. Returns `false` if it was already processed.
    pub fn mark_processed(&mut self, event: &TradeEvent) -> bool {
        if self.processed_events.contains(event) {
            return false;
        }
        self.processed_events.insert(event.clone())
    }

    pub fn processed_event_count(&self) -> usize {
        self.processed_events.len()
    }

    /// Smallest slot not currently holding an agent asset.
    pub fn next_free_slot(&self) -> u32 {
        let mut slot = 0;
        for &taken in self.agent_slots.keys() {
            if taken != slot {
                break;
            }
            slot += 1;
        }
        slot
    }

    pub fn record_agent_add(&mut self, asset_id: u64, slot: u32) {
        self.agent_slots.insert(slot, asset_id);
        self.agent_offered.insert(asset_id);
    }

    /// Frees the asset's slot. Returns the slot it held.
    pub fn record_agent_remove(&mut self, asset_id: u64) -> Option<u32> {
        let slot = self.slot_of(asset_id)?;
        self.agent_slots.remove(&slot);
        self.agent_offered.remove(&asset_id);
        Some(slot)
    }

    pub fn slot_of(&self, asset_id: u64) -> Option<u32> {
        self.agent_slots
            .iter()
            .find(|&(_, &asset)| asset == asset_id)
            .map(|(&slot, _)| slot)
    }

    pub fn counterpart_added(&mut self, asset_id: u64) {
        self.counterpart_offered.insert(asset_id);
    }

    pub fn counterpart_removed(&mut self, asset_id: u64) {
        self.counterpart_offered.remove(&asset_id);
    }

    /// Replaces the offered sets from a snapshot. A missing party leaves its
    /// set untouched. Slots are left alone; [`TradeLedger::validate`] reports
    /// any divergence.
    pub fn apply_snapshot(&mut self, me: Option<&TradeParty>, them: Option<&TradeParty>) {
        if let Some(them) = them {
            self.counterpart_offered = them.asset_ids().collect();
        }
        if let Some(me) = me {
            self.agent_offered = me.asset_ids().collect();
        }
    }

    /// Checks that the slot map holds exactly the assets the agent offers.
    pub fn validate(&self) -> Result<(), String> {
        let slotted: BTreeSet<u64> = self.agent_slots.values().copied().collect();
        if slotted.len() != self.agent_slots.len() {
            return Err("an asset occupies more than one slot".to_string());
        }
        if slotted != self.agent_offered {
            let missing: Vec<u64> = self.agent_offered.difference(&slotted).copied().collect();
            let stale: Vec<u64> = slotted.difference(&self.agent_offered).copied().collect();
            return Err(format!(
                "offered without a slot: {missing:?}, slotted but not offered: {stale:?}"
            ));
        }
        Ok(())
    }

    pub fn counterpart_offered(&self) -> &BTreeSet<u64> {
        &self.counterpart_offered
    }

    pub fn agent_offered(&self) -> &BTreeSet<u64> {
        &self.agent_offered
    }

    pub fn agent_slots(&self) -> &BTreeMap<u32, u64> {
        &self.agent_slots
    }

    pub fn is_agent_offered(&self, asset_id: u64) -> bool {
        self.agent_offered.contains(&asset_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemtrade_models::TradeAsset;

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

    #[test]
    fn first_fit_slot_allocation() {
        let mut ledger = TradeLedger::new();
        assert_eq!(ledger.next_free_slot(), 0);

        ledger.record_agent_add(100, 0);
        ledger.record_agent_add(101, 1);
        ledger.record_agent_add(102, 2);
        assert_eq!(ledger.next_free_slot(), 3);

        assert_eq!(ledger.record_agent_remove(101), Some(1));
        assert_eq!(ledger.next_free_slot(), 1);

        assert_eq!(ledger.record_agent_remove(100), Some(0));
        assert_eq!(ledger.next_free_slot(), 0);
    }

    #[test]
    fn removing_unknown_asset_is_none() {
        let mut ledger = TradeLedger::new();
        ledger.record_agent_add(100, 0);
        assert_eq!(ledger.record_agent_remove(999), None);
        assert_eq!(ledger.agent_slots().len(), 1);
    }

    #[test]
    fn events_are_processed_once() {
        let mut ledger = TradeLedger::new();
        let event = TradeEvent {
            party_id: "other".to_string(),
            action: 0,
            asset_id: 5,
            ..TradeEvent::default()
        };

        assert!(ledger.mark_processed(&event));
        assert!(!ledger.mark_processed(&event.clone()));
        assert_eq!(ledger.processed_event_count(), 1);
    }

    #[test]
    fn snapshot_replaces_instead_of_merging() {
        let mut ledger = TradeLedger::new();
        ledger.counterpart_added(1);
        ledger.counterpart_added(2);

        ledger.apply_snapshot(None, Some(&party(&[3, 4])));
        assert_eq!(
            ledger.counterpart_offered().iter().copied().collect::<Vec<_>>(),
            vec![3, 4]
        );
        assert!(ledger.agent_offered().is_empty());
    }

    #[test]
    fn validate_detects_divergence_after_snapshot() {
        let mut ledger = TradeLedger::new();
        ledger.record_agent_add(100, 0);
        assert!(ledger.validate().is_ok());

        ledger.apply_snapshot(Some(&party(&[100, 200])), None);
        let err = ledger.validate().unwrap_err();
        assert!(err.contains("[200]"), "{err}");
    }
}
