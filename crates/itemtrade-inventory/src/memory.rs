use std::collections::{BTreeMap, HashMap};

use itemtrade_models::{InventoryItem, ItemDefinition};

use crate::lookup::{InventoryLookup, ItemSchema};

/// Inventory held in memory, ordered by asset id.
#[derive(Debug, Clone, Default)]
pub struct MemoryInventory {
    items: BTreeMap<u64, InventoryItem>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        Self {
            items: items.into_iter().map(|item| (item.id, item)).collect(),
        }
    }

    /// Replaces any item with the same asset id.
    pub fn insert(&mut self, item: InventoryItem) {
        self.items.insert(item.id, item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl InventoryLookup for MemoryInventory {
    fn get_item(&self, asset_id: u64) -> Option<InventoryItem> {
        self.items.get(&asset_id).cloned()
    }

    fn items(&self) -> Vec<InventoryItem> {
        self.items.values().cloned().collect()
    }
}

/// Item schema held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySchema {
    definitions: HashMap<u32, ItemDefinition>,
}

impl MemorySchema {
    pub fn from_definitions(definitions: impl IntoIterator<Item = ItemDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|def| (def.def_index, def))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl ItemSchema for MemorySchema {
    fn get_definition(&self, def_index: u32) -> Option<ItemDefinition> {
        self.definitions.get(&def_index).cloned()
    }
}
