use itemtrade_models::{InventoryItem, ItemDefinition};

/// Read-only view of one player's inventory.
pub trait InventoryLookup: Send + Sync {
    fn get_item(&self, asset_id: u64) -> Option<InventoryItem>;

    /// Every item, in a stable order.
    fn items(&self) -> Vec<InventoryItem>;

    fn items_by_def_index(&self, def_index: u32) -> Vec<InventoryItem> {
        self.items()
            .into_iter()
            .filter(|item| item.def_index == def_index)
            .collect()
    }
}

/// Item schema: definition index to item definition.
pub trait ItemSchema: Send + Sync {
    fn get_definition(&self, def_index: u32) -> Option<ItemDefinition>;
}
