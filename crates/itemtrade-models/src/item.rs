use serde::{Deserialize, Serialize};

/// An item held in a player's inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryItem {
    /// Asset id, unique per item.
    pub id: u64,
    #[serde(alias = "defindex")]
    pub def_index: u32,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub quality: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_name: Option<String>,
    /// Items flagged untradable are never picked by definition-index commands.
    #[serde(default)]
    pub untradable: bool,
}

/// Schema entry describing every item of one definition index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemDefinition {
    #[serde(alias = "defindex")]
    pub def_index: u32,
    pub name: String,
    #[serde(default)]
    pub item_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub craft_material_type: Option<String>,
}

/// Item detail attached to add/remove notifications.
///
/// `item` is only known when the counterpart's inventory is readable;
/// `definition` may still be resolved through the private-inventory fallback.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TradeItem {
    pub asset_id: u64,
    pub item: Option<InventoryItem>,
    pub definition: Option<ItemDefinition>,
}

impl TradeItem {
    pub fn unresolved(asset_id: u64) -> Self {
        Self {
            asset_id,
            item: None,
            definition: None,
        }
    }

    pub fn def_index(&self) -> Option<u32> {
        self.item
            .as_ref()
            .map(|item| item.def_index)
            .or_else(|| self.definition.as_ref().map(|def| def.def_index))
    }

    /// Display name: custom name, then schema name.
    pub fn name(&self) -> Option<&str> {
        self.item
            .as_ref()
            .and_then(|item| item.custom_name.as_deref())
            .or_else(|| self.definition.as_ref().map(|def| def.name.as_str()))
    }
}
