use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::wire;

/// Result of a best-effort `foreigninventory` fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ForeignInventory {
    Loaded(ForeignInventoryPayload),
    /// Canonical failure marker: the fetch failed or answered `success: false`.
    Unavailable,
}

impl ForeignInventory {
    /// Parses a response body. A well-formed `{"success": false}` body is
    /// `Unavailable`, not an error.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let envelope: Envelope = serde_json::from_str(body)?;
        if !envelope.success {
            return Ok(ForeignInventory::Unavailable);
        }
        Ok(ForeignInventory::Loaded(serde_json::from_str(body)?))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ForeignInventory::Loaded(_))
    }

    pub fn def_index(&self, asset_id: u64) -> Option<u32> {
        match self {
            ForeignInventory::Loaded(payload) => payload.def_index(asset_id),
            ForeignInventory::Unavailable => None,
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default, deserialize_with = "wire::flag")]
    success: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForeignInventoryPayload {
    /// Keyed by asset id.
    #[serde(rename = "rgInventory", default, deserialize_with = "wire::keyed_map")]
    pub inventory: HashMap<String, ForeignAsset>,
    /// Keyed by `"{classid}_{instanceid}"`.
    #[serde(rename = "rgDescriptions", default, deserialize_with = "wire::keyed_map")]
    pub descriptions: HashMap<String, ForeignDescription>,
}

impl ForeignInventoryPayload {
    pub fn def_index(&self, asset_id: u64) -> Option<u32> {
        let asset = self.inventory.get(&asset_id.to_string()).or_else(|| {
            self.inventory
                .values()
                .find(|asset| asset.id == asset_id)
        })?;
        self.descriptions
            .get(&asset.description_key())?
            .app_data
            .as_ref()
            .map(|data| data.def_index)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForeignAsset {
    #[serde(default, deserialize_with = "wire::number")]
    pub id: u64,
    #[serde(default, deserialize_with = "wire::text")]
    pub classid: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub instanceid: String,
    #[serde(default, deserialize_with = "wire::number")]
    pub amount: u32,
    #[serde(default, deserialize_with = "wire::number")]
    pub pos: u32,
}

impl ForeignAsset {
    pub fn description_key(&self) -> String {
        format!("{}_{}", self.classid, self.instanceid)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForeignDescription {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub app_data: Option<ForeignAppData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForeignAppData {
    #[serde(default, deserialize_with = "wire::number")]
    pub def_index: u32,
}
