//! JSON file loaders for inventories and item schemas.
//!
//! Both files hold an object with an `items` array; the `{"result": {...}}`
//! envelope returned by the platform's web API is accepted too.

use std::path::Path;

use itemtrade_models::{InventoryItem, ItemDefinition};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

use crate::error::InventoryError;
use crate::memory::{MemoryInventory, MemorySchema};

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsFile<T> {
    Wrapped { result: ItemsBody<T> },
    Bare(ItemsBody<T>),
}

#[derive(Deserialize)]
struct ItemsBody<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

fn read_items<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, InventoryError> {
    let raw = std::fs::read_to_string(path).map_err(|source| InventoryError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file: ItemsFile<T> = serde_json::from_str(&raw)?;
    Ok(match file {
        ItemsFile::Wrapped { result } => result.items,
        ItemsFile::Bare(body) => body.items,
    })
}

pub fn load_inventory(path: impl AsRef<Path>) -> Result<MemoryInventory, InventoryError> {
    let path = path.as_ref();
    let inventory = MemoryInventory::from_items(read_items::<InventoryItem>(path)?);
    info!(path = %path.display(), items = inventory.len(), "Loaded inventory");
    Ok(inventory)
}

pub fn load_schema(path: impl AsRef<Path>) -> Result<MemorySchema, InventoryError> {
    let path = path.as_ref();
    let schema = MemorySchema::from_definitions(read_items::<ItemDefinition>(path)?);
    info!(path = %path.display(), definitions = schema.len(), "Loaded item schema");
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{InventoryLookup, ItemSchema};
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_bare_inventory_file() {
        let file = write_temp(
            r#"{"items": [
                {"id": 100, "def_index": 5021, "quality": 6},
                {"id": 101, "defindex": 5002, "level": 1, "untradable": true}
            ]}"#,
        );

        let inventory = load_inventory(file.path()).unwrap();
        assert_eq!(inventory.len(), 2);
        assert!(inventory.get_item(101).unwrap().untradable);
    }

    #[test]
    fn loads_wrapped_schema_file() {
        let file = write_temp(
            r#"{"result": {"status": 1, "items": [
                {"defindex": 5002, "name": "Refined Metal", "item_class": "craft_item"}
            ]}}"#,
        );

        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.get_definition(5002).unwrap().name, "Refined Metal");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_inventory(dir.path().join("absent.json"));
        assert!(matches!(result, Err(InventoryError::Io { .. })));
    }

    #[test]
    fn malformed_file_is_json_error() {
        let file = write_temp("not json");
        assert!(matches!(load_schema(file.path()), Err(InventoryError::Json(_))));
    }
}
