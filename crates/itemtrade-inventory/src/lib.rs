pub mod error;
pub mod file;
pub mod lookup;
pub mod memory;

pub use error::InventoryError;
pub use file::{load_inventory, load_schema};
pub use lookup::{InventoryLookup, ItemSchema};
pub use memory::{MemoryInventory, MemorySchema};
