//! Entity catalog adapters

mod memory;

pub use memory::MapEntityCatalog;
