//! Disk-backed flow storage and its configuration.

mod settings;
mod store;

pub use settings::StoreConfig;
pub use store::FlowStore;
