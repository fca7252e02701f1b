//! # Flow Builder
//!
//! A visual editor for building command flows out of typed blocks. Blocks
//! are dropped onto a canvas from a palette, wired together by dragging
//! between ports, and saved as flows that a bot runtime can execute.
//!
//! ## Features
//! - Drag-and-drop block placement from a built-in palette
//! - Port-to-port connection drawing with curved, node-tracking lines
//! - Selection and deletion of nodes and connections
//! - Per-node constants and entry-command metadata in a details panel
//! - Disk-backed flow storage, optionally exposed over HTTP

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod palette;
pub mod persistence;
pub mod types;
mod ui;

#[cfg(feature = "api")]
pub mod api;

pub use ui::FlowBuilderApp;

/// Runs the flow builder application with default settings.
///
/// This function initializes the egui application window and starts the
/// main event loop.
///
/// # Example
///
/// ```no_run
/// fn main() -> Result<(), eframe::Error> {
///     flow_builder::run_app()
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let store = persistence::FlowStore::new(&persistence::StoreConfig::default());
    run_app_with(store)
}

/// Runs the flow builder against an explicit flow store.
///
/// Used when the HTTP flows service and the editor should share one store
/// instance.
pub fn run_app_with(store: persistence::FlowStore) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Flow Builder",
        options,
        Box::new(|_cc| Ok(Box::new(FlowBuilderApp::with_store(store)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_app_starts_with_an_empty_unsaved_flow() {
        let app = FlowBuilderApp::default();
        assert!(app.graph.nodes.is_empty());
        assert!(app.graph.edges.is_empty());
        assert!(app.store.flow_id.is_none());
    }
}
