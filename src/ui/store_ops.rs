//! Flow-store operations driven from the UI.
//!
//! Saves, listings, and deletes run on the async runtime and report back
//! through a channel that the app drains at the start of every frame.

use super::state::{FlowBuilderApp, PendingStoreOperation, StoreOperationResult};
use crate::types::{Flow, Graph};
use eframe::egui;

impl FlowBuilderApp {
    /// Processes completed store operations and initiates pending ones.
    ///
    /// Called once per frame from `update`.
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.store.operation_receiver.try_recv() {
            match result {
                StoreOperationResult::SaveCompleted(flow) => {
                    self.store.flow_id = flow.flow_id.clone();
                    self.set_status(format!("Saved '{}'", flow.name));
                }
                StoreOperationResult::ListCompleted(flows) => {
                    self.store.flows = flows;
                }
                StoreOperationResult::DeleteCompleted(flow_id) => {
                    self.store
                        .flows
                        .retain(|f| f.flow_id.as_deref() != Some(flow_id.as_str()));
                    if self.store.flow_id.as_deref() == Some(flow_id.as_str()) {
                        // The open flow no longer exists; the next save
                        // creates a fresh document.
                        self.store.flow_id = None;
                    }
                    self.set_status("Flow deleted");
                }
                StoreOperationResult::OperationFailed(error) => {
                    log::error!("store operation failed: {error}");
                    self.set_warning(error);
                }
            }
        }

        if let Some(op) = self.store.pending_operation.take() {
            let ctx = ctx.clone();
            let store = self.store.store.clone();
            let sender = self.store.operation_sender.clone();

            match op {
                PendingStoreOperation::Save => {
                    let flow = self
                        .graph
                        .to_flow(self.graph.derived_name(), self.store.flow_id.clone());
                    tokio::spawn(async move {
                        let result = match flow.flow_id.clone() {
                            Some(id) => match store.update(flow.clone(), &id) {
                                Ok(Some(saved)) => StoreOperationResult::SaveCompleted(saved),
                                // The saved-under id is gone; fall back to
                                // creating a new document.
                                Ok(None) => match store.create(Flow {
                                    flow_id: None,
                                    ..flow
                                }) {
                                    Ok(saved) => StoreOperationResult::SaveCompleted(saved),
                                    Err(e) => {
                                        StoreOperationResult::OperationFailed(format!(
                                            "Failed to save flow: {e}"
                                        ))
                                    }
                                },
                                Err(e) => StoreOperationResult::OperationFailed(format!(
                                    "Failed to save flow: {e}"
                                )),
                            },
                            None => match store.create(flow) {
                                Ok(saved) => StoreOperationResult::SaveCompleted(saved),
                                Err(e) => StoreOperationResult::OperationFailed(format!(
                                    "Failed to save flow: {e}"
                                )),
                            },
                        };
                        let _ = sender.send(result);
                        ctx.request_repaint();
                    });
                }
                PendingStoreOperation::RefreshList => {
                    tokio::spawn(async move {
                        let result = match store.list() {
                            Ok(flows) => StoreOperationResult::ListCompleted(flows),
                            Err(e) => StoreOperationResult::OperationFailed(format!(
                                "Failed to list flows: {e}"
                            )),
                        };
                        let _ = sender.send(result);
                        ctx.request_repaint();
                    });
                }
                PendingStoreOperation::Delete(flow_id) => {
                    tokio::spawn(async move {
                        // A miss still completes: the flow is gone either
                        // way and the local list should reconcile.
                        let result = match store.delete(&flow_id) {
                            Ok(_) => StoreOperationResult::DeleteCompleted(flow_id),
                            Err(e) => StoreOperationResult::OperationFailed(format!(
                                "Failed to delete flow: {e}"
                            )),
                        };
                        let _ = sender.send(result);
                        ctx.request_repaint();
                    });
                }
            }
        }
    }

    /// Queues a save of the current graph for the next frame.
    pub fn save_flow(&mut self) {
        self.store.pending_operation = Some(PendingStoreOperation::Save);
    }

    /// Queues a refresh of the saved-flow listing.
    pub fn refresh_flows(&mut self) {
        self.store.pending_operation = Some(PendingStoreOperation::RefreshList);
    }

    /// Queues deletion of a saved flow.
    pub fn delete_flow(&mut self, flow_id: String) {
        self.store.pending_operation = Some(PendingStoreOperation::Delete(flow_id));
    }

    /// Replaces the editing session with a saved flow document.
    pub fn open_flow(&mut self, flow: &Flow) {
        self.graph = Graph::from_flow(flow);
        self.store.flow_id = flow.flow_id.clone();
        self.interaction = Default::default();
        self.store.show_flows_window = false;
        self.set_status(format!("Opened '{}'", flow.name));
    }
}
