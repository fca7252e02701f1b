//! Application state management structures.
//!
//! This module contains the state that tracks the editing session: the graph
//! being edited, the single active gesture, selection, the details panel,
//! and channels for async flow-store operations.

use crate::persistence::{FlowStore, StoreConfig};
use crate::types::*;
use eframe::egui;
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Instant;

/// The one gesture the canvas can be in the middle of.
///
/// A frame is always in exactly one of these states, so a node drag can
/// never also be a connection draw. Both drag variants end on mouse
/// release.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// No button held; hover only.
    #[default]
    Idle,
    /// A node body is held and follows the pointer.
    DraggingNode(NodeId),
    /// A port was grabbed and a connection preview follows the pointer.
    DrawingConnection(TempLine),
}

/// What a canvas click most recently selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A node is selected.
    Node(NodeId),
    /// A committed connection is selected.
    Edge(EdgeId),
}

/// State related to user interaction with the canvas.
pub struct InteractionState {
    /// The active gesture, if any.
    pub gesture: Gesture,
    /// Current selection, if any.
    pub selection: Option<Selection>,
    /// Node whose details panel is open, if any.
    pub details_node: Option<NodeId>,
    /// Palette block being drag-placed onto the canvas, by `code_id`.
    pub palette_drag: Option<String>,
    /// Staging buffers for input constants being typed in the details
    /// panel, keyed by field name.
    pub temp_field_edits: HashMap<String, String>,
    /// Which node the staging buffers belong to.
    pub temp_fields_node: Option<NodeId>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            gesture: Gesture::Idle,
            selection: None,
            details_node: None,
            palette_drag: None,
            temp_field_edits: HashMap::new(),
            temp_fields_node: None,
        }
    }
}

/// Represents a pending flow-store operation type.
#[derive(Debug)]
pub enum PendingStoreOperation {
    /// Persist the current graph (create or overwrite).
    Save,
    /// Re-fetch the list of saved flows.
    RefreshList,
    /// Delete a saved flow by id.
    Delete(String),
}

/// Messages sent from async store operations back to the main app.
#[derive(Debug)]
pub enum StoreOperationResult {
    /// Save completed; carries the stored document with its assigned id.
    SaveCompleted(Flow),
    /// Listing completed with all saved flows.
    ListCompleted(Vec<Flow>),
    /// Delete completed for the given flow id.
    DeleteCompleted(String),
    /// Operation failed with an error message.
    OperationFailed(String),
}

/// State related to the flow store and the flows picker.
pub struct StoreState {
    /// The disk-backed store shared with the HTTP service.
    pub store: FlowStore,
    /// Id the current graph was saved under, if it has been saved.
    pub flow_id: Option<String>,
    /// Cached listing shown in the flows picker.
    pub flows: Vec<Flow>,
    /// Whether the flows picker window is open.
    pub show_flows_window: bool,
    /// Operation to start on the next frame.
    pub pending_operation: Option<PendingStoreOperation>,
    /// Channel for receiving operation results from async contexts.
    pub operation_sender: Sender<StoreOperationResult>,
    /// See `operation_sender`.
    pub operation_receiver: Receiver<StoreOperationResult>,
}

impl Default for StoreState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            store: FlowStore::new(&StoreConfig::default()),
            flow_id: None,
            flows: Vec::new(),
            show_flows_window: false,
            pending_operation: None,
            operation_sender: sender,
            operation_receiver: receiver,
        }
    }
}

/// A transient message shown in the toolbar status area.
pub struct StatusMessage {
    /// The message text.
    pub text: String,
    /// When the message was set; it fades after a few seconds.
    pub shown_at: Instant,
    /// Whether this is a warning (rendered in the warning color).
    pub is_warning: bool,
}

/// The main application structure containing UI state and the graph data.
///
/// This struct implements the `eframe::App` trait and handles all user
/// interface rendering and interaction logic.
pub struct FlowBuilderApp {
    /// The graph being edited.
    pub graph: Graph,
    /// Canvas interaction state.
    pub interaction: InteractionState,
    /// Flow-store state.
    pub store: StoreState,
    /// Transient toolbar status message, if any.
    pub status: Option<StatusMessage>,
    /// Canvas origin in screen space, captured each frame before hit
    /// testing so pointer positions can be translated to canvas space.
    pub canvas_origin: egui::Pos2,
}

impl Default for FlowBuilderApp {
    fn default() -> Self {
        Self {
            graph: Graph::new(),
            interaction: InteractionState::default(),
            store: StoreState::default(),
            status: None,
            canvas_origin: egui::Pos2::ZERO,
        }
    }
}

impl FlowBuilderApp {
    /// An app backed by an explicit store, used by the flows service and
    /// tests.
    pub fn with_store(store: FlowStore) -> Self {
        Self {
            store: StoreState {
                store,
                ..StoreState::default()
            },
            ..Self::default()
        }
    }

    /// Shows a transient informational message in the toolbar.
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            shown_at: Instant::now(),
            is_warning: false,
        });
    }

    /// Shows a transient warning in the toolbar.
    pub fn set_warning(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            shown_at: Instant::now(),
            is_warning: true,
        });
    }

    /// Clears the canvas and starts an unsaved flow.
    pub fn new_flow(&mut self) {
        self.graph = Graph::new();
        self.interaction = InteractionState::default();
        self.store.flow_id = None;
    }
}
