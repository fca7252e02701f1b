//! Shared application-wide constants.
//! Centralizes tweakable values used across UI rendering and interactions.

// Node dimensions
/// Minimum node body width in canvas units.
pub const NODE_MIN_WIDTH: f32 = 160.0;
/// Height of the node header strip (label area).
pub const NODE_HEADER_HEIGHT: f32 = 20.0;
/// Vertical distance between successive port rows.
pub const PORT_ROW_HEIGHT: f32 = 22.0;
/// Extra body padding below the last port row.
pub const NODE_BODY_PADDING: f32 = 4.0;

// Ports
/// Radius of a port socket circle.
pub const PORT_RADIUS: f32 = 5.0;
/// Horizontal distance from the node body edge to a port socket center.
pub const PORT_MARGIN: f32 = 11.0;
/// Hit-test radius around a port socket center (larger than the visual).
pub const PORT_HIT_RADIUS: f32 = 8.0;

// Edges
/// Horizontal control-point offset for the cubic curve between ports.
pub const EDGE_CURVE_OFFSET: f32 = 100.0;
/// Number of segments used to flatten a curve for hit testing.
pub const EDGE_HIT_SEGMENTS: usize = 24;
/// Distance threshold for selecting an edge by clicking near its curve.
pub const EDGE_CLICK_THRESHOLD: f32 = 6.0;

// Status bar
/// Seconds a transient status message stays visible in the toolbar.
pub const STATUS_MESSAGE_SECS: f64 = 4.0;

// Persistence
/// Maximum stored length of a flow name.
pub const FLOW_NAME_MAX_LEN: usize = 50;
