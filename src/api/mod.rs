//! HTTP flow service (feature-gated).
//!
//! Exposes the flow store over `/api/flows/` so other frontends can list,
//! save, and delete flows while the editor runs.

mod server;

pub use server::{is_running, start_server, stop_server};
