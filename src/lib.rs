//! Mind-map documents as a forest of positioned nodes.
//!
//! [`MindMapData`] is the plain shape that gets stored and exchanged.
//! [`MindMapStore`] owns one and only hands out edits that keep the
//! parent/children relation a valid forest.

pub mod config;
pub mod error;
pub mod files;
pub mod model;
pub mod store;
pub mod validate;

pub use crate::config::MindMapConfig;
pub use crate::error::{EditError, StructuralError};
pub use crate::model::{MindMapData, Node};
pub use crate::store::{MindMapStore, Walk};

pub const DEFAULT_NODE_WIDTH: f64 = 80.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 30.0;

/// Fresh random node identifier.
pub fn new_node_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
