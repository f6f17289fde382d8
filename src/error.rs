use thiserror::Error;

/// A broken forest invariant found in a [`crate::MindMapData`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("a node has an empty id")]
    EmptyId,

    #[error("node stored under key '{key}' has id '{id}'")]
    KeyMismatch { key: String, id: String },

    #[error("root '{id}' is not present in nodes")]
    MissingRoot { id: String },

    #[error("root '{id}' has parent '{parent}'")]
    RootHasParent { id: String, parent: String },

    #[error("root '{id}' is listed more than once")]
    DuplicateRoot { id: String },

    #[error("node '{parent}' lists child '{child}' which is not present in nodes")]
    DanglingChild { parent: String, child: String },

    #[error(
        "node '{parent}' lists child '{child}' but its parent is {}",
        display_parent(.actual)
    )]
    ParentMismatch {
        parent: String,
        child: String,
        actual: Option<String>,
    },

    #[error("node '{parent}' lists child '{child}' more than once")]
    DuplicateChild { parent: String, child: String },

    #[error("node '{child}' has parent '{parent}' which is not present in nodes")]
    DanglingParent { child: String, parent: String },

    #[error("node '{child}' has parent '{parent}' which does not list it as a child")]
    MissingChildLink { child: String, parent: String },

    #[error("node '{id}' has no parent but is not listed in rootIds")]
    UnlistedRoot { id: String },

    #[error("node '{id}' is its own ancestor")]
    Cycle { id: String },
}

/// Refusal of a [`crate::MindMapStore`] edit. The store is unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("node id must not be empty")]
    EmptyId,

    #[error("node '{0}' already exists")]
    DuplicateId(String),

    #[error("node '{0}' does not exist")]
    UnknownNode(String),

    #[error("node '{0}' must not carry children when inserted")]
    ChildrenNotEmpty(String),

    #[error("index {index} is out of range for {len} siblings")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("moving '{id}' under '{target}' would make it its own ancestor")]
    WouldCycle { id: String, target: String },

    #[error("coordinates ({x}, {y}) must be finite")]
    InvalidCoordinate { x: f64, y: f64 },

    #[error("size {width}x{height} must be finite and non-negative")]
    InvalidSize { width: f64, height: f64 },
}

fn display_parent(parent: &Option<String>) -> String {
    match parent {
        Some(id) => format!("'{id}'"),
        None => "absent".to_string(),
    }
}
