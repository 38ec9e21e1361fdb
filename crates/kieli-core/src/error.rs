use uuid::Uuid;

use crate::document::NodeId;

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is not a text node")]
    NotText(NodeId),

    #[error("Offset {offset} is not a valid split point in node {node}")]
    InvalidOffset { node: NodeId, offset: usize },

    #[error("Node {0} has no parent")]
    Detached(NodeId),

    #[error("Node {0} is still in use")]
    Attached(NodeId),

    #[error("Node {0} cannot have children")]
    NotContainer(NodeId),

    #[error("Inserting {child} under {parent} would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Node {reference} is not a child of {parent}")]
    NotAChild { parent: NodeId, reference: NodeId },
}

#[derive(Debug, thiserror::Error)]
pub enum VocabularyError {
    #[error("Entry has an empty native word")]
    EmptyWord,

    #[error("Word not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {0} is closed")]
    Closed(Uuid),
}
