use thiserror::Error;

/// Errors surfaced by graph construction, traversal and search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The vertex (rendered with `Debug`) was never added to the graph.
    #[error("vertex not found: {0}")]
    VertexNotFound(String),
}

impl GraphError {
    pub(crate) fn vertex_not_found(vertex: &impl std::fmt::Debug) -> Self {
        GraphError::VertexNotFound(format!("{:?}", vertex))
    }
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
