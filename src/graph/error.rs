#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("graph contains duplicate node id: {id}")]
    DuplicateNodeId { id: String },
}
