//! Structural failures surfaced by the linker and the element tree builder.

use crate::model::CommentId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("comment {0} appears more than once in the input set")]
    DuplicateId(CommentId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("{registry} `{description}` is declared by unknown comment {id}")]
    DanglingRegistryEntry {
        registry: &'static str,
        description: String,
        id: CommentId,
    },

    #[error("no processed comment with id {0}")]
    UnknownComment(CommentId),
}
