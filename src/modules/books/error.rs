use thiserror::Error;

/// Failures reported by [`BookRegistry`](super::registry::BookRegistry).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("readPage ({read_page}) cannot exceed pageCount ({page_count})")]
    InvalidRange { read_page: u32, page_count: u32 },

    #[error("book '{0}' not found")]
    NotFound(String),

    /// A write did not become visible in the collection.
    #[error("book '{0}' missing right after insertion")]
    InternalInconsistency(String),
}
