use thiserror::Error;

/// Errors returned by fallible tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The allocator could not provide memory for a new tree node.
    #[error("failed to allocate tree node of {size} bytes")]
    Alloc { size: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
