use crate::TypeIndex;

/// Errors that can occur when retrieving values from an `Any` or calling an `AnyFunction`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnyError {
    /// A value was requested from an empty container
    #[error("called get() on undefined Any")]
    Empty,
    /// The stored value does not support the requested view type
    #[error("cannot view {from} as {to}")]
    TypeMismatch { from: TypeIndex, to: TypeIndex },
    /// A function was called with the wrong number of arguments
    #[error("invalid argument count: expected {expected}, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    /// A parameter index outside of the function's signature was requested
    #[error("invalid argument index {index} for a function taking {count} arguments")]
    ArgumentIndex { index: usize, count: usize },
    /// The value's storage is borrowed elsewhere or was poisoned
    #[error("failed to acquire lock")]
    LockError,
}
