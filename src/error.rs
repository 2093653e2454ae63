use thiserror::Error;

/// Error types for `DynamicArray` operations
///
/// Only bounds-checked access reports through this type. Allocation failure
/// terminates the process and contract violations panic, so neither appears
/// here.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum DynArrayError {
    /// Index is beyond the current array length
    #[error("Index out of bounds: index {index} is beyond array length {length}")]
    IndexOutOfBounds {
        /// Index that was accessed
        index: usize,
        /// Current length of the array
        length: usize,
    },
}
