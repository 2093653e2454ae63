#![no_std]

//! `DynamicArray`: a growable contiguous array with explicit allocation and
//! element lifetime control.
//!
//! `DynamicArray<T>` owns a single heap block sized to its capacity. The first
//! `len` slots hold live elements; the remaining slots are allocated but
//! uninitialized. Elements are constructed in place and dropped exactly once,
//! and the block is released on drop or by `shrink_to_fit` on an empty array.
//!
//! This crate is `no_std` and only needs the `alloc` crate.
//!
//! # Performance Characteristics
//!
//! ## Time Complexity
//! - `push_back()`, `emplace_back()`: amortized O(1), capacity doubles when full
//! - `pop_back()`, indexing, `at()`: O(1)
//! - `insert()`, `erase()`: O(n) - elements after the position are shifted
//! - `reserve()`, `shrink_to_fit()`: O(n) when they reallocate, O(1) otherwise
//! - `swap()`: O(1) - no element is copied and nothing is allocated
//! - `clear()`: O(n) drops, capacity is kept
//!
//! ## Growth Policy
//! - Appending to a full array starts from the current capacity (1 if
//!   unallocated) and doubles until the new elements fit
//! - `reserve(n)` and `resize(n)` allocate exactly `n` slots
//! - Memory is never released implicitly; only `shrink_to_fit()` and drop do
//!
//! ## Allocation Failure
//!
//! Allocation failure is fatal. The global allocation error handler is called
//! and the process terminates; no operation reports it as an error. A capacity
//! whose byte size would exceed `isize::MAX` panics with "capacity overflow".
//!
//! # Basic Usage
//!
//! ```
//! use dynarray::DynamicArray;
//!
//! let mut array = DynamicArray::new();
//! for value in 1..=5 {
//!     array.push_back(value);
//! }
//! assert_eq!(array.len(), 5);
//! assert!(array.capacity() > 5);
//!
//! array.pop_back();
//! array.pop_back();
//! array.pop_back();
//! assert_eq!(array, [1, 2]);
//! assert_eq!(array.capacity(), 8);
//! ```
//!
//! # Initializer Sequences
//!
//! ```
//! use dynarray::dynarray;
//!
//! let words = dynarray!["foo", "bar", "baz"];
//! assert_eq!(words.len(), 3);
//! assert_eq!(words.capacity(), 3);
//!
//! let zeros = dynarray![0u8; 4];
//! assert_eq!(zeros, [0, 0, 0, 0]);
//! ```
//!
//! # Checked and Unchecked Access
//!
//! Indexing panics on an out-of-range index. `at()` reports it instead:
//!
//! ```
//! use dynarray::{dynarray, DynArrayError};
//!
//! let array = dynarray![10, 20, 30];
//! assert_eq!(array[1], 20);
//! assert_eq!(array.at(2), Ok(&30));
//! assert_eq!(
//!     array.at(3),
//!     Err(DynArrayError::IndexOutOfBounds { index: 3, length: 3 })
//! );
//! ```
//!
//! # Cursors
//!
//! A [`Cursor`] is a random-access position. It is dereferenced through the
//! array and is used to address `insert` and `erase`:
//!
//! ```
//! use dynarray::dynarray;
//!
//! let mut array = dynarray!['A', 'B', 'C'];
//!
//! let inserted = array.insert(array.begin(), 'v');
//! assert_eq!(array[inserted], 'v');
//! assert_eq!(array, ['v', 'A', 'B', 'C']);
//!
//! let next = array.erase(array.begin() + 1);
//! assert_eq!(array[next], 'B');
//! assert_eq!(array, ['v', 'B', 'C']);
//! assert_eq!(array.end() - array.begin(), 3);
//! ```
//!
//! Cursors are invalidated by any operation that reallocates or shifts
//! elements. `is_valid()` tells whether a cursor is still current:
//!
//! ```
//! use dynarray::DynamicArray;
//!
//! let mut array = DynamicArray::with_capacity(1);
//! array.push_back(1);
//! let first = array.begin();
//!
//! array.push_back(2); // full: reallocates
//! assert!(!array.is_valid(first));
//! assert!(array.is_valid(array.begin()));
//! ```
//!
//! # Iterator Support
//!
//! ```
//! use dynarray::dynarray;
//!
//! let mut array = dynarray![1, 2, 3];
//! for value in &mut array {
//!     *value *= 10;
//! }
//! let reversed: Vec<_> = array.iter().rev().copied().collect();
//! assert_eq!(reversed, vec![30, 20, 10]);
//!
//! let owned: Vec<i32> = array.into_iter().collect();
//! assert_eq!(owned, vec![10, 20, 30]);
//! ```
//!
//! ## `no_std` Compatibility
//!
//! Enable the optional `std` feature to get `std::error::Error` for
//! [`DynArrayError`] through `thiserror/std`:
//! ```toml
//! [dependencies]
//! dynarray = { version = "0.1", features = ["std"] }
//! ```

extern crate alloc;

mod array;
mod cursor;
mod error;
mod iter;
mod raw;
mod traits;

// Re-export public types and traits
pub use array::DynamicArray;
pub use cursor::Cursor;
pub use error::DynArrayError;
pub use iter::{IntoIter, Iter, IterMut};
pub use raw::MIN_NON_ZERO_CAPACITY;

/// Creates a [`DynamicArray`] from an initializer sequence.
///
/// - `dynarray![]` creates an empty, unallocated array.
/// - `dynarray![a, b, c]` moves the listed values in; capacity equals their count.
/// - `dynarray![value; count]` holds `count` clones of `value`.
///
/// ```
/// use dynarray::dynarray;
///
/// let array = dynarray![String::from("foo"), String::from("bar")];
/// assert_eq!(array[0], "foo");
///
/// let filled = dynarray![7; 3];
/// assert_eq!(filled, [7, 7, 7]);
/// ```
#[macro_export]
macro_rules! dynarray {
    () => {
        $crate::DynamicArray::new()
    };
    ($value:expr; $count:expr) => {
        $crate::DynamicArray::from_elem($count, $value)
    };
    ($($item:expr),+ $(,)?) => {
        $crate::DynamicArray::from([$($item),+])
    };
}
