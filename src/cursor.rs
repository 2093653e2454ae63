use core::cmp::Ordering;
use core::ops::{Add, AddAssign, Sub, SubAssign};

/// A random-access position in a `DynamicArray`.
///
/// A cursor is a plain value: it records a slot index and the layout
/// generation of the array it was taken from, and owns or borrows nothing.
/// It is dereferenced through the array (`array[cursor]`).
///
/// # Invalidation
///
/// Any operation that reallocates the buffer or shifts elements advances the
/// array's generation: growth, `insert*`, `emplace`, `erase*`, `clear`,
/// `swap`, `take`, `assign*` and `clone_from`. Cursors taken before such an
/// operation are stale. `DynamicArray::is_valid` reports staleness, and
/// dereferencing a stale cursor trips a debug assertion. Release builds still
/// bounds-check the access, so a stale cursor can never reach freed or
/// uninitialized memory, but the element it yields is unspecified.
///
/// Cursors are only meaningful for the array that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    index: usize,
    generation: usize,
}

impl Cursor {
    pub(crate) fn new(index: usize, generation: usize) -> Self {
        Self { index, generation }
    }

    /// Slot index this cursor points at.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn generation(&self) -> usize {
        self.generation
    }

    /// Advances to the next slot and returns the updated cursor (pre-increment).
    pub fn inc(&mut self) -> &mut Self {
        *self += 1;
        self
    }

    /// Steps back to the previous slot and returns the updated cursor (pre-decrement).
    pub fn dec(&mut self) -> &mut Self {
        *self -= 1;
        self
    }

    /// Advances to the next slot and returns the position before the move
    /// (post-increment).
    pub fn post_inc(&mut self) -> Self {
        let before = *self;
        *self += 1;
        before
    }

    /// Steps back to the previous slot and returns the position before the move
    /// (post-decrement).
    pub fn post_dec(&mut self) -> Self {
        let before = *self;
        *self -= 1;
        before
    }

    fn offset(self, delta: isize) -> Self {
        debug_assert!(
            self.index.checked_add_signed(delta).is_some(),
            "cursor at {} moved by {} leaves the addressable range",
            self.index,
            delta
        );
        Self {
            index: self.index.wrapping_add_signed(delta),
            generation: self.generation,
        }
    }
}

impl Add<isize> for Cursor {
    type Output = Cursor;

    fn add(self, delta: isize) -> Cursor {
        self.offset(delta)
    }
}

impl Sub<isize> for Cursor {
    type Output = Cursor;

    fn sub(self, delta: isize) -> Cursor {
        self.offset(delta.wrapping_neg())
    }
}

impl AddAssign<isize> for Cursor {
    fn add_assign(&mut self, delta: isize) {
        *self = self.offset(delta);
    }
}

impl SubAssign<isize> for Cursor {
    fn sub_assign(&mut self, delta: isize) {
        *self = self.offset(delta.wrapping_neg());
    }
}

/// Signed element distance between two cursors.
impl Sub<Cursor> for Cursor {
    type Output = isize;

    #[allow(clippy::cast_possible_wrap)]
    fn sub(self, other: Cursor) -> isize {
        (self.index as isize).wrapping_sub(other.index as isize)
    }
}

/// Cursors from different generations are unordered.
impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.generation == other.generation {
            Some(self.index.cmp(&other.index))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_decrement() {
        let mut cursor = Cursor::new(3, 0);

        assert_eq!(cursor.inc().index(), 4);
        assert_eq!(cursor.post_inc().index(), 4);
        assert_eq!(cursor.index(), 5);

        assert_eq!(cursor.dec().index(), 4);
        assert_eq!(cursor.post_dec().index(), 4);
        assert_eq!(cursor.index(), 3);
    }

    #[test]
    fn test_offset_arithmetic() {
        let cursor = Cursor::new(2, 7);

        assert_eq!((cursor + 3).index(), 5);
        assert_eq!((cursor - 2).index(), 0);
        assert_eq!((cursor + 3).generation(), 7);

        let mut moved = cursor;
        moved += 4;
        moved -= 1;
        assert_eq!(moved.index(), 5);
    }

    #[test]
    fn test_distance_is_signed() {
        let a = Cursor::new(2, 0);
        let b = Cursor::new(6, 0);

        assert_eq!(b - a, 4);
        assert_eq!(a - b, -4);
        assert_eq!(a - a, 0);
    }

    #[test]
    fn test_ordering_within_generation() {
        let a = Cursor::new(1, 0);
        let b = Cursor::new(2, 0);

        assert!(a < b);
        assert!(b > a);
        assert_eq!(a.partial_cmp(&a), Some(Ordering::Equal));
    }

    #[test]
    fn test_cross_generation_cursors_are_unordered() {
        let a = Cursor::new(1, 0);
        let b = Cursor::new(1, 1);

        assert_ne!(a, b);
        assert_eq!(a.partial_cmp(&b), None);
    }
}
