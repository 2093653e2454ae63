use core::mem::{self, ManuallyDrop};
use core::ops::{Index, IndexMut};
use core::ptr;
use core::slice;

use crate::cursor::Cursor;
use crate::error::DynArrayError;
use crate::iter::{Iter, IterMut};
use crate::raw::{capacity_overflow, grown_capacity, RawBuf};

/// A growable, contiguous array of `T` backed by a single heap allocation.
///
/// Slots `[0, len)` hold live elements, slots `[len, capacity)` are allocated
/// but uninitialized. The array exclusively owns its allocation; it is
/// released on drop or by [`shrink_to_fit`](Self::shrink_to_fit) on an empty
/// array, never by [`clear`](Self::clear).
pub struct DynamicArray<T> {
    buf: RawBuf<T>,
    len: usize,
    generation: usize,
}

impl<T> DynamicArray<T> {
    /// Creates an empty array without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: RawBuf::new(),
            len: 0,
            generation: 0,
        }
    }

    /// Creates an empty array with room for exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the allocation size overflows `isize::MAX` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: RawBuf::with_capacity(capacity),
            len: 0,
            generation: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots in the current allocation.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Ensures the array can hold at least `capacity` elements in total.
    ///
    /// Allocates exactly `capacity` slots when the current allocation is
    /// smaller. Never shrinks. A reallocation invalidates all cursors.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.capacity() {
            self.reallocate(capacity);
        }
    }

    /// Releases unused capacity.
    ///
    /// An empty array returns to the unallocated state. Otherwise the elements
    /// are moved into an allocation of exactly `len` slots.
    pub fn shrink_to_fit(&mut self) {
        if self.len == 0 {
            if self.capacity() != 0 {
                self.buf = RawBuf::new();
                self.invalidate();
            }
        } else if self.len < self.capacity() {
            self.reallocate(self.len);
        }
    }

    /// Makes room for `additional` more elements using the doubling policy.
    pub(crate) fn grow_for(&mut self, additional: usize) {
        let Some(required) = self.len.checked_add(additional) else {
            capacity_overflow()
        };
        if required > self.capacity() {
            self.reallocate(grown_capacity(self.capacity(), required));
        }
    }

    // The new block is fully populated before the old one is released.
    fn reallocate(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.len);
        let fresh = RawBuf::with_capacity(capacity);
        // SAFETY: both blocks hold at least `len` slots and never overlap. The
        // old copies become moved-from bits that the old block's drop ignores.
        unsafe {
            ptr::copy_nonoverlapping(self.buf.as_ptr(), fresh.as_ptr(), self.len);
        }
        self.buf = fresh;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots [0, len) are live and the pointer is non-null and aligned
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: slots [0, len) are live and uniquely borrowed through &mut self
        unsafe { slice::from_raw_parts_mut(self.buf.as_ptr(), self.len) }
    }

    /// Returns the element at `index`, or `None` if it is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Bounds-checked access.
    ///
    /// # Errors
    ///
    /// Returns `DynArrayError::IndexOutOfBounds` if `index >= len`. The array
    /// is left unchanged.
    pub fn at(&self, index: usize) -> Result<&T, DynArrayError> {
        self.get(index).ok_or(DynArrayError::IndexOutOfBounds {
            index,
            length: self.len,
        })
    }

    /// Bounds-checked mutable access.
    ///
    /// # Errors
    ///
    /// Returns `DynArrayError::IndexOutOfBounds` if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, DynArrayError> {
        let length = self.len;
        self.get_mut(index)
            .ok_or(DynArrayError::IndexOutOfBounds { index, length })
    }

    /// Returns the element at `index` without a bounds check.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`. Debug builds assert this.
    #[must_use]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(
            index < self.len,
            "Index {} out of bounds for array of length {}",
            index,
            self.len
        );
        &*self.buf.as_ptr().add(index)
    }

    /// Mutable counterpart of [`get_unchecked`](Self::get_unchecked).
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`. Debug builds assert this.
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(
            index < self.len,
            "Index {} out of bounds for array of length {}",
            index,
            self.len
        );
        &mut *self.buf.as_ptr().add(index)
    }

    /// First element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[must_use]
    pub fn front(&self) -> &T {
        match self.as_slice().first() {
            Some(value) => value,
            None => empty_array("front"),
        }
    }

    /// # Panics
    ///
    /// Panics if the array is empty.
    pub fn front_mut(&mut self) -> &mut T {
        match self.as_mut_slice().first_mut() {
            Some(value) => value,
            None => empty_array("front_mut"),
        }
    }

    /// Last element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    #[must_use]
    pub fn back(&self) -> &T {
        match self.as_slice().last() {
            Some(value) => value,
            None => empty_array("back"),
        }
    }

    /// # Panics
    ///
    /// Panics if the array is empty.
    pub fn back_mut(&mut self) -> &mut T {
        match self.as_mut_slice().last_mut() {
            Some(value) => value,
            None => empty_array("back_mut"),
        }
    }

    /// Appends `value`, growing by doubling when the array is full.
    ///
    /// Existing elements are only moved as part of a reallocation.
    pub fn push_back(&mut self, value: T) {
        if self.len == self.capacity() {
            self.grow_for(1);
        }
        // SAFETY: len < capacity, so the slot is allocated and uninitialized
        unsafe {
            ptr::write(self.buf.as_ptr().add(self.len), value);
        }
        self.len += 1;
    }

    /// Appends the value produced by `construct` and returns a reference to it.
    ///
    /// Growth happens before `construct` runs. If it panics, nothing is added.
    pub fn emplace_back<F>(&mut self, construct: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        if self.len == self.capacity() {
            self.grow_for(1);
        }
        // SAFETY: len < capacity; the slot becomes live only after the write
        unsafe {
            let slot = self.buf.as_ptr().add(self.len);
            ptr::write(slot, construct());
            self.len += 1;
            &mut *slot
        }
    }

    /// Removes the last element and returns it, or `None` if the array is empty.
    ///
    /// Capacity is unchanged.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot at the old len - 1 was live and is now outside the live range
        Some(unsafe { ptr::read(self.buf.as_ptr().add(self.len)) })
    }

    /// Drops the elements in `[count, len)`. Does nothing if `count >= len`.
    pub fn truncate(&mut self, count: usize) {
        if count >= self.len {
            return;
        }
        let removed = self.len - count;
        // The live range is cut first so a panicking drop cannot cause a double drop.
        self.len = count;
        // SAFETY: slots [count, count + removed) were live and are no longer tracked
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.buf.as_ptr().add(count),
                removed,
            ));
        }
    }

    /// Drops all elements. Capacity is retained.
    pub fn clear(&mut self) {
        self.truncate(0);
        self.invalidate();
    }

    /// Resizes to `count` elements, filling new slots with values from `fill`.
    ///
    /// Growing past the capacity reallocates to exactly `count` slots.
    /// Shrinking drops the trailing elements and keeps the capacity. This is the
    /// single routine behind [`resize`](Self::resize) and
    /// [`resize_fill`](Self::resize_fill).
    pub fn resize_with<F>(&mut self, count: usize, mut fill: F)
    where
        F: FnMut() -> T,
    {
        if count > self.capacity() {
            self.reallocate(count);
        }
        if count > self.len {
            while self.len < count {
                let value = fill();
                // SAFETY: len < count <= capacity
                unsafe {
                    ptr::write(self.buf.as_ptr().add(self.len), value);
                }
                self.len += 1;
            }
        } else {
            self.truncate(count);
        }
    }

    /// Cursor at the first slot; equal to [`end`](Self::end) when empty.
    #[must_use]
    pub fn begin(&self) -> Cursor {
        Cursor::new(0, self.generation)
    }

    /// Cursor one past the last live slot.
    #[must_use]
    pub fn end(&self) -> Cursor {
        Cursor::new(self.len, self.generation)
    }

    /// Cursor at `index`, stamped with the current generation.
    #[must_use]
    pub fn cursor(&self, index: usize) -> Cursor {
        Cursor::new(index, self.generation)
    }

    /// Whether `cursor` was taken after the last layout change and still
    /// points inside `[begin, end]`.
    #[must_use]
    pub fn is_valid(&self, cursor: Cursor) -> bool {
        cursor.generation() == self.generation && cursor.index() <= self.len
    }

    fn position(&self, cursor: Cursor) -> usize {
        debug_assert!(
            cursor.generation() == self.generation,
            "stale cursor: taken at generation {} but array is at generation {}",
            cursor.generation(),
            self.generation
        );
        let index = cursor.index();
        assert!(
            index <= self.len,
            "Cursor position {} out of bounds for array of length {}",
            index,
            self.len
        );
        index
    }

    /// Inserts `value` before `position` and returns a cursor to it.
    ///
    /// # Panics
    ///
    /// Panics if `position` is past `end()`.
    pub fn insert(&mut self, position: Cursor, value: T) -> Cursor {
        let index = self.position(position);
        if self.len == self.capacity() {
            self.grow_for(1);
        }
        // SAFETY: index <= len < capacity; ptr::copy handles the overlapping shift
        unsafe {
            let slot = self.buf.as_ptr().add(index);
            ptr::copy(slot, slot.add(1), self.len - index);
            ptr::write(slot, value);
        }
        self.len += 1;
        self.invalidate();
        self.cursor(index)
    }

    /// Inserts `count` copies of `value` before `position` and returns a cursor
    /// to the first of them (or to `position` when `count` is 0).
    ///
    /// If a clone panics, the array is restored to its previous contents.
    ///
    /// # Panics
    ///
    /// Panics if `position` is past `end()`.
    pub fn insert_n(&mut self, position: Cursor, count: usize, value: T) -> Cursor
    where
        T: Clone,
    {
        let index = self.position(position);
        if count == 0 {
            return self.cursor(index);
        }
        let mut gap = self.open_gap(index, count);
        for _ in 1..count {
            gap.push(value.clone());
        }
        gap.push(value);
        gap.close();
        self.cursor(index)
    }

    /// Inserts the items of `items` before `position`, in order, and returns a
    /// cursor to the first inserted element.
    ///
    /// The items are collected before any element is shifted, so a panicking
    /// iterator leaves the array untouched.
    ///
    /// # Panics
    ///
    /// Panics if `position` is past `end()`.
    pub fn insert_iter<I>(&mut self, position: Cursor, items: I) -> Cursor
    where
        I: IntoIterator<Item = T>,
    {
        let index = self.position(position);
        let staged: DynamicArray<T> = items.into_iter().collect();
        if staged.is_empty() {
            return self.cursor(index);
        }
        let mut gap = self.open_gap(index, staged.len());
        for value in staged {
            gap.push(value);
        }
        gap.close();
        self.cursor(index)
    }

    /// Inserts the value produced by `construct` before `position`.
    ///
    /// The value is written directly into the opened slot. If `construct`
    /// panics, the array is restored.
    ///
    /// # Panics
    ///
    /// Panics if `position` is past `end()`.
    pub fn emplace<F>(&mut self, position: Cursor, construct: F) -> Cursor
    where
        F: FnOnce() -> T,
    {
        let index = self.position(position);
        let mut gap = self.open_gap(index, 1);
        gap.push(construct());
        gap.close();
        self.cursor(index)
    }

    // Shifts [index, len) up by `count`, growing first if needed.
    fn open_gap(&mut self, index: usize, count: usize) -> Gap<'_, T> {
        self.grow_for(count);
        let tail = self.len - index;
        // SAFETY: capacity >= len + count, so the shifted tail stays in bounds
        unsafe {
            let base = self.buf.as_ptr().add(index);
            ptr::copy(base, base.add(count), tail);
        }
        // Only the prefix stays tracked while the gap is open.
        self.len = index;
        Gap {
            array: self,
            index,
            count,
            written: 0,
            tail,
        }
    }

    /// Removes the element at `position` and returns a cursor to the element
    /// that takes its place (`end()` if it was the last one).
    ///
    /// # Panics
    ///
    /// Panics if `position` does not point at a live element.
    pub fn erase(&mut self, position: Cursor) -> Cursor {
        let index = self.position(position);
        assert!(
            index < self.len,
            "Cannot erase at position {} in array of length {}",
            index,
            self.len
        );
        self.remove_span(index, index + 1)
    }

    /// Removes the elements in `[first, last)` and returns a cursor to the
    /// element now at `first`.
    ///
    /// # Panics
    ///
    /// Panics if either cursor is past `end()` or `first` is after `last`.
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Cursor {
        let start = self.position(first);
        let end = self.position(last);
        assert!(
            start <= end,
            "Erase range start {} is after end {}",
            start,
            end
        );
        self.remove_span(start, end)
    }

    fn remove_span(&mut self, start: usize, end: usize) -> Cursor {
        if start == end {
            return self.cursor(start);
        }
        let tail = self.len - end;
        // A panicking drop leaks the tail instead of double-dropping it.
        self.len = start;
        // SAFETY: [start, end) are live and dropped once; the tail is moved
        // down over them with an overlap-safe copy.
        unsafe {
            let base = self.buf.as_ptr();
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), end - start));
            ptr::copy(base.add(end), base.add(start), tail);
        }
        self.len = start + tail;
        self.invalidate();
        self.cursor(start)
    }

    /// Exchanges contents and allocations with `other` in constant time.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.buf, &mut other.buf);
        mem::swap(&mut self.len, &mut other.len);
        self.invalidate();
        other.invalidate();
    }

    /// Moves the contents out, leaving `self` empty and unallocated.
    #[must_use]
    pub fn take(&mut self) -> Self {
        let taken = Self {
            buf: mem::replace(&mut self.buf, RawBuf::new()),
            len: mem::replace(&mut self.len, 0),
            generation: 0,
        };
        self.invalidate();
        taken
    }

    /// Replaces the contents with `count` copies of `value`.
    ///
    /// Existing capacity is reused when sufficient.
    pub fn assign(&mut self, count: usize, value: T)
    where
        T: Clone,
    {
        self.clear();
        self.resize_fill(count, value);
    }

    /// Replaces the contents with clones of `items`.
    pub fn assign_from_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.clear();
        self.reserve(items.len());
        for item in items {
            self.push_back(item.clone());
        }
    }

    /// Replaces the contents with the items of `items`.
    pub fn assign_iter<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        self.extend(items);
    }

    /// Returns an iterator over the elements.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.as_slice())
    }

    /// Returns an iterator that allows modifying each element.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.as_mut_slice())
    }

    pub(crate) fn into_raw_parts(self) -> (RawBuf<T>, usize) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the buffer is moved out exactly once
        let buf = unsafe { ptr::read(&this.buf) };
        (buf, this.len)
    }
}

impl<T: Default> DynamicArray<T> {
    /// Creates an array of `count` default values.
    #[must_use]
    pub fn with_len(count: usize) -> Self {
        let mut array = Self::with_capacity(count);
        array.resize(count);
        array
    }

    /// Resizes to `count`, default-constructing new elements.
    pub fn resize(&mut self, count: usize) {
        self.resize_with(count, T::default);
    }
}

impl<T: Clone> DynamicArray<T> {
    /// Creates an array of `count` copies of `value`.
    #[must_use]
    pub fn from_elem(count: usize, value: T) -> Self {
        let mut array = Self::with_capacity(count);
        array.resize_fill(count, value);
        array
    }

    /// Resizes to `count`, cloning `value` into each new slot. `value` itself
    /// is dropped on return.
    pub fn resize_fill(&mut self, count: usize, value: T) {
        self.resize_with(count, || value.clone());
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: slots [0, len) are live; the buffer is released afterwards by RawBuf
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.as_ptr(), self.len));
        }
    }
}

impl<T> Index<usize> for DynamicArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.as_slice().get(index) {
            Some(value) => value,
            None => index_out_of_bounds(index, self.len),
        }
    }
}

impl<T> IndexMut<usize> for DynamicArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let length = self.len;
        match self.as_mut_slice().get_mut(index) {
            Some(value) => value,
            None => index_out_of_bounds(index, length),
        }
    }
}

impl<T> Index<Cursor> for DynamicArray<T> {
    type Output = T;

    fn index(&self, cursor: Cursor) -> &T {
        debug_assert!(
            cursor.generation() == self.generation,
            "stale cursor: taken at generation {} but array is at generation {}",
            cursor.generation(),
            self.generation
        );
        &self[cursor.index()]
    }
}

impl<T> IndexMut<Cursor> for DynamicArray<T> {
    fn index_mut(&mut self, cursor: Cursor) -> &mut T {
        debug_assert!(
            cursor.generation() == self.generation,
            "stale cursor: taken at generation {} but array is at generation {}",
            cursor.generation(),
            self.generation
        );
        &mut self[cursor.index()]
    }
}

/// Elements moved out of the way by `open_gap`, waiting for the gap to be filled.
///
/// Dropped without `close` (a panic while producing values), it drops what was
/// written and moves the tail back, restoring the previous contents.
struct Gap<'a, T> {
    array: &'a mut DynamicArray<T>,
    index: usize,
    count: usize,
    written: usize,
    tail: usize,
}

impl<T> Gap<'_, T> {
    fn push(&mut self, value: T) {
        debug_assert!(self.written < self.count);
        // SAFETY: the slot lies inside the gap opened by open_gap
        unsafe {
            ptr::write(
                self.array.buf.as_ptr().add(self.index + self.written),
                value,
            );
        }
        self.written += 1;
    }

    fn close(self) {
        debug_assert_eq!(self.written, self.count);
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped again; reading the reference out is a plain copy
        let array = unsafe { ptr::read(&this.array) };
        array.len = this.index + this.count + this.tail;
        array.invalidate();
    }
}

impl<T> Drop for Gap<'_, T> {
    fn drop(&mut self) {
        // SAFETY: [index, index + written) were written by push; the tail sits
        // at index + count and moves back to index.
        unsafe {
            let base = self.array.buf.as_ptr().add(self.index);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base, self.written));
            ptr::copy(base.add(self.count), base, self.tail);
        }
        self.array.len = self.index + self.tail;
        self.array.invalidate();
    }
}

#[cold]
#[inline(never)]
fn empty_array(operation: &str) -> ! {
    panic!("{}() called on an empty array", operation);
}

#[cold]
#[inline(never)]
fn index_out_of_bounds(index: usize, length: usize) -> ! {
    panic!(
        "Index {} out of bounds for array of length {}",
        index, length
    );
}
