use alloc::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use core::marker::PhantomData;
use core::mem;
use core::ptr::NonNull;

/// Capacity of the first allocation made by the growth policy.
pub const MIN_NON_ZERO_CAPACITY: usize = 1;

/// Owning handle to an uninitialized block of `capacity` slots of `T`.
///
/// `RawBuf` knows nothing about which slots are live. It never constructs or
/// drops a `T`; it only allocates and releases the block. The owner tracks the
/// live range and is responsible for dropping elements before the buffer goes.
///
/// A buffer with capacity 0 holds no allocation. Zero-sized types never
/// allocate, their capacity is bookkeeping only.
pub(crate) struct RawBuf<T> {
    ptr: NonNull<T>,
    cap: usize,
    _marker: PhantomData<T>,
}

// SAFETY: RawBuf uniquely owns its block, so it can move between threads
// whenever the elements it holds can.
unsafe impl<T: Send> Send for RawBuf<T> {}
// SAFETY: shared access to RawBuf only hands out shared access to elements.
unsafe impl<T: Sync> Sync for RawBuf<T> {}

impl<T> RawBuf<T> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    pub(crate) const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            _marker: PhantomData,
        }
    }

    /// Allocates a block of exactly `capacity` slots.
    ///
    /// Allocation failure is not recoverable: the global allocation error
    /// handler is invoked, which terminates the process.
    ///
    /// # Panics
    ///
    /// Panics with "capacity overflow" if the block would exceed `isize::MAX` bytes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            return Self::new();
        }
        if Self::IS_ZST {
            return Self {
                ptr: NonNull::dangling(),
                cap: capacity,
                _marker: PhantomData,
            };
        }

        let layout = Self::layout(capacity);
        // SAFETY: capacity > 0 and T is not zero-sized, so the layout has non-zero size
        let raw = unsafe { alloc(layout) };
        let Some(ptr) = NonNull::new(raw.cast::<T>()) else {
            handle_alloc_error(layout)
        };

        Self {
            ptr,
            cap: capacity,
            _marker: PhantomData,
        }
    }

    fn layout(capacity: usize) -> Layout {
        match Layout::array::<T>(capacity) {
            Ok(layout) => layout,
            Err(_) => capacity_overflow(),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub(crate) fn is_allocated(&self) -> bool {
        self.cap != 0 && !Self::IS_ZST
    }
}

impl<T> Drop for RawBuf<T> {
    fn drop(&mut self) {
        if self.is_allocated() {
            // SAFETY: the block was allocated in with_capacity with this exact layout
            unsafe {
                dealloc(self.ptr.as_ptr().cast::<u8>(), Self::layout(self.cap));
            }
        }
    }
}

#[cold]
#[inline(never)]
pub(crate) fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

/// Next capacity when `required` slots are needed and `capacity` is not enough.
///
/// Starts from `capacity` (at least [`MIN_NON_ZERO_CAPACITY`]) and doubles until
/// the requirement is met. If doubling would overflow, the exact requirement is
/// returned instead.
pub(crate) fn grown_capacity(capacity: usize, required: usize) -> usize {
    let mut next = capacity.max(MIN_NON_ZERO_CAPACITY);
    while next < required {
        next = match next.checked_mul(2) {
            Some(doubled) => doubled,
            None => return required,
        };
    }
    next
}
