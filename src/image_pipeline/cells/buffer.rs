//! Shared view of the working pixel buffer.
//!
//! Every worker gets the same `&CellBuffer`. Writes are expected to stay inside the
//! worker's own cell; reads may land anywhere in the image (convolution neighbourhoods
//! cross cell borders). Each byte is accessed with relaxed loads and stores only, which
//! lowers to ordinary byte moves while keeping concurrent access well defined.

use std::sync::atomic::{AtomicU8, Ordering};

pub struct CellBuffer<'a> {
    bytes: &'a [AtomicU8],
}

impl<'a> CellBuffer<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        // SAFETY: `AtomicU8` has the same size and alignment as `u8`, and the exclusive
        // borrow guarantees nothing else touches `data` non-atomically while the view lives.
        let bytes = unsafe { &*(data as *mut [u8] as *const [AtomicU8]) };
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> u8 {
        self.bytes[index].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, index: usize, value: u8) {
        self.bytes[index].store(value, Ordering::Relaxed);
    }

    #[inline]
    pub fn swap(&self, a: usize, b: usize) {
        let first = self.get(a);
        self.set(a, self.get(b));
        self.set(b, first);
    }
}
