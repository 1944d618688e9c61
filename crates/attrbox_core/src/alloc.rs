//! Buffer allocation capability.
//!
//! The container never touches the heap directly: creation, growth and release go
//! through a [`BufferAllocator`], so an embedder can route guest memory through its own
//! pool or impose a ceiling.

/// Allocate, reallocate-or-fail, free.
pub trait BufferAllocator {
    /// Returns an empty vector able to hold at least `capacity` bytes.
    fn allocate(&self, capacity: usize) -> Option<Vec<u8>>;

    /// Grows `buf` so that it can hold at least `capacity` bytes. On failure `buf` is
    /// left as it was and `false` is returned.
    fn reallocate(&self, buf: &mut Vec<u8>, capacity: usize) -> bool;

    fn release(&self, buf: Vec<u8>) {
        drop(buf);
    }
}

/// Global heap, with allocation failure reported instead of aborting.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl BufferAllocator for SystemAllocator {
    fn allocate(&self, capacity: usize) -> Option<Vec<u8>> {
        let mut v = Vec::new();
        v.try_reserve_exact(capacity).ok()?;
        Some(v)
    }

    fn reallocate(&self, buf: &mut Vec<u8>, capacity: usize) -> bool {
        let extra = capacity.saturating_sub(buf.len());
        buf.try_reserve_exact(extra).is_ok()
    }
}

/// Fails every request above `max_bytes`; otherwise behaves like [`SystemAllocator`].
#[derive(Debug, Clone, Copy)]
pub struct CappedAllocator {
    pub max_bytes: usize,
}

impl CappedAllocator {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

impl BufferAllocator for CappedAllocator {
    fn allocate(&self, capacity: usize) -> Option<Vec<u8>> {
        if capacity > self.max_bytes { return None; }
        SystemAllocator.allocate(capacity)
    }

    fn reallocate(&self, buf: &mut Vec<u8>, capacity: usize) -> bool {
        if capacity > self.max_bytes { return false; }
        SystemAllocator.reallocate(buf, capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_reserves_requested_capacity() {
        let mut v = SystemAllocator.allocate(16).unwrap();
        assert!(v.capacity() >= 16);
        v.extend_from_slice(&[1, 2, 3]);
        assert!(SystemAllocator.reallocate(&mut v, 64));
        assert!(v.capacity() >= 64);
        assert_eq!(v, [1, 2, 3]);
    }

    #[test]
    fn capped_refuses_over_limit_and_keeps_buffer() {
        let a = CappedAllocator::new(32);
        assert!(a.allocate(33).is_none());
        let mut v = a.allocate(8).unwrap();
        v.push(7);
        assert!(!a.reallocate(&mut v, 33));
        assert_eq!(v, [7]);
        assert!(a.reallocate(&mut v, 32));
    }
}
