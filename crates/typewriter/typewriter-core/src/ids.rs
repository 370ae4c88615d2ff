//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// One mounted text target on a stage.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u32);

/// Handle to a pending timer in a [`crate::timers::TimerQueue`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Monotonic allocator for TargetId.
/// Ids are never reused, so a stale id held by a host simply stops resolving.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_target: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_target(&mut self) -> TargetId {
        let id = TargetId(self.next_target);
        self.next_target = self.next_target.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_target(), TargetId(0));
        assert_eq!(alloc.alloc_target(), TargetId(1));
        assert_eq!(alloc.alloc_target(), TargetId(2));
    }
}
