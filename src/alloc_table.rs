//! Fixed-capacity FREE/TAKEN allocator, shared by the inode table, the
//! data-block table, and the open-file table.
//!
//! Each table is a parallel array of allocation states guarded by its own
//! mutex. `alloc` scans for the first `FREE` slot, ascending from index 0,
//! marks it `TAKEN`, and returns its index; `free` marks a slot `FREE`
//! again. The mutex is never held across any other lock acquisition: it is
//! a leaf in the lock hierarchy.

use std::sync::Mutex;

use crate::{config::ALLOC_STATE_STRIDE, delay::insert_delay, sync::lock};

pub(crate) struct AllocTable {
    taken: Mutex<Box<[bool]>>,
}

impl AllocTable {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            taken: Mutex::new(vec![false; capacity].into_boxed_slice()),
        }
    }

    /// Finds the first free slot, ascending from index 0, marks it taken,
    /// and returns its index. Returns `None` if the table is exhausted.
    pub(crate) fn alloc(&self) -> Option<usize> {
        let mut taken = lock(&self.taken);
        for (i, slot) in taken.iter_mut().enumerate() {
            if i % ALLOC_STATE_STRIDE == 0 {
                insert_delay();
            }
            if !*slot {
                *slot = true;
                return Some(i);
            }
        }
        None
    }

    /// Marks `index` free again.
    ///
    /// Out-of-range indices are a programmer error within this crate (every
    /// caller derives `index` from a value this same table handed out) and
    /// are simply ignored rather than panicking a shared table.
    pub(crate) fn free(&self, index: usize) {
        let mut taken = lock(&self.taken);
        if let Some(slot) = taken.get_mut(index) {
            *slot = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_ascending_first_fit() {
        let table = AllocTable::new(4);
        assert_eq!(table.alloc(), Some(0));
        assert_eq!(table.alloc(), Some(1));
        table.free(0);
        assert_eq!(table.alloc(), Some(0));
        assert_eq!(table.alloc(), Some(2));
        assert_eq!(table.alloc(), Some(3));
        assert_eq!(table.alloc(), None);
    }

    #[test]
    fn free_then_alloc_reuses_slot() {
        let table = AllocTable::new(1);
        assert_eq!(table.alloc(), Some(0));
        assert_eq!(table.alloc(), None);
        table.free(0);
        assert_eq!(table.alloc(), Some(0));
    }
}
