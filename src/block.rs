//! The data-block arena: `DATA_BLOCKS` fixed-size blocks, each independently
//! lockable, backed by the same [`AllocTable`] scheme as the inode table.

use std::sync::Mutex;

use dataview::PodMethods;

use crate::{
    alloc_table::AllocTable,
    config::{BLOCK_SIZE, DATA_BLOCKS},
    delay::insert_delay,
    error::Error,
    ids::BlockIdx,
    repr::IndirectBlock,
    sync::lock,
};

pub(crate) struct BlockStore {
    alloc: AllocTable,
    blocks: Box<[Mutex<[u8; BLOCK_SIZE]>]>,
}

impl BlockStore {
    pub(crate) fn new() -> Self {
        Self {
            alloc: AllocTable::new(DATA_BLOCKS),
            blocks: (0..DATA_BLOCKS)
                .map(|_| Mutex::new([0u8; BLOCK_SIZE]))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        }
    }

    /// Allocates a free block and zeroes it, mirroring the reference's
    /// `data_block_alloc` guarantee that a freshly handed-out block never
    /// exposes a previous owner's bytes.
    pub(crate) fn alloc(&self) -> Result<BlockIdx, Error> {
        let idx = self.alloc.alloc().ok_or(Error::NoFreeBlock)?;
        *lock(&self.blocks[idx]) = [0u8; BLOCK_SIZE];
        Ok(BlockIdx::new(idx as u32))
    }

    pub(crate) fn free(&self, idx: BlockIdx) {
        self.alloc.free(idx.as_usize());
    }

    /// Runs `f` with read/write access to the raw bytes of block `idx`.
    pub(crate) fn with_block<R>(&self, idx: BlockIdx, f: impl FnOnce(&mut [u8; BLOCK_SIZE]) -> R) -> R {
        insert_delay();
        let mut guard = lock(&self.blocks[idx.as_usize()]);
        f(&mut guard)
    }

    /// Runs `f` with a typed view of block `idx` interpreted as an indirect
    /// block's address array.
    pub(crate) fn with_indirect<R>(&self, idx: BlockIdx, f: impl FnOnce(&mut IndirectBlock) -> R) -> R {
        self.with_block(idx, |bytes| {
            let view = bytes.as_data_view_mut().get_mut::<IndirectBlock>(0);
            f(view)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_yields_zeroed_block_and_free_allows_reuse() {
        let store = BlockStore::new();
        let idx = store.alloc().unwrap();
        store.with_block(idx, |b| b[0] = 42);
        store.free(idx);

        let idx2 = store.alloc().unwrap();
        assert_eq!(idx2, idx);
        store.with_block(idx2, |b| assert_eq!(b[0], 0));
    }

    #[test]
    fn indirect_block_roundtrips_addresses() {
        let store = BlockStore::new();
        let idx = store.alloc().unwrap();
        store.with_indirect(idx, |ind| {
            assert_eq!(ind.get(0), None);
            ind.set(0, Some(BlockIdx::new(7)));
        });
        store.with_indirect(idx, |ind| {
            assert_eq!(ind.get(0), Some(BlockIdx::new(7)));
        });
    }
}
