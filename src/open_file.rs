//! The open-file table: many handles may share the same inode, but each
//! handle owns its own cursor, guarded by its own mutex.

use std::sync::{Mutex, MutexGuard};

use crate::{alloc_table::AllocTable, config::MAX_OPEN_FILES, error::Error, ids::FileHandle, ids::InodeNo};

pub(crate) struct OpenFileSlot {
    pub(crate) inumber: InodeNo,
    pub(crate) offset: usize,
}

pub(crate) struct OpenFileTable {
    alloc: AllocTable,
    slots: Vec<Mutex<OpenFileSlot>>,
}

impl OpenFileTable {
    pub(crate) fn new() -> Self {
        Self {
            alloc: AllocTable::new(MAX_OPEN_FILES),
            slots: (0..MAX_OPEN_FILES)
                .map(|_| {
                    Mutex::new(OpenFileSlot {
                        inumber: InodeNo::new(0),
                        offset: 0,
                    })
                })
                .collect(),
        }
    }

    /// Allocates a handle over `inumber`, with the cursor positioned at
    /// `offset` (0, or end-of-file for `O_APPEND`).
    pub(crate) fn add(&self, inumber: InodeNo, offset: usize) -> Result<FileHandle, Error> {
        let idx = self.alloc.alloc().ok_or(Error::NoFreeHandle)?;
        *self.slots[idx].lock().unwrap_or_else(std::sync::PoisonError::into_inner) = OpenFileSlot { inumber, offset };
        Ok(FileHandle::new(idx as u32))
    }

    pub(crate) fn remove(&self, handle: FileHandle) -> Result<(), Error> {
        if handle.as_usize() >= self.slots.len() {
            return Err(Error::InvalidHandle);
        }
        self.alloc.free(handle.as_usize());
        Ok(())
    }

    pub(crate) fn entry(&self, handle: FileHandle) -> Result<MutexGuard<'_, OpenFileSlot>, Error> {
        let slot = self.slots.get(handle.as_usize()).ok_or(Error::InvalidHandle)?;
        Ok(slot.lock().unwrap_or_else(std::sync::PoisonError::into_inner))
    }
}
