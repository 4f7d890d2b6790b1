//! The inode table: fixed-capacity, each live inode guarded by its own
//! `RwLock`, lazily holding either a regular file's or the root directory's
//! bookkeeping.

pub(crate) mod content;
pub(crate) mod directory;

use std::sync::RwLock;

use crate::{
    alloc_table::AllocTable,
    config::{DIRECT_BLOCKS, INODE_TABLE_SIZE},
    delay::insert_delay,
    error::Error,
    ids::{BlockIdx, InodeNo},
    sync::{read, write},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    File,
    Directory,
}

/// An inode's mutable fields, guarded by the per-slot `RwLock`.
///
/// Residual `direct`/`indirect` entries are not reset to `None` when the
/// blocks they reference are freed by truncation or deletion; see
/// [`content::reset_if_empty`] for the one place this matters.
pub(crate) struct InodeFields {
    pub(crate) kind: Kind,
    pub(crate) size: usize,
    pub(crate) direct: [Option<BlockIdx>; DIRECT_BLOCKS],
    pub(crate) indirect: Option<BlockIdx>,
}

impl InodeFields {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            size: 0,
            direct: [None; DIRECT_BLOCKS],
            indirect: None,
        }
    }
}

pub(crate) struct InodeStore {
    alloc: AllocTable,
    slots: Vec<RwLock<InodeFields>>,
}

impl InodeStore {
    pub(crate) fn new() -> Self {
        Self {
            alloc: AllocTable::new(INODE_TABLE_SIZE),
            slots: (0..INODE_TABLE_SIZE)
                .map(|_| RwLock::new(InodeFields::new(Kind::File)))
                .collect(),
        }
    }

    pub(crate) fn create(&self, kind: Kind) -> Result<InodeNo, Error> {
        let idx = self.alloc.alloc().ok_or(Error::NoFreeInode)?;
        *write(&self.slots[idx]) = InodeFields::new(kind);
        Ok(InodeNo::new(idx as u32))
    }

    /// Frees the inode's slot in the table. Callers are responsible for
    /// truncating its content (freeing referenced data blocks) first.
    pub(crate) fn delete(&self, inum: InodeNo) {
        self.alloc.free(inum.as_usize());
    }

    pub(crate) fn fields(&self, inum: InodeNo) -> Result<&RwLock<InodeFields>, Error> {
        insert_delay();
        self.slots.get(inum.as_usize()).ok_or(Error::InvalidInode)
    }

    pub(crate) fn read_fields(&self, inum: InodeNo) -> Result<std::sync::RwLockReadGuard<'_, InodeFields>, Error> {
        Ok(read(self.fields(inum)?))
    }

    pub(crate) fn write_fields(&self, inum: InodeNo) -> Result<std::sync::RwLockWriteGuard<'_, InodeFields>, Error> {
        Ok(write(self.fields(inum)?))
    }
}
