//! Byte-level layouts of the two structures that live *inside* data blocks
//! rather than in the inode table: the indirect block's address array, and
//! a directory's entry records.
//!
//! Both are read and written through [`dataview`], the same zero-copy
//! type-punning approach the teacher crate uses for its own on-disk structs
//! (`repr::InodeBlock`, `repr::DirEntry`, ...): a block is just
//! `[u8; BLOCK_SIZE]`, and a typed view onto it is obtained with
//! `as_data_view()`/`as_data_view_mut()`.

use dataview::Pod;

use crate::{
    config::{INDIRECT_REFS, MAX_FILE_NAME},
    ids::BlockIdx,
};

/// An indirect block's content: `INDIRECT_REFS` block addresses, `-1`
/// meaning "unallocated".
#[derive(Clone, Copy, Pod)]
#[repr(transparent)]
pub(crate) struct IndirectBlock([i32; INDIRECT_REFS]);

const _: () = assert!(size_of::<IndirectBlock>() == crate::config::BLOCK_SIZE);

impl IndirectBlock {
    pub(crate) fn get(&self, i: usize) -> Option<BlockIdx> {
        let v = self.0[i];
        (v >= 0).then(|| BlockIdx::new(v as u32))
    }

    pub(crate) fn set(&mut self, i: usize, value: Option<BlockIdx>) {
        self.0[i] = value.map_or(-1, |b| b.as_usize() as i32);
    }
}

/// A single directory entry: a fixed-size name and an inumber, `-1` meaning
/// "this slot is free".
#[derive(Clone, Copy, Pod)]
#[repr(C)]
pub(crate) struct DirEntry {
    name: [u8; MAX_FILE_NAME],
    inumber: i32,
}

impl DirEntry {
    pub(crate) fn inumber(&self) -> Option<crate::ids::InodeNo> {
        (self.inumber >= 0).then(|| crate::ids::InodeNo::new(self.inumber as u32))
    }

    pub(crate) fn name(&self) -> &[u8] {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        &self.name[..len]
    }

    /// Truncates `name` to `MAX_FILE_NAME - 1` bytes and null-terminates it.
    pub(crate) fn set(&mut self, name: &[u8], inumber: crate::ids::InodeNo) {
        let len = name.len().min(MAX_FILE_NAME - 1);
        self.name = [0; MAX_FILE_NAME];
        self.name[..len].copy_from_slice(&name[..len]);
        self.inumber = inumber.as_usize() as i32;
    }
}

pub(crate) const DIR_ENTRY_SIZE: usize = size_of::<DirEntry>();
