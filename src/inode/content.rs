//! Two-level block addressing for a single inode: `DIRECT_BLOCKS` direct
//! slots followed by one indirection through a single indirect block.
//!
//! Every function here takes an already-locked [`InodeFields`] reference; the
//! caller (in `ops.rs`) acquires the inode's `RwLock` exactly once per
//! operation and holds it for the whole block walk, rather than re-acquiring
//! it per block as the reference implementation's `find_block` equivalent
//! mistakenly did.

use crate::{
    block::BlockStore,
    config::{DIRECT_BLOCKS, INDIRECT_REFS},
    error::Error,
    inode::InodeFields,
};

/// Resolves logical block `index` (0-based) of a file to a physical block,
/// allocating direct slots and the indirect block itself on demand when
/// `allow_alloc` is set. When `allow_alloc` is false (reads), an unallocated
/// slot is a logic error: `size` only grows as bytes are actually stored, so
/// a read within `[0, size)` must land on an already-allocated block.
pub(crate) fn resolve_block(
    fields: &mut InodeFields,
    blocks: &BlockStore,
    index: usize,
    allow_alloc: bool,
) -> Result<crate::ids::BlockIdx, Error> {
    if index >= DIRECT_BLOCKS + INDIRECT_REFS {
        return Err(Error::OffsetOutOfRange);
    }

    if index < DIRECT_BLOCKS {
        if let Some(b) = fields.direct[index] {
            return Ok(b);
        }
        if !allow_alloc {
            return Err(Error::BlockNotAllocated);
        }
        let b = blocks.alloc()?;
        fields.direct[index] = Some(b);
        return Ok(b);
    }

    let indirect_index = index - DIRECT_BLOCKS;
    let indirect = match fields.indirect {
        Some(b) => b,
        None => {
            if !allow_alloc {
                return Err(Error::BlockNotAllocated);
            }
            let b = blocks.alloc()?;
            fields.indirect = Some(b);
            b
        }
    };

    blocks.with_indirect(indirect, |view| {
        if let Some(b) = view.get(indirect_index) {
            return Ok(b);
        }
        if !allow_alloc {
            return Err(Error::BlockNotAllocated);
        }
        let b = blocks.alloc()?;
        view.set(indirect_index, Some(b));
        Ok(b)
    })
}

/// Read-only counterpart of [`resolve_block`], for callers holding only a
/// read lock on the inode (regular file reads, directory lookups). Never
/// allocates; an unallocated slot is [`Error::BlockNotAllocated`].
pub(crate) fn resolve_block_ro(
    fields: &InodeFields,
    blocks: &BlockStore,
    index: usize,
) -> Result<crate::ids::BlockIdx, Error> {
    if index >= DIRECT_BLOCKS + INDIRECT_REFS {
        return Err(Error::OffsetOutOfRange);
    }

    if index < DIRECT_BLOCKS {
        return fields.direct[index].ok_or(Error::BlockNotAllocated);
    }

    let indirect_index = index - DIRECT_BLOCKS;
    let indirect = fields.indirect.ok_or(Error::BlockNotAllocated)?;
    blocks.with_indirect(indirect, |view| view.get(indirect_index).ok_or(Error::BlockNotAllocated))
}

/// Visits every block index currently allocated to `fields` (direct slots
/// that are `Some`, plus every allocated slot of the indirect block, if any).
fn for_each_allocated_block(fields: &InodeFields, blocks: &BlockStore, mut f: impl FnMut(crate::ids::BlockIdx)) {
    for slot in fields.direct {
        if let Some(b) = slot {
            f(b);
        }
    }
    if let Some(indirect) = fields.indirect {
        blocks.with_indirect(indirect, |view| {
            for i in 0..INDIRECT_REFS {
                if let Some(b) = view.get(i) {
                    f(b);
                }
            }
        });
    }
}

/// Frees every data block currently referenced by `fields` and resets
/// `size` to 0.
///
/// Matches the reference's truncation behavior exactly: the direct and
/// indirect *slot values themselves* are left as they were (not reset to
/// `None`), and the indirect block's own storage is never freed, only the
/// content blocks it points at. [`reset_if_empty`] is what closes the one
/// gap this leaves open, at the one call site that needs it.
pub(crate) fn truncate(fields: &mut InodeFields, blocks: &BlockStore) {
    for_each_allocated_block(fields, blocks, |b| blocks.free(b));
    fields.size = 0;
}

/// Resets the direct/indirect bookkeeping to "nothing allocated" when the
/// inode is empty.
///
/// Without this, a write to a just-truncated (or freshly created and never
/// written) inode would walk into stale slot values left behind by
/// [`truncate`] and treat an already-freed block index as if this inode
/// still owned it, silently handing the same block to two inodes once the
/// allocator reassigns it elsewhere. Only safe to call when `size == 0`:
/// at that point every block the stale slots name has already been freed by
/// whichever truncation zeroed `size`.
pub(crate) fn reset_if_empty(fields: &mut InodeFields) {
    if fields.size == 0 {
        fields.direct = [None; DIRECT_BLOCKS];
        fields.indirect = None;
    }
}
