//! The single flat directory: entries are packed `DirEntry` records stored
//! in the directory inode's own blocks, addressed through the same
//! direct/indirect scheme as file content.

use dataview::PodMethods;

use crate::{
    block::BlockStore,
    config::BLOCK_SIZE,
    error::Error,
    ids::InodeNo,
    inode::{
        content::{resolve_block, resolve_block_ro},
        InodeFields,
    },
    repr::{DirEntry, DIR_ENTRY_SIZE},
    sync::{read, write},
};

const ENTRIES_PER_BLOCK: usize = BLOCK_SIZE / DIR_ENTRY_SIZE;

/// Upper bound on live directory entries. The root directory lives in a
/// single block (`direct[0]`); it never grows into further direct slots or
/// the indirect block the way a regular file's content does.
pub(crate) const MAX_DIR_ENTRIES: usize = ENTRIES_PER_BLOCK;

fn with_entry<R>(
    fields: &mut InodeFields,
    blocks: &BlockStore,
    entry_index: usize,
    f: impl FnOnce(&mut DirEntry) -> R,
) -> Result<R, Error> {
    let block_index = entry_index / ENTRIES_PER_BLOCK;
    let offset_in_block = (entry_index % ENTRIES_PER_BLOCK) * DIR_ENTRY_SIZE;
    let block = resolve_block(fields, blocks, block_index, true)?;
    Ok(blocks.with_block(block, |bytes| f(bytes.as_data_view_mut().get_mut::<DirEntry>(offset_in_block))))
}

/// Read-only counterpart of [`with_entry`], for callers holding only a read
/// lock on the directory inode. Never allocates.
fn with_entry_ro<R>(
    fields: &InodeFields,
    blocks: &BlockStore,
    entry_index: usize,
    f: impl FnOnce(&DirEntry) -> R,
) -> Result<R, Error> {
    let block_index = entry_index / ENTRIES_PER_BLOCK;
    let offset_in_block = (entry_index % ENTRIES_PER_BLOCK) * DIR_ENTRY_SIZE;
    let block = resolve_block_ro(fields, blocks, block_index)?;
    Ok(blocks.with_block(block, |bytes| f(bytes.as_data_view().get::<DirEntry>(offset_in_block))))
}

/// Adds `name -> inumber` to the root directory.
///
/// Takes the directory inode's write lock for the full scan-then-insert, so
/// two threads racing to create the same (or different) entries cannot both
/// observe the same free slot and overwrite each other.
pub(crate) fn add_dir_entry(
    inode_store: &crate::inode::InodeStore,
    blocks: &BlockStore,
    dir_inum: InodeNo,
    name: &[u8],
    inumber: InodeNo,
) -> Result<(), Error> {
    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let mut fields = write(inode_store.fields(dir_inum)?);

    for i in 0..MAX_DIR_ENTRIES {
        let taken = with_entry(&mut fields, blocks, i, |e| e.inumber().is_some())?;
        if !taken {
            with_entry(&mut fields, blocks, i, |e| e.set(name, inumber))?;
            fields.size = fields.size.max((i + 1) * DIR_ENTRY_SIZE);
            return Ok(());
        }
    }
    Err(Error::DirectoryFull)
}

/// Looks up `name` in the root directory.
pub(crate) fn find_in_dir(
    inode_store: &crate::inode::InodeStore,
    blocks: &BlockStore,
    dir_inum: InodeNo,
    name: &[u8],
) -> Result<Option<InodeNo>, Error> {
    let fields = read(inode_store.fields(dir_inum)?);
    let live_entries = fields.size.div_ceil(DIR_ENTRY_SIZE);

    for i in 0..live_entries.min(MAX_DIR_ENTRIES) {
        let found = with_entry_ro(&fields, blocks, i, |e| (e.inumber().is_some() && e.name() == name).then(|| e.inumber().unwrap()))?;
        if let Some(inum) = found {
            return Ok(Some(inum));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inode::{InodeStore, Kind};

    #[test]
    fn add_then_find_round_trips() {
        let inode_store = InodeStore::new();
        let blocks = BlockStore::new();
        let dir = inode_store.create(Kind::Directory).unwrap();
        let file = inode_store.create(Kind::File).unwrap();

        add_dir_entry(&inode_store, &blocks, dir, b"hello.txt", file).unwrap();
        assert_eq!(find_in_dir(&inode_store, &blocks, dir, b"hello.txt").unwrap(), Some(file));
        assert_eq!(find_in_dir(&inode_store, &blocks, dir, b"missing").unwrap(), None);
    }

    #[test]
    fn empty_name_rejected() {
        let inode_store = InodeStore::new();
        let blocks = BlockStore::new();
        let dir = inode_store.create(Kind::Directory).unwrap();
        let file = inode_store.create(Kind::File).unwrap();
        assert!(matches!(add_dir_entry(&inode_store, &blocks, dir, b"", file), Err(Error::EmptyName)));
    }
}
