//! The public façade: a [`Filesystem`] handle exposing create/open/read/
//! write/close over the single root directory.

use bitflags::bitflags;
use log::trace;

use crate::{
    block::BlockStore,
    config::{BLOCK_SIZE, ROOT_DIR_INUM},
    error::Error,
    ids::{FileHandle, InodeNo},
    inode::{
        content::{reset_if_empty, resolve_block, resolve_block_ro, truncate},
        directory::{add_dir_entry, find_in_dir},
        InodeStore, Kind,
    },
    open_file::OpenFileTable,
};

bitflags! {
    /// Flags accepted by [`Filesystem::open`]. `O_START` (no flags set) opens
    /// an existing file at offset 0 and fails if it doesn't exist.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        /// Create the file if it does not already exist.
        const CREAT = 1 << 0;
        /// Truncate an existing file to size 0 on open.
        const TRUNC = 1 << 1;
        /// Position the cursor at end-of-file rather than 0.
        const APPEND = 1 << 2;
    }
}

/// A live filesystem: the inode table, data-block arena, and open-file
/// table, plus the inumber of the one root directory every path is looked
/// up in.
pub struct Filesystem {
    inodes: InodeStore,
    blocks: BlockStore,
    open_files: OpenFileTable,
    root: InodeNo,
}

impl Filesystem {
    /// Builds an empty filesystem with a fresh root directory.
    pub fn init() -> Result<Self, Error> {
        let inodes = InodeStore::new();
        let blocks = BlockStore::new();
        let open_files = OpenFileTable::new();
        let root = inodes.create(Kind::Directory)?;
        debug_assert_eq!(root.as_usize(), ROOT_DIR_INUM as usize);
        Ok(Self {
            inodes,
            blocks,
            open_files,
            root,
        })
    }

    fn entry_name(path: &str) -> Result<&str, Error> {
        let name = path.strip_prefix('/').ok_or(Error::InvalidPath)?;
        if name.is_empty() {
            return Err(Error::InvalidPath);
        }
        Ok(name)
    }

    /// Resolves `path` (`/name`) to the inumber of the entry it names.
    pub fn lookup(&self, path: &str) -> Result<InodeNo, Error> {
        let name = Self::entry_name(path)?;
        find_in_dir(&self.inodes, &self.blocks, self.root, name.as_bytes())?.ok_or(Error::NotFound)
    }

    /// Opens `path`, returning a handle with its own cursor.
    ///
    /// Without `CREAT`, a missing path is [`Error::NotFound`]. With
    /// `TRUNC`, an existing file's content is freed and its size reset to 0
    /// before the handle is handed out. With `APPEND`, the cursor starts at
    /// end-of-file; otherwise it starts at 0.
    pub fn open(&self, path: &str, flags: OpenFlags) -> Result<FileHandle, Error> {
        let name = Self::entry_name(path)?;
        let existing = find_in_dir(&self.inodes, &self.blocks, self.root, name.as_bytes())?;

        let inum = match existing {
            Some(inum) => inum,
            None => {
                if !flags.contains(OpenFlags::CREAT) {
                    return Err(Error::NotFound);
                }
                let inum = self.inodes.create(Kind::File)?;
                add_dir_entry(&self.inodes, &self.blocks, self.root, name.as_bytes(), inum)?;
                trace!("created inode {} for {path}", inum.as_usize());
                inum
            }
        };

        let offset = {
            let mut fields = self.inodes.write_fields(inum)?;
            if fields.kind != Kind::File {
                return Err(Error::NotADirectory);
            }
            if flags.contains(OpenFlags::TRUNC) {
                truncate(&mut fields, &self.blocks);
            }
            if flags.contains(OpenFlags::APPEND) {
                fields.size
            } else {
                0
            }
        };

        self.open_files.add(inum, offset)
    }

    /// Releases `handle`. The underlying inode and its content are
    /// unaffected; other handles open on the same inode keep working.
    pub fn close(&self, handle: FileHandle) -> Result<(), Error> {
        self.open_files.remove(handle)
    }

    /// Reads up to `buf.len()` bytes starting at the handle's cursor,
    /// advancing it by the number of bytes actually read.
    pub fn read(&self, handle: FileHandle, buf: &mut [u8]) -> Result<usize, Error> {
        let mut slot = self.open_files.entry(handle)?;
        let fields = self.inodes.read_fields(slot.inumber)?;

        let remaining = fields.size.saturating_sub(slot.offset);
        let to_read = buf.len().min(remaining);

        let mut done = 0;
        while done < to_read {
            let pos = slot.offset + done;
            let block_index = pos / BLOCK_SIZE;
            let in_block_offset = pos % BLOCK_SIZE;
            let block = resolve_block_ro(&fields, &self.blocks, block_index)?;
            let chunk = (BLOCK_SIZE - in_block_offset).min(to_read - done);
            self.blocks.with_block(block, |bytes| {
                buf[done..done + chunk].copy_from_slice(&bytes[in_block_offset..in_block_offset + chunk]);
            });
            done += chunk;
        }
        slot.offset += done;
        Ok(done)
    }

    /// Writes `buf` starting at the handle's cursor, allocating blocks on
    /// demand, and advances the cursor by the number of bytes actually
    /// written. The inode's write lock is held for the whole call, not
    /// re-acquired per block.
    pub fn write(&self, handle: FileHandle, buf: &[u8]) -> Result<usize, Error> {
        let mut slot = self.open_files.entry(handle)?;
        let mut fields = self.inodes.write_fields(slot.inumber)?;
        reset_if_empty(&mut fields);

        let mut done = 0;
        while done < buf.len() {
            let pos = slot.offset + done;
            let block_index = pos / BLOCK_SIZE;
            let in_block_offset = pos % BLOCK_SIZE;
            let block = match resolve_block(&mut fields, &self.blocks, block_index, true) {
                Ok(block) => block,
                Err(err) if done > 0 => {
                    slot.offset += done;
                    fields.size = fields.size.max(slot.offset);
                    return Err(err);
                }
                Err(err) => return Err(err),
            };
            let chunk = (BLOCK_SIZE - in_block_offset).min(buf.len() - done);
            self.blocks.with_block(block, |bytes| {
                bytes[in_block_offset..in_block_offset + chunk].copy_from_slice(&buf[done..done + chunk]);
            });
            done += chunk;
        }
        slot.offset += done;
        fields.size = fields.size.max(slot.offset);
        Ok(done)
    }

    /// Copies the full content of `src_path` to `dst`, in block-sized
    /// chunks, without affecting any open handle's cursor.
    pub fn copy_to_external_fs<W: std::io::Write>(&self, src_path: &str, mut dst: W) -> Result<(), Error> {
        let inum = self.lookup(src_path)?;
        let fields = self.inodes.read_fields(inum)?;

        let mut remaining = fields.size;
        let mut block_index = 0;
        while remaining > 0 {
            let block = resolve_block_ro(&fields, &self.blocks, block_index)?;
            let chunk = remaining.min(BLOCK_SIZE);
            self.blocks.with_block(block, |bytes| dst.write_all(&bytes[..chunk]))?;
            remaining -= chunk;
            block_index += 1;
        }
        Ok(())
    }

    /// Consumes the filesystem, releasing every table and block it owns.
    /// Equivalent to dropping it; kept as an explicit call site for callers
    /// that want one.
    pub fn destroy(self) {}
}
