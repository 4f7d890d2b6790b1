//! Failure kinds.
//!
//! The reference design collapses every failure to a single `-1` sentinel.
//! Internally we keep them distinct so callers and tests can tell exhaustion
//! from a bad path from a missing file; every public [`crate::Filesystem`]
//! method still just returns `Result<_, Error>`, which is the idiomatic
//! counterpart of "-1 on any failure".

use thiserror::Error;

/// Errors returned by filesystem operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Path does not start with `/` or has no characters after it.
    #[error("invalid path")]
    InvalidPath,
    /// Directory entry name was empty.
    #[error("directory entry name is empty")]
    EmptyName,
    /// No free slot in the inode table.
    #[error("no free inode")]
    NoFreeInode,
    /// No free slot in the data-block table.
    #[error("no free data block")]
    NoFreeBlock,
    /// No free slot in the open-file table.
    #[error("no free open-file handle")]
    NoFreeHandle,
    /// Inumber is out of range or does not refer to a live inode.
    #[error("invalid inode number")]
    InvalidInode,
    /// Block index is out of range.
    #[error("invalid block index")]
    InvalidBlock,
    /// File handle is out of range.
    #[error("invalid file handle")]
    InvalidHandle,
    /// Inode referenced where a directory was required is not one.
    #[error("inode is not a directory")]
    NotADirectory,
    /// Root directory has no free entry left.
    #[error("directory is full")]
    DirectoryFull,
    /// Path does not resolve to an existing entry.
    #[error("no such file")]
    NotFound,
    /// A block offset fell outside the addressable range for a file.
    #[error("offset exceeds maximum addressable file size")]
    OffsetOutOfRange,
    /// A read or write reached a block position the caller required to
    /// already be allocated, but it was not.
    #[error("block not allocated")]
    BlockNotAllocated,
    /// Forwarded failure from the destination byte sink in
    /// [`crate::Filesystem::copy_to_external_fs`].
    #[error("external copy failed")]
    Io(#[from] std::io::Error),
}
