//! Compile-time parameters of the filesystem.
//!
//! These mirror the `#define`-style constants of the reference design: the
//! reference treats them as build-time knobs, not runtime configuration, so
//! they stay `const` here too.

/// Size in bytes of a single data block.
pub const BLOCK_SIZE: usize = 1024;

/// Number of inode slots in the inode table.
pub const INODE_TABLE_SIZE: usize = 64;

/// Number of data blocks in the arena.
pub const DATA_BLOCKS: usize = 1024;

/// Number of entries in the open-file table.
pub const MAX_OPEN_FILES: usize = 20;

/// Maximum length of a file name, including the terminating null byte.
pub const MAX_FILE_NAME: usize = 40;

/// Number of block indices an inode holds directly.
pub const DIRECT_BLOCKS: usize = 10;

/// Iterations of the opaque busy loop used to simulate storage latency.
pub const DELAY: u32 = 5000;

/// Size in bytes of one block-address slot inside an indirect block.
pub(crate) const BLOCK_ADDR_SIZE: usize = size_of::<i32>();

/// Number of block addresses that fit in a single indirect block.
pub(crate) const INDIRECT_REFS: usize = BLOCK_SIZE / BLOCK_ADDR_SIZE;

/// Largest file size, in bytes, addressable through direct and indirect blocks.
pub const MAX_FILE_SIZE: usize = (DIRECT_BLOCKS + INDIRECT_REFS) * BLOCK_SIZE;

/// How many allocator-table slots are scanned between simulated storage
/// accesses, matching the reference's `sizeof(allocation_state_t)` stride.
pub(crate) const ALLOC_STATE_STRIDE: usize = BLOCK_SIZE / BLOCK_ADDR_SIZE;

/// Inode number of the (only) root directory.
pub const ROOT_DIR_INUM: u32 = 0;
