//! vsfs - Fixed on-disk layout constants.
//!
//! Block 0 is the superblock, blocks 1..=32 are the FAT, blocks 33..=40 are
//! the root directory, and everything from block 41 onward is data. None of
//! this is configurable: it is the same for every `m` in `18..=23`.

/// Size of one block, in bytes.
pub const BLOCKSIZE: usize = 2048;

/// Smallest and largest accepted size exponent for `format`.
pub const MIN_SIZE_EXPONENT: u32 = 18;
pub const MAX_SIZE_EXPONENT: u32 = 23;

/// Upper bound on the number of blocks a volume can have; the free bitmap
/// and the FAT's 12-bit block numbers both assume this limit.
pub const MAX_BLOCKCOUNT: u32 = 4096;

/// Block holding the superblock.
pub const SUPERBLOCK_BLOCK: u32 = 0;

/// First and last (inclusive) blocks of the FAT region.
pub const FAT_START_BLOCK: u32 = 1;
pub const FAT_BLOCK_COUNT: u32 = 32;
pub const FAT_END_BLOCK: u32 = FAT_START_BLOCK + FAT_BLOCK_COUNT - 1;

/// FAT entries packed into a single block.
pub const FAT_ENTRIES_PER_BLOCK: usize = BLOCKSIZE / 4;

/// First and last (inclusive) blocks of the root directory region.
pub const ROOT_DIR_START_BLOCK: u32 = FAT_END_BLOCK + 1;
pub const ROOT_DIR_BLOCK_COUNT: u32 = 8;
pub const ROOT_DIR_END_BLOCK: u32 = ROOT_DIR_START_BLOCK + ROOT_DIR_BLOCK_COUNT - 1;

/// Directory entries packed into a single root-directory block.
pub const DIRENTRIES_PER_BLOCK: usize = 16;

/// Exact byte size of one directory entry.
pub const DIRENTRY_SIZE: usize = 128;

/// Total number of directory entries (== total open-file slots).
pub const MAX_FILES: usize = DIRENTRIES_PER_BLOCK * ROOT_DIR_BLOCK_COUNT as usize;

/// First data block; everything at or after this is allocator-managed.
pub const DATA_START_BLOCK: u32 = ROOT_DIR_END_BLOCK + 1;

/// Longest filename accepted, not counting the null terminator.
pub const MAX_FILENAME_LEN: usize = 29;

/// Sentinel FAT value marking the end of a chain. Also used as the
/// "no data yet" value for a directory entry's `startblock`.
pub const FAT_LIST_NULL: u32 = 0;
pub const NO_START_BLOCK: u32 = 0;

/// Splits an absolute block number into (FAT block, offset within it).
pub fn fat_block_and_offset(block_number: u32) -> (usize, usize) {
    let b = block_number & (MAX_BLOCKCOUNT - 1);
    ((b as usize) >> 8, (b as usize) & 0xff)
}
