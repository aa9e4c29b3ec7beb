//! vsfs - Free-block allocator
//!
//! A thin view over the superblock's free bitmap. Kept as its own module
//! because spec.md treats allocation as a distinct responsibility from the
//! superblock's role as a metadata container, even though both operate on
//! the same in-memory bit-vector.

use crate::layout::{BLOCKSIZE, DATA_START_BLOCK};

use super::superblock::Superblock;

/// Finds the lowest-indexed free data block, reserves it, and returns its
/// absolute block number. `None` if the data region is exhausted.
pub fn allocate(superblock: &mut Superblock) -> Option<u32> {
    for i in 0..superblock.data_bit_count() {
        if superblock.bit(i) {
            superblock.set_bit(i, false);
            return Some(DATA_START_BLOCK + i);
        }
    }
    None
}

/// Returns `block_number` to the free pool.
pub fn free(superblock: &mut Superblock, block_number: u32) {
    if block_number < DATA_START_BLOCK {
        return;
    }
    let i = block_number - DATA_START_BLOCK;
    if i < superblock.data_bit_count() {
        superblock.set_bit(i, true);
    }
}

pub fn free_count(superblock: &Superblock) -> u32 {
    (0..superblock.data_bit_count())
        .filter(|&i| superblock.bit(i))
        .count() as u32
}

pub fn free_size(superblock: &Superblock) -> u64 {
    free_count(superblock) as u64 * BLOCKSIZE as u64
}
