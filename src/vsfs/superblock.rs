//! vsfs - Superblock
//!
//! Block 0: total block count, block size, and the free-block bitmap. Bit
//! `i` tracks data block `DATA_START_BLOCK + i`; blocks 0..DATA_START_BLOCK
//! are implicitly always allocated and never appear in the bitmap.

use core::convert::TryInto;

use crate::block_device::{Block, BlockDevice, BlockIdx};
use crate::error::Result;
use crate::layout::{BLOCKSIZE, DATA_START_BLOCK, MAX_BLOCKCOUNT, SUPERBLOCK_BLOCK};

/// Number of 16-bit words backing the 4096-bit free bitmap.
const BITMAP_WORDS: usize = (MAX_BLOCKCOUNT / 16) as usize;

pub struct Superblock {
    pub blockcount: u32,
    pub blocksize: u16,
    free_bitmap: [u16; BITMAP_WORDS],
}

impl Superblock {
    /// A freshly formatted superblock: every addressable data bit set free.
    pub fn new(blockcount: u32) -> Self {
        Self {
            blockcount,
            blocksize: BLOCKSIZE as u16,
            free_bitmap: [0xffff; BITMAP_WORDS],
        }
    }

    pub fn load<BD: BlockDevice>(device: &mut BD) -> Result<Self, BD::Error> {
        let block = device.read_block(BlockIdx(SUPERBLOCK_BLOCK))?;
        let blockcount = u32::from_le_bytes(block.contents[0..4].try_into().expect("Infallible"));
        let blocksize = u16::from_le_bytes(block.contents[4..6].try_into().expect("Infallible"));
        let mut free_bitmap = [0u16; BITMAP_WORDS];
        for (i, word) in free_bitmap.iter_mut().enumerate() {
            let start = 6 + i * 2;
            *word = u16::from_le_bytes(block.contents[start..start + 2].try_into().expect("Infallible"));
        }
        Ok(Self {
            blockcount,
            blocksize,
            free_bitmap,
        })
    }

    pub fn flush<BD: BlockDevice>(&self, device: &mut BD) -> Result<(), BD::Error> {
        let mut block = Block::new();
        block.contents[0..4].copy_from_slice(&self.blockcount.to_le_bytes());
        block.contents[4..6].copy_from_slice(&self.blocksize.to_le_bytes());
        for (i, word) in self.free_bitmap.iter().enumerate() {
            let start = 6 + i * 2;
            block.contents[start..start + 2].copy_from_slice(&word.to_le_bytes());
        }
        device.write_block(BlockIdx(SUPERBLOCK_BLOCK), &block)?;
        Ok(())
    }

    pub(crate) fn data_bit_count(&self) -> u32 {
        self.blockcount - DATA_START_BLOCK
    }

    pub(crate) fn bit(&self, i: u32) -> bool {
        let word = (i / 16) as usize;
        let shift = i % 16;
        (self.free_bitmap[word] >> shift) & 1 != 0
    }

    pub(crate) fn set_bit(&mut self, i: u32, free: bool) {
        let word = (i / 16) as usize;
        let shift = i % 16;
        if free {
            self.free_bitmap[word] |= 1 << shift;
        } else {
            self.free_bitmap[word] &= !(1 << shift);
        }
    }
}
