//! vsfs - File Allocation Table
//!
//! A flat array indexed 0..BLOCKCOUNT-1, each entry the next block number in
//! a file's chain. Only indices at or above `DATA_START_BLOCK` are ever
//! populated; the FAT is sparse by construction. Stored across 32 blocks of
//! 512 entries each (`FAT_BLOCK`/`FAT_OFFSET` in the legacy source).

use core::convert::TryInto;

use crate::block_device::{Block, BlockDevice, BlockIdx};
use crate::error::Result;
use crate::layout::{fat_block_and_offset, FAT_ENTRIES_PER_BLOCK, FAT_LIST_NULL, FAT_START_BLOCK};

/// The in-memory FAT cache: 32 blocks x 512 u32 entries.
pub struct FatTable {
    blocks: Vec<[u32; FAT_ENTRIES_PER_BLOCK]>,
}

impl FatTable {
    pub fn empty() -> Self {
        Self {
            blocks: (0..32).map(|_| [0u32; FAT_ENTRIES_PER_BLOCK]).collect(),
        }
    }

    pub fn load<BD: BlockDevice>(device: &mut BD) -> Result<Self, BD::Error> {
        let mut table = Self::empty();
        for (i, block_entries) in table.blocks.iter_mut().enumerate() {
            let block = device.read_block(BlockIdx(FAT_START_BLOCK + i as u32))?;
            for (j, entry) in block_entries.iter_mut().enumerate() {
                let start = j * 4;
                *entry = u32::from_le_bytes(
                    block.contents[start..start + 4]
                        .try_into()
                        .expect("Infallible"),
                );
            }
        }
        Ok(table)
    }

    pub fn flush<BD: BlockDevice>(&self, device: &mut BD) -> Result<(), BD::Error> {
        for (i, block_entries) in self.blocks.iter().enumerate() {
            let mut block = Block::new();
            for (j, entry) in block_entries.iter().enumerate() {
                let start = j * 4;
                block.contents[start..start + 4].copy_from_slice(&entry.to_le_bytes());
            }
            device.write_block(BlockIdx(FAT_START_BLOCK + i as u32), &block)?;
        }
        Ok(())
    }

    pub fn get(&self, block_number: u32) -> u32 {
        let (block, offset) = fat_block_and_offset(block_number);
        self.blocks[block][offset]
    }

    pub fn set(&mut self, block_number: u32, value: u32) {
        let (block, offset) = fat_block_and_offset(block_number);
        self.blocks[block][offset] = value;
    }

    /// Links `prev -> curr -> FAT_LIST_NULL`.
    pub fn link(&mut self, prev: u32, curr: u32) {
        self.set(prev, curr);
        self.set(curr, FAT_LIST_NULL);
    }

    /// Walks the chain from `start` to its last block. `start ==
    /// NO_START_BLOCK` returns `NO_START_BLOCK` unchanged.
    pub fn last_block(&self, start: u32) -> u32 {
        self.chain_from(start).last().unwrap_or(start)
    }

    /// A restartable lazy walk of the chain starting at `start`, yielding
    /// block numbers until `FAT_LIST_NULL`.
    pub fn chain_from(&self, start: u32) -> ChainIter<'_> {
        ChainIter {
            table: self,
            next: if start == FAT_LIST_NULL { None } else { Some(start) },
        }
    }
}

pub struct ChainIter<'a> {
    table: &'a FatTable,
    next: Option<u32>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let current = self.next?;
        let next = self.table.get(current);
        self.next = if next == FAT_LIST_NULL { None } else { Some(next) };
        Some(current)
    }
}
