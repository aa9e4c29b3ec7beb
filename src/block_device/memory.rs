//! vsfs - an in-memory `BlockDevice`, for tests that don't want a real file.

use super::{Block, BlockCount, BlockDevice, BlockIdx};

#[derive(Debug)]
pub struct MemoryBlockDevice {
    memory: Vec<u8>,
}

impl MemoryBlockDevice {
    /// Creates a device backed by `num_blocks` zeroed blocks.
    pub fn new(num_blocks: u32) -> Self {
        Self {
            memory: vec![0u8; num_blocks as usize * Block::LEN],
        }
    }

    fn block_range(block_idx: BlockIdx) -> core::ops::Range<usize> {
        let start = block_idx.0 as usize * Block::LEN;
        start..start + Block::LEN
    }
}

impl BlockDevice for MemoryBlockDevice {
    type Error = core::convert::Infallible;

    fn read_block(&mut self, idx: BlockIdx) -> Result<Block, Self::Error> {
        let mut block = Block::new();
        block.contents.copy_from_slice(&self.memory[Self::block_range(idx)]);
        Ok(block)
    }

    fn write_block(&mut self, idx: BlockIdx, block: &Block) -> Result<(), Self::Error> {
        self.memory[Self::block_range(idx)].copy_from_slice(&block.contents);
        Ok(())
    }

    fn num_blocks(&mut self) -> Result<BlockCount, Self::Error> {
        Ok(BlockCount((self.memory.len() / Block::LEN) as u32))
    }

    fn truncate(&mut self, bytes: u64) -> Result<(), Self::Error> {
        self.memory.resize(bytes as usize, 0);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
