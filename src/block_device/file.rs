//! vsfs - a `BlockDevice` backed by a host file.
//!
//! This is the concrete device `Filesystem::format`/`mount` hand a caller
//! who gives them a path: the "raw block device" spec.md describes, played
//! by an ordinary file on whatever filesystem the host OS provides.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use super::{Block, BlockCount, BlockDevice, BlockIdx};

/// A `BlockDevice` backed by a `std::fs::File`. Reads and writes are
/// positioned with `seek` and must transfer exactly [`Block::LEN`] bytes;
/// a short transfer is reported as [`io::ErrorKind::UnexpectedEof`].
#[derive(Debug)]
pub struct FileBlockDevice {
    file: File,
}

impl FileBlockDevice {
    /// Opens an existing backing file.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self { file })
    }

    /// Creates a new backing file, truncating it if it already exists.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self { file })
    }

    fn seek_to_block(&mut self, idx: BlockIdx) -> io::Result<()> {
        self.file
            .seek(SeekFrom::Start(idx.0 as u64 * Block::LEN as u64))?;
        Ok(())
    }
}

impl BlockDevice for FileBlockDevice {
    type Error = io::Error;

    fn read_block(&mut self, idx: BlockIdx) -> Result<Block, Self::Error> {
        self.seek_to_block(idx)?;
        let mut block = Block::new();
        self.file.read_exact(&mut block.contents)?;
        Ok(block)
    }

    fn write_block(&mut self, idx: BlockIdx, block: &Block) -> Result<(), Self::Error> {
        self.seek_to_block(idx)?;
        self.file.write_all(&block.contents)
    }

    fn num_blocks(&mut self) -> Result<BlockCount, Self::Error> {
        let len = self.file.metadata()?.len();
        Ok(BlockCount((len / Block::LEN as u64) as u32))
    }

    fn truncate(&mut self, bytes: u64) -> Result<(), Self::Error> {
        self.file.set_len(bytes)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.file.flush()?;
        self.file.sync_all()
    }
}
