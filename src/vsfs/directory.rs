//! vsfs - Root directory
//!
//! A fixed 8-block, 128-entry table. Entries are unordered; `find` and
//! `find_free` are linear scans, same as the legacy implementation - there
//! is no index to keep consistent, so there is nothing to gain from one.

use core::convert::TryInto;

use crate::block_device::{Block, BlockDevice, BlockIdx};
use crate::error::{Error, Result};
use crate::layout::{
    DIRENTRIES_PER_BLOCK, DIRENTRY_SIZE, MAX_FILENAME_LEN, MAX_FILES, NO_START_BLOCK,
    ROOT_DIR_START_BLOCK,
};

/// A validated, fixed-width filename: at most 29 bytes, no embedded null,
/// no path separator (there are no subdirectories to separate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filename {
    bytes: [u8; MAX_FILENAME_LEN],
    len: usize,
}

impl Filename {
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or("")
    }

    fn from_raw(raw: &[u8; MAX_FILENAME_LEN + 1]) -> Option<Self> {
        let len = raw.iter().position(|&b| b == 0).unwrap_or(MAX_FILENAME_LEN);
        let mut bytes = [0u8; MAX_FILENAME_LEN];
        bytes[..len].copy_from_slice(&raw[..len]);
        Some(Self { bytes, len })
    }

    fn to_raw(&self) -> [u8; MAX_FILENAME_LEN + 1] {
        let mut raw = [0u8; MAX_FILENAME_LEN + 1];
        raw[..self.len].copy_from_slice(&self.bytes[..self.len]);
        raw
    }
}

impl Filename {
    /// Validates and encodes a filename: non-empty, at most 29 bytes, no
    /// embedded null, no path separator (there are no subdirectories).
    pub fn parse<E>(name: &str) -> Result<Self, E> {
        if name.is_empty() || name.len() > MAX_FILENAME_LEN {
            return Err(Error::InvalidArgument);
        }
        if name.as_bytes().contains(&0) || name.contains('/') {
            return Err(Error::InvalidArgument);
        }
        let mut bytes = [0u8; MAX_FILENAME_LEN];
        bytes[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self {
            bytes,
            len: name.len(),
        })
    }
}

/// One directory entry, decoded into memory. `startblock == NO_START_BLOCK`
/// iff `filesize == 0` (invariant 2 in spec.md §3).
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub occupied: bool,
    pub filename: Filename,
    pub filesize: u64,
    pub startblock: u32,
}

impl DirEntry {
    pub(crate) fn empty() -> Self {
        Self {
            occupied: false,
            filename: Filename {
                bytes: [0u8; MAX_FILENAME_LEN],
                len: 0,
            },
            filesize: 0,
            startblock: NO_START_BLOCK,
        }
    }
}

struct DirEntryRaw<'a> {
    data: &'a [u8],
}

impl<'a> DirEntryRaw<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn data(&self) -> &[u8] {
        self.data
    }
}

struct DirEntryRawMut<'a> {
    data: &'a mut [u8],
}

impl<'a> DirEntryRawMut<'a> {
    fn new(data: &'a mut [u8]) -> Self {
        Self { data }
    }

    fn data(&self) -> &[u8] {
        self.data
    }

    fn data_mut(&mut self) -> &mut [u8] {
        self.data
    }

    define_field!(filesize, set_filesize, u64, 31);
    define_field!(startblock, set_startblock, u32, 39);
}

const OCCUPIED_OFFSET: usize = 0;
const FILENAME_OFFSET: usize = 1;
const FILENAME_RAW_LEN: usize = MAX_FILENAME_LEN + 1;

impl<'a> DirEntryRaw<'a> {
    fn occupied(&self) -> bool {
        self.data()[OCCUPIED_OFFSET] != 0
    }

    fn filename_raw(&self) -> [u8; FILENAME_RAW_LEN] {
        self.data()[FILENAME_OFFSET..FILENAME_OFFSET + FILENAME_RAW_LEN]
            .try_into()
            .expect("directory entry is exactly DIRENTRY_SIZE bytes")
    }

    fn filesize(&self) -> u64 {
        u64::from_le_bytes(self.data()[31..39].try_into().expect("Infallible"))
    }

    fn startblock(&self) -> u32 {
        u32::from_le_bytes(self.data()[39..43].try_into().expect("Infallible"))
    }

    fn decode(&self) -> DirEntry {
        if !self.occupied() {
            return DirEntry::empty();
        }
        let raw_name = self.filename_raw();
        let filename = Filename::from_raw(&raw_name).unwrap_or_else(|| Filename {
            bytes: [0u8; MAX_FILENAME_LEN],
            len: 0,
        });
        DirEntry {
            occupied: true,
            filename,
            filesize: self.filesize(),
            startblock: self.startblock(),
        }
    }
}

impl<'a> DirEntryRawMut<'a> {
    fn set_occupied(&mut self, occupied: bool) {
        self.data_mut()[OCCUPIED_OFFSET] = occupied as u8;
    }

    fn set_filename(&mut self, filename: &Filename) {
        let raw = filename.to_raw();
        self.data_mut()[FILENAME_OFFSET..FILENAME_OFFSET + FILENAME_RAW_LEN]
            .copy_from_slice(&raw);
    }

    fn encode(&mut self, entry: &DirEntry) {
        self.data_mut().iter_mut().for_each(|b| *b = 0);
        self.set_occupied(entry.occupied);
        if entry.occupied {
            self.set_filename(&entry.filename);
            self.set_filesize(entry.filesize);
            self.set_startblock(entry.startblock);
        }
    }
}

/// The in-memory cache of all 128 directory entries, loaded by `mount` and
/// flushed by `unmount`. Entry position is stable across mount/unmount.
pub struct Directory {
    entries: [DirEntry; MAX_FILES],
}

impl Directory {
    pub fn empty() -> Self {
        Self {
            entries: core::array::from_fn(|_| DirEntry::empty()),
        }
    }

    pub fn load<BD: BlockDevice>(device: &mut BD) -> Result<Self, BD::Error> {
        let mut dir = Self::empty();
        for block_offset in 0..(MAX_FILES / DIRENTRIES_PER_BLOCK) {
            let block = device.read_block(BlockIdx(ROOT_DIR_START_BLOCK + block_offset as u32))?;
            for slot in 0..DIRENTRIES_PER_BLOCK {
                let start = slot * DIRENTRY_SIZE;
                let raw = DirEntryRaw::new(&block.contents[start..start + DIRENTRY_SIZE]);
                dir.entries[block_offset * DIRENTRIES_PER_BLOCK + slot] = raw.decode();
            }
        }
        Ok(dir)
    }

    pub fn flush<BD: BlockDevice>(&self, device: &mut BD) -> Result<(), BD::Error> {
        for block_offset in 0..(MAX_FILES / DIRENTRIES_PER_BLOCK) {
            let mut block = Block::new();
            for slot in 0..DIRENTRIES_PER_BLOCK {
                let idx = block_offset * DIRENTRIES_PER_BLOCK + slot;
                let start = slot * DIRENTRY_SIZE;
                let mut raw =
                    DirEntryRawMut::new(&mut block.contents[start..start + DIRENTRY_SIZE]);
                raw.encode(&self.entries[idx]);
            }
            device.write_block(BlockIdx(ROOT_DIR_START_BLOCK + block_offset as u32), &block)?;
        }
        Ok(())
    }

    pub fn get(&self, position: usize) -> Option<&DirEntry> {
        self.entries.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut DirEntry> {
        self.entries.get_mut(position)
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.occupied && e.filename.as_str() == name)
    }

    pub fn find_free(&self) -> Option<usize> {
        self.entries.iter().position(|e| !e.occupied)
    }
}
