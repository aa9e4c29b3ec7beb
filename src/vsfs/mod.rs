//! vsfs - the file engine
//!
//! Ties the superblock, FAT, root directory, free-block allocator, and
//! open-file table together into `create`/`open`/`close`/`read`/`append`/
//! `delete`/`size`, plus `format`/`mount`/`unmount`. Everything mutable
//! lives on the `Filesystem` value returned by `mount`; there is no global
//! state (see SPEC_FULL.md §9).

mod allocator;
mod directory;
mod fat_table;
mod file;
mod superblock;

pub use directory::Filename;
pub use file::OpenMode;

use crate::block_device::{Block, BlockDevice, BlockIdx};
use crate::error::{Error, Result};
use crate::layout::{
    BLOCKSIZE, DATA_START_BLOCK, FAT_LIST_NULL, MAX_FILES, MAX_SIZE_EXPONENT, MIN_SIZE_EXPONENT,
    NO_START_BLOCK,
};

use directory::{DirEntry, Directory};
use fat_table::FatTable;
use file::OpenFileTable;
use superblock::Superblock;

/// A mounted virtual filesystem. Produced by [`Filesystem::mount`], flushed
/// and consumed by [`Filesystem::unmount`].
pub struct Filesystem<BD: BlockDevice> {
    device: BD,
    superblock: Superblock,
    fat: FatTable,
    directory: Directory,
    open_files: OpenFileTable,
}

impl<BD: BlockDevice> Filesystem<BD> {
    /// Initializes a fresh on-disk image on `device`: a `2^m`-byte volume
    /// with a clean superblock, an empty FAT, an empty root directory, and
    /// zeroed data blocks. Does not mount it; callers pass the same device
    /// to [`Filesystem::mount`] afterwards to start using it.
    pub fn format(device: &mut BD, m: u32) -> Result<(), BD::Error> {
        if !(MIN_SIZE_EXPONENT..=MAX_SIZE_EXPONENT).contains(&m) {
            return Err(Error::InvalidArgument);
        }
        let total_bytes = 1u64 << m;
        log::debug!("format: m={} total_bytes={}", m, total_bytes);
        device.truncate(total_bytes)?;
        let blockcount = (total_bytes / BLOCKSIZE as u64) as u32;

        Superblock::new(blockcount).flush(device)?;
        FatTable::empty().flush(device)?;
        Directory::empty().flush(device)?;

        let zero = Block::new();
        for b in DATA_START_BLOCK..blockcount {
            device.write_block(BlockIdx(b), &zero)?;
        }
        device.flush()?;
        Ok(())
    }

    /// Reads the superblock, FAT, and root directory off `device` into
    /// memory and opens an empty open-file table over them.
    pub fn mount(mut device: BD) -> Result<Self, BD::Error> {
        let superblock = Superblock::load(&mut device)?;
        let fat = FatTable::load(&mut device)?;
        let directory = Directory::load(&mut device)?;
        log::debug!("mount: blockcount={}", superblock.blockcount);
        Ok(Self {
            device,
            superblock,
            fat,
            directory,
            open_files: OpenFileTable::new(),
        })
    }

    /// Flushes the superblock, FAT, and root directory back to the device
    /// and syncs it. Consumes `self`: there is nothing left to operate on
    /// afterwards.
    pub fn unmount(mut self) -> Result<(), BD::Error> {
        log::debug!("unmount");
        self.superblock.flush(&mut self.device)?;
        self.fat.flush(&mut self.device)?;
        self.directory.flush(&mut self.device)?;
        self.device.flush()?;
        Ok(())
    }

    /// Creates a new, empty, zero-length file. Fails if `name` is invalid,
    /// a file by that name already exists, or the directory is full.
    pub fn create(&mut self, name: &str) -> Result<(), BD::Error> {
        let filename = Filename::parse(name)?;
        if self.directory.find(name).is_some() {
            return Err(Error::AlreadyExists);
        }
        let pos = self.directory.find_free().ok_or(Error::Full)?;
        *self.directory.get_mut(pos).expect("just located") = DirEntry {
            occupied: true,
            filename,
            filesize: 0,
            startblock: NO_START_BLOCK,
        };
        log::debug!("create({:?}) -> entry {}", name, pos);
        Ok(())
    }

    /// Opens `name` in `mode`, returning the fd (the entry's position).
    /// Reopening a file already open in the same mode succeeds and returns
    /// the same fd; reopening in a different mode is `Error::WrongMode`.
    pub fn open(&mut self, name: &str, mode: OpenMode) -> Result<usize, BD::Error> {
        let pos = self.directory.find(name).ok_or(Error::NotFound)?;
        if let Some(existing) = self.open_files.mode_of(pos) {
            return if existing == mode {
                Ok(pos)
            } else {
                Err(Error::WrongMode)
            };
        }
        self.open_files.open(pos, mode);
        log::debug!("open({:?}, {:?}) -> fd {}", name, mode, pos);
        Ok(pos)
    }

    /// Closes `fd`. Does not flush metadata; that only happens at unmount.
    pub fn close(&mut self, fd: usize) -> Result<(), BD::Error> {
        if fd >= MAX_FILES {
            return Err(Error::InvalidArgument);
        }
        if self.open_files.close(fd) {
            log::debug!("close(fd={})", fd);
            Ok(())
        } else {
            Err(Error::NotOpen)
        }
    }

    /// The current byte length of the file open as `fd`.
    pub fn size(&self, fd: usize) -> Result<u64, BD::Error> {
        if !self.open_files.is_open(fd) {
            return Err(Error::NotOpen);
        }
        Ok(self.entry(fd)?.filesize)
    }

    pub fn free_count(&self) -> u32 {
        allocator::free_count(&self.superblock)
    }

    pub fn free_size(&self) -> u64 {
        allocator::free_size(&self.superblock)
    }

    fn entry(&self, fd: usize) -> Result<&DirEntry, BD::Error> {
        self.directory.get(fd).ok_or(Error::InvalidArgument)
    }

    /// Reads up to `buf.len()` bytes, clamped to `min(buf.len(), filesize)`
    /// (the legacy implementation skipped this clamp; spec.md §9 calls that
    /// a bug). Returns the number of bytes actually copied into `buf`.
    pub fn read(&mut self, fd: usize, buf: &mut [u8]) -> Result<usize, BD::Error> {
        match self.open_files.mode_of(fd) {
            Some(OpenMode::Read) => {}
            Some(OpenMode::Append) => return Err(Error::WrongMode),
            None => return Err(Error::NotOpen),
        }
        let entry = self.entry(fd)?.clone();
        if entry.filesize == 0 {
            return Ok(0);
        }

        let want = buf.len().min(entry.filesize as usize);
        let mut chain = self.fat.chain_from(entry.startblock);
        let mut current = match chain.next() {
            Some(b) => b,
            None => return Ok(0),
        };
        let mut scratch = self.device.read_block(BlockIdx(current))?;

        let mut read_so_far = 0usize;
        while read_so_far < want {
            let offset = read_so_far % BLOCKSIZE;
            buf[read_so_far] = scratch.contents[offset];
            read_so_far += 1;
            if offset == BLOCKSIZE - 1 && read_so_far < want {
                match chain.next() {
                    Some(next) => {
                        current = next;
                        scratch = self.device.read_block(BlockIdx(current))?;
                    }
                    None => break,
                }
            }
        }
        log::debug!("read(fd={}, n={}) -> {}", fd, buf.len(), read_so_far);
        Ok(read_so_far)
    }

    /// Appends `data` to the file open as `fd`. Returns the number of bytes
    /// actually persisted. On `Error::Full`, some prefix of `data` may
    /// already be durable; `size(fd)` reflects exactly how much.
    pub fn append(&mut self, fd: usize, data: &[u8]) -> Result<usize, BD::Error> {
        match self.open_files.mode_of(fd) {
            Some(OpenMode::Append) => {}
            Some(OpenMode::Read) => return Err(Error::WrongMode),
            None => return Err(Error::NotOpen),
        }
        if data.is_empty() {
            return Ok(0);
        }
        let entry = self.entry(fd)?.clone();

        let (new_filesize, result) = if entry.filesize == 0 {
            self.append_to_empty(fd, &entry, data)?
        } else if entry.filesize % BLOCKSIZE as u64 != 0 {
            self.append_with_tail_space(&entry, data)?
        } else {
            self.append_to_full_last_block(&entry, data)?
        };

        self.directory.get_mut(fd).expect("fd validated above").filesize = new_filesize;
        let appended = (new_filesize - entry.filesize) as usize;
        log::debug!(
            "append(fd={}, n={}) -> {} bytes persisted",
            fd,
            data.len(),
            appended
        );
        match result {
            Ok(()) => Ok(appended),
            Err(e) => Err(e),
        }
    }

    fn append_to_empty(
        &mut self,
        fd: usize,
        entry: &DirEntry,
        data: &[u8],
    ) -> Result<(u64, core::result::Result<(), Error<BD::Error>>), BD::Error> {
        let _ = entry;
        let b0 = allocator::allocate(&mut self.superblock).ok_or(Error::Full)?;
        self.directory.get_mut(fd).expect("fd validated above").startblock = b0;
        let mut persisted = 0usize;
        let result = self.write_chain(None, b0, data, &mut persisted);
        Ok((persisted as u64, result))
    }

    fn append_with_tail_space(
        &mut self,
        entry: &DirEntry,
        data: &[u8],
    ) -> Result<(u64, core::result::Result<(), Error<BD::Error>>), BD::Error> {
        let tail_used = (entry.filesize % BLOCKSIZE as u64) as usize;
        let avail = BLOCKSIZE - tail_used;
        let last = self.fat.last_block(entry.startblock);
        let mut last_block = self.device.read_block(BlockIdx(last))?;

        if avail >= data.len() {
            last_block.contents[tail_used..tail_used + data.len()].copy_from_slice(data);
            self.device.write_block(BlockIdx(last), &last_block)?;
            return Ok((entry.filesize + data.len() as u64, Ok(())));
        }

        last_block.contents[tail_used..BLOCKSIZE].copy_from_slice(&data[..avail]);
        self.device.write_block(BlockIdx(last), &last_block)?;
        let base = entry.filesize + avail as u64;

        match allocator::allocate(&mut self.superblock) {
            Some(next_block) => {
                let mut persisted = 0usize;
                let result = self.write_chain(Some(last), next_block, &data[avail..], &mut persisted);
                Ok((base + persisted as u64, result))
            }
            None => Ok((base, Err(Error::Full))),
        }
    }

    fn append_to_full_last_block(
        &mut self,
        entry: &DirEntry,
        data: &[u8],
    ) -> Result<(u64, core::result::Result<(), Error<BD::Error>>), BD::Error> {
        let last = self.fat.last_block(entry.startblock);
        match allocator::allocate(&mut self.superblock) {
            Some(next_block) => {
                let mut persisted = 0usize;
                let result = self.write_chain(Some(last), next_block, data, &mut persisted);
                Ok((entry.filesize + persisted as u64, result))
            }
            None => Ok((entry.filesize, Err(Error::Full))),
        }
    }

    /// Writes `data` into `first_block` (already allocated) and onward,
    /// allocating and linking new blocks as each one fills. Links
    /// `prev -> first_block` first, if `prev` is given. `*persisted` is
    /// updated as each full block is flushed, and again for a final
    /// partial tail, so it reflects exactly how many bytes are durable
    /// even if allocation is exhausted partway through.
    fn write_chain(
        &mut self,
        prev: Option<u32>,
        first_block: u32,
        data: &[u8],
        persisted: &mut usize,
    ) -> core::result::Result<(), Error<BD::Error>> {
        let mut curr = first_block;
        match prev {
            Some(p) => self.fat.link(p, curr),
            None => self.fat.set(curr, FAT_LIST_NULL),
        }

        let mut block = Block::new();
        let mut in_block = 0usize;
        let mut idx = 0usize;
        while idx < data.len() {
            block.contents[in_block] = data[idx];
            in_block += 1;
            idx += 1;
            if in_block == BLOCKSIZE {
                self.device.write_block(BlockIdx(curr), &block)?;
                *persisted = idx;
                in_block = 0;
                if idx < data.len() {
                    match allocator::allocate(&mut self.superblock) {
                        Some(next) => {
                            self.fat.link(curr, next);
                            curr = next;
                            block = Block::new();
                        }
                        None => return Err(Error::Full),
                    }
                }
            }
        }
        if in_block > 0 {
            self.device.write_block(BlockIdx(curr), &block)?;
            *persisted = idx;
        }
        Ok(())
    }

    /// Removes `name`'s directory entry and returns every block on its FAT
    /// chain to the free bitmap. Corrected per spec.md §4.11/§9: the legacy
    /// implementation advanced before clearing, wrote the sentinel into the
    /// wrong entry, and never touched the bitmap, leaking every deleted
    /// file's blocks.
    pub fn delete(&mut self, name: &str) -> Result<(), BD::Error> {
        let pos = self.directory.find(name).ok_or(Error::NotFound)?;
        let entry = self.directory.get(pos).expect("just located").clone();

        let chain: Vec<u32> = self.fat.chain_from(entry.startblock).collect();
        for block in chain {
            self.fat.set(block, FAT_LIST_NULL);
            allocator::free(&mut self.superblock, block);
        }

        *self.directory.get_mut(pos).expect("just located") = DirEntry::empty();
        log::debug!("delete({:?}) entry {}", name, pos);
        Ok(())
    }
}

impl Filesystem<crate::block_device::FileBlockDevice> {
    /// Convenience wrapper matching spec.md §6.2's `format(vdiskname, m)`:
    /// creates the backing file at `path` and formats it in one step.
    pub fn format_path(
        path: impl AsRef<std::path::Path>,
        m: u32,
    ) -> Result<(), std::io::Error> {
        let mut device = crate::block_device::FileBlockDevice::create(path)?;
        match Self::format(&mut device, m) {
            Ok(()) => Ok(()),
            Err(Error::Io(e)) => Err(e),
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "invalid size exponent",
            )),
        }
    }

    /// Convenience wrapper matching spec.md §6.2's `mount(vdiskname)`:
    /// opens the backing file at `path` and mounts it in one step.
    pub fn mount_path(path: impl AsRef<std::path::Path>) -> Result<Self, std::io::Error> {
        let device = crate::block_device::FileBlockDevice::open(path)?;
        Self::mount(device).map_err(|e| match e {
            Error::Io(e) => e,
            _ => std::io::Error::new(std::io::ErrorKind::InvalidData, "corrupt volume"),
        })
    }
}

#[cfg(test)]
mod test;
