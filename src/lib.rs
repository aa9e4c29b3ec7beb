//! # vsfs
//!
//! > A self-contained virtual filesystem backed by a single host file
//!
//! `vsfs` treats one ordinary file as a raw block device and lays out a
//! flat-namespace filesystem inside it: a superblock, a File Allocation
//! Table, a fixed-capacity root directory, and the data blocks themselves.
//! Applications `format` a backing file once, `mount` it to get a
//! [`vsfs::Filesystem`](crate::vsfs::Filesystem) value, `create`/`open`/
//! `read`/`append`/`delete` named files through it, and `unmount` to flush
//! changes back. There is no directory hierarchy, no concurrent access, and
//! no seeking - files are written strictly by appending and read strictly
//! from the first byte.
//!
//! ## Using the crate
//!
//! You will need something that implements the [`BlockDevice`] trait, which
//! reads and writes fixed 2048-byte blocks. [`FileBlockDevice`] backs one
//! with a `std::fs::File`, which is what `format`/`mount` use when given a
//! path; [`MemoryBlockDevice`] exists for tests that would rather not touch
//! disk.
//!
//! ```rust,no_run
//! use vsfs::{vsfs::OpenMode, Filesystem};
//!
//! Filesystem::format_path("vdisk", 18).unwrap();
//! let mut fs = Filesystem::mount_path("vdisk").unwrap();
//! fs.create("hello.txt").unwrap();
//! let fd = fs.open("hello.txt", OpenMode::Append).unwrap();
//! fs.append(fd, b"hello, vsfs").unwrap();
//! fs.close(fd).unwrap();
//! fs.unmount().unwrap();
//! ```

#![cfg_attr(not(test), deny(unsafe_code))]

#[macro_use]
mod structure;

pub mod block_device;
pub mod error;
pub mod layout;
pub mod vsfs;

pub use crate::block_device::{Block, BlockCount, BlockDevice, BlockIdx, FileBlockDevice, MemoryBlockDevice};
pub use crate::error::Error;
pub use crate::layout::BLOCKSIZE;
pub use crate::vsfs::{Filesystem, OpenMode};

// ****************************************************************************
//
// End Of File
//
// ****************************************************************************
