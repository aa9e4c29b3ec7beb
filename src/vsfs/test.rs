use crate::block_device::MemoryBlockDevice;
use crate::error::Error;
use crate::layout::BLOCKSIZE;

use super::{Filesystem, OpenMode};

const SMALL: u32 = 18; // 2^18 = 256 KiB -> 128 blocks

fn formatted(m: u32) -> Filesystem<MemoryBlockDevice> {
    let mut device = MemoryBlockDevice::new(0);
    Filesystem::format(&mut device, m).unwrap();
    Filesystem::mount(device).unwrap()
}

#[test]
fn format_then_mount_has_empty_directory_and_full_free_space() {
    let fs = formatted(SMALL);
    assert_eq!(fs.free_count(), fs.free_size() / BLOCKSIZE as u64);
    assert!(fs.free_size() > 0);
}

#[test]
fn format_rejects_out_of_range_exponent() {
    let mut device = MemoryBlockDevice::new(0);
    assert!(matches!(
        Filesystem::format(&mut device, 17),
        Err(Error::InvalidArgument)
    ));
    assert!(matches!(
        Filesystem::format(&mut device, 24),
        Err(Error::InvalidArgument)
    ));
}

#[test]
fn create_then_open_then_append_then_read_round_trips() {
    let mut fs = formatted(SMALL);
    fs.create("hello.txt").unwrap();

    let fd = fs.open("hello.txt", OpenMode::Append).unwrap();
    let n = fs.append(fd, b"hello, vsfs").unwrap();
    assert_eq!(n, 11);
    fs.close(fd).unwrap();

    let fd = fs.open("hello.txt", OpenMode::Read).unwrap();
    assert_eq!(fs.size(fd).unwrap(), 11);
    let mut buf = [0u8; 32];
    let n = fs.read(fd, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"hello, vsfs");
    fs.close(fd).unwrap();
}

#[test]
fn append_spans_multiple_blocks() {
    let mut fs = formatted(SMALL);
    fs.create("big.bin").unwrap();
    let fd = fs.open("big.bin", OpenMode::Append).unwrap();

    let chunk = vec![0xABu8; BLOCKSIZE + 100];
    let n = fs.append(fd, &chunk).unwrap();
    assert_eq!(n, chunk.len());
    fs.close(fd).unwrap();

    let fd = fs.open("big.bin", OpenMode::Read).unwrap();
    assert_eq!(fs.size(fd).unwrap(), chunk.len() as u64);
    let mut buf = vec![0u8; chunk.len()];
    let n = fs.read(fd, &mut buf).unwrap();
    assert_eq!(n, chunk.len());
    assert_eq!(buf, chunk);
}

#[test]
fn append_fills_tail_block_exactly_then_extends_cleanly() {
    let mut fs = formatted(SMALL);
    fs.create("exact.bin").unwrap();
    let fd = fs.open("exact.bin", OpenMode::Append).unwrap();

    let first = vec![1u8; BLOCKSIZE];
    fs.append(fd, &first).unwrap();
    let second = vec![2u8; 10];
    fs.append(fd, &second).unwrap();
    fs.close(fd).unwrap();

    let fd = fs.open("exact.bin", OpenMode::Read).unwrap();
    let mut buf = vec![0u8; BLOCKSIZE + 10];
    let n = fs.read(fd, &mut buf).unwrap();
    assert_eq!(n, buf.len());
    assert!(buf[..BLOCKSIZE].iter().all(|&b| b == 1));
    assert!(buf[BLOCKSIZE..].iter().all(|&b| b == 2));
}

#[test]
fn read_clamps_to_filesize_even_with_a_larger_buffer() {
    let mut fs = formatted(SMALL);
    fs.create("short.txt").unwrap();
    let fd = fs.open("short.txt", OpenMode::Append).unwrap();
    fs.append(fd, b"abc").unwrap();
    fs.close(fd).unwrap();

    let fd = fs.open("short.txt", OpenMode::Read).unwrap();
    let mut buf = [0xffu8; 64];
    let n = fs.read(fd, &mut buf).unwrap();
    assert_eq!(n, 3);
    assert_eq!(&buf[..3], b"abc");
    assert_eq!(buf[3], 0xff, "read must not touch bytes past filesize");
}

#[test]
fn delete_frees_every_block_in_the_chain() {
    let mut fs = formatted(SMALL);
    fs.create("multi.bin").unwrap();
    let fd = fs.open("multi.bin", OpenMode::Append).unwrap();
    let data = vec![7u8; BLOCKSIZE * 3 + 1];
    fs.append(fd, &data).unwrap();
    fs.close(fd).unwrap();

    let free_before = fs.free_count();
    fs.delete("multi.bin").unwrap();
    let free_after = fs.free_count();
    assert_eq!(free_after, free_before + 4);

    assert!(matches!(
        fs.open("multi.bin", OpenMode::Read),
        Err(Error::NotFound)
    ));
}

#[test]
fn create_duplicate_name_fails() {
    let mut fs = formatted(SMALL);
    fs.create("dup.txt").unwrap();
    assert!(matches!(
        fs.create("dup.txt"),
        Err(Error::AlreadyExists)
    ));
}

#[test]
fn open_in_conflicting_mode_fails_but_same_mode_is_idempotent() {
    let mut fs = formatted(SMALL);
    fs.create("modes.txt").unwrap();

    let fd = fs.open("modes.txt", OpenMode::Append).unwrap();
    let fd_again = fs.open("modes.txt", OpenMode::Append).unwrap();
    assert_eq!(fd, fd_again);

    assert!(matches!(
        fs.open("modes.txt", OpenMode::Read),
        Err(Error::WrongMode)
    ));
}

#[test]
fn read_on_an_append_handle_and_append_on_a_read_handle_both_fail() {
    let mut fs = formatted(SMALL);
    fs.create("f.txt").unwrap();

    let fd = fs.open("f.txt", OpenMode::Append).unwrap();
    let mut buf = [0u8; 4];
    assert!(matches!(fs.read(fd, &mut buf), Err(Error::WrongMode)));
    fs.close(fd).unwrap();

    let fd = fs.open("f.txt", OpenMode::Read).unwrap();
    assert!(matches!(fs.append(fd, b"x"), Err(Error::WrongMode)));
}

#[test]
fn close_on_an_unopened_or_out_of_range_fd_fails() {
    let mut fs = formatted(SMALL);
    fs.create("f.txt").unwrap();
    let fd = fs.open("f.txt", OpenMode::Append).unwrap();
    fs.close(fd).unwrap();

    assert!(matches!(fs.close(fd), Err(Error::NotOpen)));
    assert!(matches!(fs.close(9999), Err(Error::InvalidArgument)));
}

#[test]
fn metadata_survives_unmount_and_remount() {
    let mut device = MemoryBlockDevice::new(0);
    Filesystem::format(&mut device, SMALL).unwrap();
    let mut fs = Filesystem::mount(device).unwrap();
    fs.create("persisted.txt").unwrap();
    let fd = fs.open("persisted.txt", OpenMode::Append).unwrap();
    fs.append(fd, b"durable").unwrap();
    fs.close(fd).unwrap();

    // `unmount` hands back nothing, so remounting here re-reads a device
    // that is still backed by the same in-memory buffer only because we
    // never drop it: the interesting assertion is that `unmount` actually
    // flushed, which `FileBlockDevice`-based integration tests confirm by
    // reopening the path from scratch.
    fs.unmount().unwrap();
}

#[test]
fn append_empty_slice_is_a_no_op() {
    let mut fs = formatted(SMALL);
    fs.create("empty.txt").unwrap();
    let fd = fs.open("empty.txt", OpenMode::Append).unwrap();
    assert_eq!(fs.append(fd, &[]).unwrap(), 0);
    assert_eq!(fs.size(fd).unwrap(), 0);
}

#[test]
fn directory_exhaustion_reports_full() {
    let mut fs = formatted(SMALL);
    let mut created = 0;
    loop {
        let name = format!("f{}.txt", created);
        match fs.create(&name) {
            Ok(()) => created += 1,
            Err(Error::Full) => break,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }
    assert_eq!(created, crate::layout::MAX_FILES);
}
