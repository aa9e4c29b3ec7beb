//! End-to-end tests against a real backing file on disk, exercising the
//! public API the way `vsfs-writer`/`vsfs-reader`/`vsfs-deleter` do.

use vsfs::vsfs::OpenMode;
use vsfs::Filesystem;

fn vdisk() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vdisk");
    (dir, path)
}

#[test]
fn format_mount_create_close_unmount_round_trip() {
    let (_dir, path) = vdisk();
    Filesystem::format_path(&path, 18).unwrap();

    let mut fs = Filesystem::mount_path(&path).unwrap();
    fs.create("a.txt").unwrap();
    fs.unmount().unwrap();

    let mut fs = Filesystem::mount_path(&path).unwrap();
    assert!(fs.open("a.txt", OpenMode::Read).is_ok());
}

#[test]
fn small_append_then_read_survives_a_remount() {
    let (_dir, path) = vdisk();
    Filesystem::format_path(&path, 18).unwrap();

    let mut fs = Filesystem::mount_path(&path).unwrap();
    fs.create("note.txt").unwrap();
    let fd = fs.open("note.txt", OpenMode::Append).unwrap();
    fs.append(fd, b"a short note").unwrap();
    fs.close(fd).unwrap();
    fs.unmount().unwrap();

    let mut fs = Filesystem::mount_path(&path).unwrap();
    let fd = fs.open("note.txt", OpenMode::Read).unwrap();
    assert_eq!(fs.size(fd).unwrap(), 12);
    let mut buf = [0u8; 32];
    let n = fs.read(fd, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"a short note");
}

#[test]
fn cross_block_append_survives_a_remount() {
    let (_dir, path) = vdisk();
    Filesystem::format_path(&path, 18).unwrap();

    let data = vec![0x5Au8; 2048 * 2 + 37];
    let mut fs = Filesystem::mount_path(&path).unwrap();
    fs.create("spanning.bin").unwrap();
    let fd = fs.open("spanning.bin", OpenMode::Append).unwrap();
    fs.append(fd, &data).unwrap();
    fs.close(fd).unwrap();
    fs.unmount().unwrap();

    let mut fs = Filesystem::mount_path(&path).unwrap();
    let fd = fs.open("spanning.bin", OpenMode::Read).unwrap();
    assert_eq!(fs.size(fd).unwrap(), data.len() as u64);
    let mut buf = vec![0u8; data.len()];
    let n = fs.read(fd, &mut buf).unwrap();
    assert_eq!(n, data.len());
    assert_eq!(buf, data);
}

#[test]
fn many_small_appends_accumulate_correctly() {
    let (_dir, path) = vdisk();
    Filesystem::format_path(&path, 18).unwrap();

    let mut fs = Filesystem::mount_path(&path).unwrap();
    fs.create("drip.bin").unwrap();
    let fd = fs.open("drip.bin", OpenMode::Append).unwrap();
    for _ in 0..5000 {
        fs.append(fd, b"A").unwrap();
    }
    fs.close(fd).unwrap();

    let fd = fs.open("drip.bin", OpenMode::Read).unwrap();
    assert_eq!(fs.size(fd).unwrap(), 5000);
    let mut buf = vec![0u8; 5000];
    let n = fs.read(fd, &mut buf).unwrap();
    assert_eq!(n, 5000);
    assert!(buf.iter().all(|&b| b == b'A'));
}

#[test]
fn delete_then_recreate_reuses_freed_space() {
    let (_dir, path) = vdisk();
    Filesystem::format_path(&path, 18).unwrap();

    let mut fs = Filesystem::mount_path(&path).unwrap();
    fs.create("throwaway.bin").unwrap();
    let fd = fs.open("throwaway.bin", OpenMode::Append).unwrap();
    fs.append(fd, &vec![1u8; 2048 * 4]).unwrap();
    fs.close(fd).unwrap();

    let free_before = fs.free_count();
    fs.delete("throwaway.bin").unwrap();
    assert_eq!(fs.free_count(), free_before + 4);

    fs.create("throwaway.bin").unwrap();
    let fd = fs.open("throwaway.bin", OpenMode::Append).unwrap();
    assert_eq!(fs.append(fd, b"fresh").unwrap(), 5);
}

#[test]
fn duplicate_create_fails_and_unknown_name_fails_open_and_delete() {
    let (_dir, path) = vdisk();
    Filesystem::format_path(&path, 18).unwrap();

    let mut fs = Filesystem::mount_path(&path).unwrap();
    fs.create("only-once.txt").unwrap();
    assert!(fs.create("only-once.txt").is_err());
    assert!(fs.open("missing.txt", OpenMode::Read).is_err());
    assert!(fs.delete("missing.txt").is_err());
}

#[test]
fn format_rejects_size_exponents_outside_the_supported_range() {
    let (_dir, path) = vdisk();
    assert!(Filesystem::format_path(&path, 10).is_err());
    assert!(Filesystem::format_path(&path, 30).is_err());
}
