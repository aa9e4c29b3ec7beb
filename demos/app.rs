//! Exercises format/mount/create/open/append/read/close/unmount end to end
//! against a vdisk named on the command line.
//!
//! Mirrors the legacy `app.c` stress driver: writes 10000 single bytes to
//! one file, writes 1000 eight-byte chunks to another, then reads the
//! second file back one byte at a time.

use std::process::ExitCode;

use vsfs::vsfs::OpenMode;
use vsfs::Filesystem;

fn main() -> ExitCode {
    println!("started");

    let vdiskname = match std::env::args().nth(1) {
        Some(name) => name,
        None => {
            println!("usage: vsfs-app <vdiskname>");
            return ExitCode::SUCCESS;
        }
    };

    if Filesystem::format_path(&vdiskname, 20).is_err() {
        println!("could not format {}", vdiskname);
    }

    let mut fs = match Filesystem::mount_path(&vdiskname) {
        Ok(fs) => fs,
        Err(_) => {
            println!("could not mount");
            return ExitCode::FAILURE;
        }
    };

    let _ = fs.create("file1.bin");
    let _ = fs.create("file2.bin");
    let _ = fs.create("file3.bin");

    let fd1 = fs.open("file1.bin", OpenMode::Append).expect("just created");
    let fd2 = fs.open("file2.bin", OpenMode::Append).expect("just created");

    let one_byte = [b'A'];
    for _ in 0..10_000 {
        if fs.append(fd1, &one_byte).is_err() {
            break;
        }
    }

    fs.close(fd1).unwrap();
    fs.close(fd2).unwrap();

    let eight_bytes = [50u8; 8];
    let fd = fs.open("file3.bin", OpenMode::Append).expect("just created");
    for _ in 0..1_000 {
        if fs.append(fd, &eight_bytes).is_err() {
            break;
        }
    }
    fs.close(fd).unwrap();

    let fd = fs.open("file3.bin", OpenMode::Read).expect("just written");
    let size = fs.size(fd).expect("open fd");
    let mut one = [0u8; 1];
    for _ in 0..size {
        if fs.read(fd, &mut one).unwrap_or(0) == 0 {
            break;
        }
        let c = (one[0] + 1) as char;
        print!("{}, ", c);
    }
    fs.close(fd).unwrap();

    let _ = fs.unmount();
    println!("exiting");
    ExitCode::SUCCESS
}
