//! Mounts `vdisk`, creates `example.txt` if needed, and appends the
//! contents of a local text file to it in `MODE_APPEND`.
//!
//! Mirrors the legacy `writer.c` driver: read a host file, append it to a
//! vsfs file, close, unmount.

use std::io::Read;

use vsfs::vsfs::OpenMode;
use vsfs::Filesystem;

fn main() {
    let mut host_file = match std::fs::File::open("sometext.txt") {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error opening sometext.txt: {}", e);
            std::process::exit(1);
        }
    };
    let mut contents = Vec::new();
    if let Err(e) = host_file.read_to_end(&mut contents) {
        eprintln!("error reading sometext.txt: {}", e);
        std::process::exit(1);
    }

    let mut fs = match Filesystem::mount_path("vdisk") {
        Ok(fs) => fs,
        Err(e) => {
            eprintln!("could not mount vdisk: {}", e);
            std::process::exit(1);
        }
    };

    if fs.create("example.txt").is_err() {
        println!("example.txt already exists, appending anyway");
    }

    let fd = match fs.open("example.txt", OpenMode::Append) {
        Ok(fd) => fd,
        Err(e) => {
            println!("error opening file: {:?}", e);
            return;
        }
    };

    if let Err(e) = fs.append(fd, &contents) {
        println!("error appending to file: {:?}", e);
        return;
    }

    if let Err(e) = fs.close(fd) {
        println!("error closing file: {:?}", e);
        return;
    }

    if let Err(e) = fs.unmount() {
        println!("error unmounting: {:?}", e);
    }
}
