//! Mounts `vdisk`, reads `example.txt` in `MODE_READ`, and prints it.
//!
//! Mirrors the legacy `reader.c` driver.

use vsfs::vsfs::OpenMode;
use vsfs::Filesystem;

fn main() {
    let mut fs = match Filesystem::mount_path("vdisk") {
        Ok(fs) => fs,
        Err(e) => {
            eprintln!("could not mount vdisk: {}", e);
            std::process::exit(1);
        }
    };

    let fd = match fs.open("example.txt", OpenMode::Read) {
        Ok(fd) => fd,
        Err(e) => {
            println!("error opening file: {:?}", e);
            return;
        }
    };

    let mut buffer = vec![0u8; 256];
    let n = match fs.read(fd, &mut buffer) {
        Ok(n) => n,
        Err(e) => {
            println!("error reading file: {:?}", e);
            return;
        }
    };

    print!("{}", String::from_utf8_lossy(&buffer[..n]));

    if let Err(e) = fs.close(fd) {
        println!("error closing file: {:?}", e);
        return;
    }

    let _ = fs.unmount();
}
