//! Mounts `vdisk` and deletes `example.txt`.
//!
//! Mirrors the legacy `deleter.c` driver.

use vsfs::Filesystem;

fn main() {
    let mut fs = match Filesystem::mount_path("vdisk") {
        Ok(fs) => fs,
        Err(e) => {
            eprintln!("failed to mount vdisk: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = fs.delete("example.txt") {
        eprintln!("failed to delete file: {:?}", e);
    }

    let _ = fs.unmount();
}
