//! Filesystem helpers shared across Warband crates.

use std::io;
use std::path::Path;

/// Maximum allowed map file size for reading into memory.
pub const MAX_MAP_BYTES: u64 = 8 * 1024 * 1024; // 8 MiB
/// Maximum allowed save file size for reading into memory.
pub const MAX_SAVE_BYTES: u64 = 64 * 1024 * 1024; // 64 MiB

/// Read a file into memory with a size cap.
///
/// Files larger than `max_bytes` fail with [`io::ErrorKind::InvalidData`].
pub fn read_file_with_limit(path: &Path, max_bytes: u64) -> io::Result<Vec<u8>> {
    let len = std::fs::metadata(path)?.len();
    if len > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "file too large: {} ({} bytes, max {} bytes)",
                path.display(),
                len,
                max_bytes
            ),
        ));
    }
    std::fs::read(path)
}
