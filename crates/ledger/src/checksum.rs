use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::fs::File;
use std::io::{ErrorKind as IoErrorKind, Read};
use std::path::Path;

const BLOCK_SIZE: usize = 64 * 1024;

/// Content checksum of the file at `path`, as lowercase hex.
pub fn checksum(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let file = File::open(path).or_raise(|| ErrorKind::Checksum(path.to_path_buf()))?;
    checksum_reader(file).or_raise(|| ErrorKind::Checksum(path.to_path_buf()))
}

/// Hashes everything `reader` yields, one block at a time.
pub fn checksum_reader(mut reader: impl Read) -> std::io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; BLOCK_SIZE];
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
