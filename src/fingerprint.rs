//! Content fingerprints for deduplicating uploads.
//!
//! Two files with the same fingerprint are the same image, whatever their
//! names. The fingerprint is the SHA-256 of the file contents as lowercase
//! hex.

use sha2::{Digest, Sha256};
use std::io::{self, Read, Seek, SeekFrom};

const CHUNK: usize = 64 * 1024;

/// Fingerprint of an in-memory file.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Fingerprint of a stream, read from its start in chunks.
pub fn hash_reader<R: Read + Seek>(reader: &mut R) -> io::Result<String> {
    reader.seek(SeekFrom::Start(0))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0; CHUNK];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
