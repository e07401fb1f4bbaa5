//! Content fingerprints for duplicate detection
//!
//! Files are bucketed by a key derived from their first [`PREFIX_LEN`]
//! bytes. A key only nominates candidates; equality is always confirmed
//! with [`files_identical`].

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Number of leading bytes that feed the bucket key.
pub const PREFIX_LEN: u64 = 4096;

/// Function turning a content prefix into a bucket key.
pub type KeyFn = fn(&[u8]) -> u64;

/// Default key: the first eight bytes of the SHA-256 digest, little-endian.
pub fn sha256_key(prefix: &[u8]) -> u64 {
    let digest = Sha256::digest(prefix);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Read at most [`PREFIX_LEN`] bytes from the start of a file.
pub fn read_prefix(path: &Path) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(PREFIX_LEN as usize);
    File::open(path)?.take(PREFIX_LEN).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Bucket key of a file's content prefix.
pub fn prefix_key(path: &Path, key_fn: KeyFn) -> io::Result<u64> {
    Ok(key_fn(&read_prefix(path)?))
}

/// Byte-exact comparison of two files.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    if std::fs::metadata(a)?.len() != std::fs::metadata(b)?.len() {
        return Ok(false);
    }

    let mut ra = BufReader::new(File::open(a)?);
    let mut rb = BufReader::new(File::open(b)?);
    let mut ba = [0u8; 8192];
    let mut bb = [0u8; 8192];
    loop {
        let na = read_full(&mut ra, &mut ba)?;
        let nb = read_full(&mut rb, &mut bb)?;
        if na != nb || ba[..na] != bb[..nb] {
            return Ok(false);
        }
        if na == 0 {
            return Ok(true);
        }
    }
}

/// Fill `buf` as far as the reader allows.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic() {
        assert_eq!(sha256_key(b"test"), sha256_key(b"test"));
    }

    #[test]
    fn different_content_different_key() {
        assert_ne!(sha256_key(b"aaa"), sha256_key(b"bbb"));
    }

    #[test]
    fn key_known_value() {
        // sha256("hello world") starts with b9 4d 27 b9 93 4d 3e 08
        assert_eq!(sha256_key(b"hello world"), 0x083e_4d93_b927_4db9);
    }

    #[test]
    fn prefix_ignores_bytes_past_limit() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");
        let mut content = vec![7u8; PREFIX_LEN as usize];
        std::fs::write(&a, &content).unwrap();
        content.extend_from_slice(b"tail");
        std::fs::write(&b, &content).unwrap();

        assert_eq!(
            prefix_key(&a, sha256_key).unwrap(),
            prefix_key(&b, sha256_key).unwrap()
        );
        assert!(!files_identical(&a, &b).unwrap());
    }

    #[test]
    fn identical_files_compare_equal() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        let content: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&a, &content).unwrap();
        std::fs::write(&b, &content).unwrap();

        assert!(files_identical(&a, &b).unwrap());
    }
}
