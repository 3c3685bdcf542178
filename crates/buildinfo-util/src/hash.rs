//! Streaming multi-digest checksums.
//!
//! Every artifact the collector touches needs SHA-1, SHA-256, and MD-5
//! simultaneously (BuildInfo's `Checksum` model carries all three). Reading
//! the file three times would triple I/O for no reason, so a single
//! `BufReader` pass feeds all three hashers at once.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::errors::BuildInfoError;

const BUFFER_SIZE: usize = 64 * 1024;

/// The three digests BuildInfo carries for every artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiDigest {
    pub sha1: String,
    pub sha256: String,
    pub md5: String,
}

/// Compute SHA-1, SHA-256, and MD-5 for `path` in a single streaming pass.
pub fn digest_file(path: &Path) -> Result<MultiDigest, BuildInfoError> {
    let file = File::open(path).map_err(|e| BuildInfoError::ChecksumIoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    digest_reader(&mut reader).map_err(|e| BuildInfoError::ChecksumIoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Compute SHA-1, SHA-256, and MD-5 over any `Read` in a single streaming pass.
pub fn digest_reader<R: Read>(reader: &mut R) -> std::io::Result<MultiDigest> {
    let mut sha1 = Sha1::new();
    let mut sha256 = Sha256::new();
    let mut md5 = Md5::new();
    let mut buf = [0u8; BUFFER_SIZE];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        sha1.update(&buf[..n]);
        sha256.update(&buf[..n]);
        md5.update(&buf[..n]);
    }

    Ok(MultiDigest {
        sha1: hex::encode(sha1.finalize()),
        sha256: hex::encode(sha256.finalize()),
        md5: hex::encode(md5.finalize()),
    })
}

/// Compute all three digests over an in-memory byte slice.
pub fn digest_bytes(bytes: &[u8]) -> MultiDigest {
    MultiDigest {
        sha1: hex::encode(Sha1::digest(bytes)),
        sha256: hex::encode(Sha256::digest(bytes)),
        md5: hex::encode(Md5::digest(bytes)),
    }
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        use std::fmt::Write;
        bytes.as_ref().iter().fold(String::new(), |mut acc, b| {
            let _ = write!(acc, "{b:02x}");
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_bytes_matches_known_vectors() {
        let digest = digest_bytes(b"abc");
        assert_eq!(digest.sha1, "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(
            digest.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(digest.md5, "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn digest_file_reads_whole_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), b"hello world").unwrap();

        let digest = digest_file(tmp.path()).unwrap();
        let expected = digest_bytes(b"hello world");
        assert_eq!(digest, expected);
    }

    #[test]
    fn digest_file_missing_returns_checksum_io_error() {
        let path = Path::new("/nonexistent/path/that/does/not/exist.jar");
        let result = digest_file(path);
        assert!(matches!(result, Err(BuildInfoError::ChecksumIoError { .. })));
    }

    #[test]
    fn digest_reader_handles_large_input_across_buffer_boundaries() {
        let data = vec![0x42u8; BUFFER_SIZE * 3 + 17];
        let mut cursor = std::io::Cursor::new(&data);
        let streamed = digest_reader(&mut cursor).unwrap();
        let whole = digest_bytes(&data);
        assert_eq!(streamed, whole);
    }
}
