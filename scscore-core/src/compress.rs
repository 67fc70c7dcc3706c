//! Decompression of weight files with algorithm auto-detection.
//!
//! Weight files ship gzip-compressed; zstd is accepted too. The format is
//! chosen from the leading magic bytes, never from the file extension.

use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use crate::{Result, ScscoreError};

/// Supported compression algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Zstd,
    Gzip,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Zstd => f.write_str("zstd"),
            Algorithm::Gzip => f.write_str("gzip"),
        }
    }
}

/// Compress data using zstd at the given level (1–22).
pub fn zstd_compress(data: &[u8], level: i32) -> Result<Vec<u8>> {
    zstd::encode_all(data, level).map_err(|e| ScscoreError::Compression(e.to_string()))
}

/// Decompress zstd data.
pub fn zstd_decompress(data: &[u8]) -> Result<Vec<u8>> {
    zstd::decode_all(data).map_err(|e| ScscoreError::Compression(e.to_string()))
}

/// Compress data using gzip at the given level (0–9).
pub fn gzip_compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(level));
    encoder
        .write_all(data)
        .map_err(|e| ScscoreError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| ScscoreError::Compression(e.to_string()))
}

/// Decompress gzip data, including multi-member streams.
pub fn gzip_decompress(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::read::MultiGzDecoder;

    let mut decoder = MultiGzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| ScscoreError::Compression(e.to_string()))?;
    Ok(decompressed)
}

/// Detect the compression algorithm from the magic bytes of `data`.
///
/// Returns `None` if the data does not match a known format.
pub fn detect_algorithm(data: &[u8]) -> Option<Algorithm> {
    if data.starts_with(&[0x28, 0xB5, 0x2F, 0xFD]) {
        Some(Algorithm::Zstd)
    } else if data.starts_with(&[0x1F, 0x8B]) {
        Some(Algorithm::Gzip)
    } else {
        None
    }
}

/// Decompress data by auto-detecting the algorithm from magic bytes.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    match detect_algorithm(data) {
        Some(Algorithm::Zstd) => zstd_decompress(data),
        Some(Algorithm::Gzip) => gzip_decompress(data),
        None => Err(ScscoreError::Compression(
            "unknown compression format".into(),
        )),
    }
}

/// Read a whole file into memory, attaching the path to I/O errors.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|e| {
        ScscoreError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}
