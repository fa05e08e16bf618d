//! Plaintext and gzip-compressed input files.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use md5::{Digest, Md5};

use crate::error::AppError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Check if a file is gzipped by looking for the magic numbers.
///
/// Files shorter than the magic are treated as plaintext.
fn is_gzipped_file(path: &Path) -> io::Result<bool> {
    let mut file = File::open(path)?;
    let mut buffer = [0u8; 2];
    let mut filled = 0;
    while filled < buffer.len() {
        let n = file.read(&mut buffer[filled..])?;
        if n == 0 {
            return Ok(false);
        }
        filled += n;
    }
    Ok(buffer == GZIP_MAGIC)
}

/// Opens `path` for buffered reading, decompressing gzip content on the fly.
///
/// Every member of a multi-member gzip file is read, as produced by `bgzip`
/// or by concatenating compressed files.
pub fn open_input(path: &Path) -> Result<BufReader<Box<dyn Read>>, AppError> {
    if !path.exists() {
        return Err(AppError::invalid_input(path, "file does not exist"));
    }
    let file = File::open(path)?;
    let reader: Box<dyn Read> = if is_gzipped_file(path)? {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(BufReader::new(reader))
}

/// Reads all lines of a possibly compressed text file.
pub fn read_lines(path: &Path) -> Result<Vec<String>, AppError> {
    let reader = open_input(path)?;
    reader
        .lines()
        .collect::<Result<Vec<_>, _>>()
        .map_err(AppError::from)
}

/// Computes the lowercase hex MD5 digest of a file, streaming its content.
pub fn md5_file(path: &Path) -> Result<String, AppError> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
