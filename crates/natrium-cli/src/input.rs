//! Input and output helpers for the CLI.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use zeroize::Zeroizing;

/// Read chunk size for streamed hashing
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Open `path` for reading, with `-` meaning stdin.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn Read>> {
    if path == Path::new("-") {
        Ok(Box::new(io::stdin().lock()))
    } else {
        let file = File::open(path)
            .map_err(|e| anyhow::anyhow!("cannot open {}: {}", path.display(), e))?;
        Ok(Box::new(file))
    }
}

/// Read all of `path` (or stdin for `-`).
///
/// # Errors
///
/// Returns an error if the input cannot be read.
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut data = Vec::new();
    open_input(path)?.read_to_end(&mut data)?;
    Ok(data)
}

/// Write `data` to `path`, or to stdout when no path is given.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_output(path: Option<&Path>, data: &[u8]) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, data)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Decode a hex argument, checking its decoded length.
///
/// # Errors
///
/// Returns an error for malformed hex or the wrong length.
pub fn decode_hex(what: &str, value: &str, expected: usize) -> anyhow::Result<Vec<u8>> {
    let bytes = hex::decode(value.trim())
        .map_err(|e| anyhow::anyhow!("{} is not valid hex: {}", what, e))?;
    if bytes.len() != expected {
        anyhow::bail!(
            "{} must be {} bytes ({} hex characters), got {}",
            what,
            expected,
            expected * 2,
            bytes.len()
        );
    }
    Ok(bytes)
}

/// [`decode_hex`] for key material.
///
/// # Errors
///
/// Returns an error for malformed hex or the wrong length.
pub fn decode_secret_hex(
    what: &str,
    value: &str,
    expected: usize,
) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    decode_hex(what, value, expected).map(Zeroizing::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex_lengths() {
        assert_eq!(decode_hex("key", "0a0b", 2).unwrap(), vec![0x0a, 0x0b]);
        assert!(decode_hex("key", "0a0b", 3).is_err());
        assert!(decode_hex("key", "zz", 1).is_err());
        assert_eq!(decode_secret_hex("key", " ff \n", 1).unwrap()[..], [0xff]);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub/out.bin");
        write_output(Some(&path), b"payload").unwrap();
        assert_eq!(read_input(&path).unwrap(), b"payload");
        assert!(read_input(&dir.path().join("missing")).is_err());
    }
}
