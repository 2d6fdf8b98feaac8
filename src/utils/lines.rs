use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 1 << 16;

/// Number of `\n` bytes in `path`.
///
/// Used to size the block id universe of a trace without parsing it, so a
/// final line without a newline is not counted.
pub fn count_newlines(path: &Path) -> io::Result<u64> {
    let mut file = File::open(path)?;
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut count = 0u64;

    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        count += memchr::memchr_iter(b'\n', &buf[..read]).count() as u64;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_count_newlines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for _ in 0..5 {
            writeln!(file, "0.1 200 1300 1").unwrap();
        }
        write!(file, "0.1 200 1300 2").unwrap();
        file.flush().unwrap();

        assert_eq!(count_newlines(file.path()).unwrap(), 5);
    }

    #[test]
    fn test_count_spans_chunks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let line = "x".repeat(999);
        for _ in 0..200 {
            writeln!(file, "{line}").unwrap();
        }
        file.flush().unwrap();

        assert_eq!(count_newlines(file.path()).unwrap(), 200);
    }
}
