use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

pub type LossyBufReader = BufReader<DecodeReaderBytes<File, Vec<u8>>>;

// 실행 중인 전송 프로세스가 쓰고 있는 로그는 UTF-8 시퀀스 중간에서 잘릴 수 있음.
// UTF-8로 강제 디코딩하여 잘못된 바이트는 U+FFFD로 대체한다.
fn lossy_decoder(file: File) -> DecodeReaderBytes<File, Vec<u8>> {
    DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding_rs::UTF_8))
        .build(file)
}

/// Open `path` as UTF-8 text, replacing invalid sequences instead of failing.
pub fn open_lossy_reader(path: &Path, buffer_size: usize) -> io::Result<LossyBufReader> {
    let file = File::open(path)?;
    Ok(BufReader::with_capacity(buffer_size, lossy_decoder(file)))
}

/// Read the whole of `path` with the same replacement rules as
/// [`open_lossy_reader`].
pub fn read_lossy_to_string(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let mut decoder = lossy_decoder(file);
    let mut contents = String::new();
    decoder.read_to_string(&mut contents)?;
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, Write};

    #[test]
    fn test_truncated_utf8_is_replaced() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[INFO] quiche: stream 9 send complete\n").unwrap();
        // "우" cut after its first two bytes
        file.write_all(&[0xEC, 0x9A]).unwrap();
        file.flush().unwrap();

        let text = read_lossy_to_string(file.path()).unwrap();
        assert!(text.starts_with("[INFO] quiche: stream 9 send complete\n"));
        assert!(text.ends_with('\u{FFFD}'));

        let reader = open_lossy_reader(file.path(), 64).unwrap();
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 2);
    }
}
