use super::ReadAt;
use anyhow::Result;
use async_trait::async_trait;
use std::io;
use std::path::Path;

/// Local file reader with random access support
pub struct LocalFileReader {
    file: std::fs::File,
    size: u64,
}

impl LocalFileReader {
    /// Open `path` read-only and record its current length.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = std::fs::File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || offset >= self.size {
            return Ok(0);
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            Ok(self.file.read_at(buf, offset)?)
        }

        #[cfg(windows)]
        {
            use std::os::windows::fs::FileExt;
            // seek_read moves the shared cursor, but nothing here relies on it
            Ok(self.file.seek_read(buf, offset)?)
        }

        #[cfg(not(any(unix, windows)))]
        {
            use std::io::{Read, Seek, SeekFrom};
            let mut file = &self.file;
            file.seek(SeekFrom::Start(offset))?;
            Ok(file.read(buf)?)
        }
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn reads_at_offset_and_stops_at_end() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"0123456789").unwrap();
        tmp.flush().unwrap();

        let reader = LocalFileReader::new(tmp.path()).unwrap();
        assert_eq!(reader.size(), 10);

        let mut buf = [0u8; 4];
        assert_eq!(reader.read_at(3, &mut buf).await.unwrap(), 4);
        assert_eq!(&buf, b"3456");

        let mut tail = [0u8; 8];
        let n = reader.read_at(8, &mut tail).await.unwrap();
        assert_eq!(&tail[..n], b"89");

        assert_eq!(reader.read_at(10, &mut buf).await.unwrap(), 0);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFileReader::new(&dir.path().join("nope.img")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
