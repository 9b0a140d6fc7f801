use super::ReadAt;
use anyhow::Result;
use async_trait::async_trait;

/// In-memory byte source.
///
/// Behaves like a file of the same length: reads past the end come back
/// short instead of failing.
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    data: Vec<u8>,
}

impl MemoryReader {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[async_trait]
impl ReadAt for MemoryReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let start = match usize::try_from(offset) {
            Ok(start) if start < self.data.len() => start,
            _ => return Ok(0),
        };
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
