//! Random-access byte sources.
//!
//! The companion IMG file is only ever read, never written, and records
//! reference it by absolute offset. Everything that needs payload bytes goes
//! through [`ReadAt`] so the extractor does not care whether the bytes live
//! on disk or in memory.

mod local;
mod memory;

pub use local::LocalFileReader;
pub use memory::MemoryReader;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer.
    ///
    /// Returns the number of bytes read, which is smaller than `buf.len()`
    /// when the read reaches the end of the source and `0` at or past it.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;
}
