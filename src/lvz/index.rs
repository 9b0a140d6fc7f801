use tracing::{error, info, warn};

use super::decompress::{Decompressed, decompress};
use super::scanner::{normalize, scan_with};
use super::structures::{HEADER_SIZE, HeaderRecord, TAG};
use crate::error::ExtractError;

/// The decoded metadata stream and the canonical header list found in it.
///
/// Headers are sorted by stream offset with no repeats, so record numbers
/// derived from their position are stable for a given LVZ file.
#[derive(Debug, Clone)]
pub struct MetadataIndex {
    pub stream: Decompressed,
    pub headers: Vec<HeaderRecord>,
}

impl MetadataIndex {
    /// Decode raw LVZ bytes and collect their WRLD headers.
    ///
    /// The first `report_limit` admitted headers are logged with all their
    /// fields.
    ///
    /// # Errors
    ///
    /// [`ExtractError::StreamTooSmall`] when the decoded stream cannot hold a
    /// single header, [`ExtractError::NoHeaders`] when the scan admits none.
    pub fn load(raw: &[u8], report_limit: usize) -> Result<Self, ExtractError> {
        let stream = decompress(raw);
        info!(
            lvz_bytes = raw.len(),
            decompressed_bytes = stream.data.len(),
            stage = %stream.stage,
            "decoded LVZ metadata"
        );

        if stream.data.len() < HEADER_SIZE {
            error!(len = stream.data.len(), "decompressed stream too small");
            return Err(ExtractError::StreamTooSmall {
                len: stream.data.len(),
            });
        }
        if !stream.data.starts_with(TAG) {
            warn!("decompressed data does not start with DLRW, scanning anyway");
        }

        let scanned = scan_with(&stream.data, report_limit, |index, h| {
            info!(
                index,
                offset = h.stream_offset,
                record_type = h.record_type,
                total_size = h.total_size,
                field_a = h.field_a,
                field_b = h.field_b,
                field_count = h.field_count,
                payload_offset = h.payload_offset,
                "admitted header"
            );
        });
        let headers = normalize(scanned);
        info!(count = headers.len(), "total WRLD headers");

        if headers.is_empty() {
            error!("no WRLD headers");
            return Err(ExtractError::NoHeaders);
        }

        Ok(Self { stream, headers })
    }

    pub fn stream_bytes(&self) -> &[u8] {
        &self.stream.data
    }
}
