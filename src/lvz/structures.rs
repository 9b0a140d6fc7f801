use byteorder::{ByteOrder, LittleEndian};

use anyhow::{Result, bail};

/// Tag that opens every WRLD header ("DLRW" on disk).
pub const TAG: &[u8; 4] = b"DLRW";

/// Fixed size of a WRLD header, tag included.
pub const HEADER_SIZE: usize = 32;

/// One WRLD header located in the decompressed metadata stream.
///
/// Only the offset of the header is kept, never a borrow of the stream, so a
/// list of these can be sorted and deduplicated on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRecord {
    /// Offset of the tag within the metadata stream
    pub stream_offset: u64,
    pub record_type: u32,
    /// Declared record size, header included
    pub total_size: u32,
    pub field_a: u32,
    pub field_b: u32,
    pub field_count: u32,
    /// Absolute offset of the payload in the companion IMG file
    pub payload_offset: u32,
    pub reserved: u32,
}

impl HeaderRecord {
    /// Parse the header starting at `data[0]`, which sits at `stream_offset`
    /// in the metadata stream.
    ///
    /// This only decodes the fields; use [`is_admissible`](Self::is_admissible)
    /// to decide whether the candidate is a real record.
    pub fn from_bytes(stream_offset: u64, data: &[u8]) -> Result<Self> {
        let Some(bytes) = data.first_chunk::<HEADER_SIZE>() else {
            bail!("WRLD header truncated ({} of {} bytes)", data.len(), HEADER_SIZE);
        };

        if &bytes[0..4] != TAG {
            bail!("Invalid WRLD header tag");
        }

        Ok(Self::parse(stream_offset, bytes))
    }

    /// Decode the fields of a full header window. The tag is not checked.
    pub fn parse(stream_offset: u64, bytes: &[u8; HEADER_SIZE]) -> Self {
        let field = |at: usize| LittleEndian::read_u32(&bytes[at..at + 4]);

        Self {
            stream_offset,
            record_type: field(0x04),
            total_size: field(0x08),
            field_a: field(0x0C),
            field_b: field(0x10),
            field_count: field(0x14),
            payload_offset: field(0x18),
            reserved: field(0x1C),
        }
    }

    /// Admission rule for scanned candidates.
    pub fn is_admissible(&self) -> bool {
        self.total_size >= HEADER_SIZE as u32 && self.payload_offset != 0
    }

    /// Payload bytes the header declares after its own 32 bytes.
    pub fn payload_len(&self) -> u64 {
        (self.total_size as u64).saturating_sub(HEADER_SIZE as u64)
    }

    /// The raw 32 header bytes, re-read from the stream it was found in.
    pub fn header_bytes<'a>(&self, stream: &'a [u8]) -> Option<&'a [u8]> {
        let start = usize::try_from(self.stream_offset).ok()?;
        stream.get(start..start.checked_add(HEADER_SIZE)?)
    }

    /// Resolve the declared payload against a source of `source_size` bytes.
    pub fn payload_window(&self, source_size: u64) -> PayloadWindow {
        let start = self.payload_offset as u64;
        let declared_end = start + self.payload_len();

        if start > source_size {
            PayloadWindow::BeyondSource { start, source_size }
        } else if declared_end > source_size {
            PayloadWindow::Clipped {
                start,
                declared_end,
                end: source_size,
            }
        } else {
            PayloadWindow::Full {
                start,
                end: declared_end,
            }
        }
    }
}

/// Where a record's payload lives in the companion IMG file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadWindow {
    /// The declared window fits inside the source
    Full { start: u64, end: u64 },
    /// The window runs past the end of the source and was cut at `end`
    Clipped {
        start: u64,
        declared_end: u64,
        end: u64,
    },
    /// The payload would start past the end of the source; header only
    BeyondSource { start: u64, source_size: u64 },
}

impl PayloadWindow {
    /// Half-open byte range to copy. Empty for [`PayloadWindow::BeyondSource`].
    pub fn range(&self) -> (u64, u64) {
        match *self {
            PayloadWindow::Full { start, end } | PayloadWindow::Clipped { start, end, .. } => {
                (start, end)
            }
            PayloadWindow::BeyondSource { start, .. } => (start, start),
        }
    }

    pub fn len(&self) -> u64 {
        let (start, end) = self.range();
        end - start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        matches!(self, PayloadWindow::Full { .. })
    }
}
