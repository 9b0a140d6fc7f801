//! LVZ metadata decoding and WRLD record extraction.
//!
//! ## Format Overview
//!
//! A level is stored as two files:
//! 1. An LVZ file holding the metadata stream, compressed with zlib, gzip or
//!    raw DEFLATE, or not compressed at all
//! 2. A companion IMG file holding the bulk payload of every record
//!
//! Each WRLD record starts with a 32-byte header in the metadata stream:
//!
//! | Offset | Field              |
//! |--------|--------------------|
//! | 0x00   | tag `DLRW`         |
//! | 0x04   | record type        |
//! | 0x08   | total size         |
//! | 0x0C   | aux field A        |
//! | 0x10   | aux field B        |
//! | 0x14   | field count        |
//! | 0x18   | IMG payload offset |
//! | 0x1C   | reserved           |
//!
//! All fields are little-endian `u32`. The stream has no directory, so the
//! headers are located by scanning for the tag. A record on output is its
//! header followed by `total size - 32` bytes of the IMG file starting at the
//! payload offset, clipped to the IMG file's length.
//!
//! ## Pipeline
//!
//! - [`decompress`]: cascade that recovers the metadata stream
//! - [`scanner`]: tag scan, admission rule and normalization
//! - [`index`]: ties the two together into a [`MetadataIndex`]
//! - [`extractor`]: writes each record from the index and the IMG source

pub mod decompress;
pub mod extractor;
pub mod index;
pub mod scanner;
mod structures;

pub use decompress::{Decompressed, Stage, decompress};
pub use extractor::{
    DEFAULT_CHUNK_SIZE, ExtractOptions, ExtractSummary, Materialized, WrldExtractor, materialize,
};
pub use index::MetadataIndex;
pub use scanner::{SCAN_LOG_LIMIT, normalize, scan, scan_with};
pub use structures::*;
