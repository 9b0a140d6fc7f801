//! # unimg
//!
//! Recover WRLD records from LVZ/IMG container pairs.
//!
//! An LVZ file holds a metadata stream of 32-byte WRLD headers, usually
//! compressed and with no directory. Each header points into the companion
//! IMG file, which holds the record payloads. This crate decodes the
//! metadata, locates the headers by scanning for their tag, and writes every
//! record as its header followed by its IMG payload.
//!
//! ## Features
//!
//! - zlib, gzip and raw DEFLATE metadata, detected by trial decoding
//! - Uncompressed metadata taken as-is when no decoder accepts it
//! - Payload windows clipped to the IMG file instead of failing
//! - Payload streamed in fixed-size chunks, so IMG files beyond 4 GiB are fine
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use unimg::{LocalFileReader, WrldExtractor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let lvz = std::fs::read("BEACH.LVZ")?;
//!     let img = Arc::new(LocalFileReader::new(Path::new("BEACH.IMG"))?);
//!
//!     let summary = WrldExtractor::new(img).extract(&lvz, Path::new("out_wrld")).await?;
//!     println!("{} of {} records written", summary.written, summary.headers_found);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod lvz;
pub mod paths;
pub mod run;

pub use cli::Cli;
pub use error::ExtractError;
pub use io::{LocalFileReader, MemoryReader, ReadAt};
pub use lvz::{ExtractOptions, ExtractSummary, HeaderRecord, MetadataIndex, WrldExtractor};
