//! Recovery of the plaintext metadata stream from an LVZ file.
//!
//! LVZ files carry no flag saying how (or whether) they are compressed, so
//! decoding is a cascade: zlib, then gzip, then raw DEFLATE. The first
//! attempt that reaches a clean end of stream wins. If none does, the bytes
//! are taken as already-plain metadata. That fallback cannot tell an
//! uncompressed file from a corrupt compressed one; the header scanner's
//! admission rule is what filters garbage afterwards.
//!
//! Every attempt decodes into its own fresh buffer and a failed attempt's
//! partial output is dropped.

use flate2::read::GzDecoder;
use flate2::{Decompress, FlushDecompress, Status};
use std::fmt;
use std::io::Read;

/// Lower bound for the first output allocation of an attempt.
const MIN_CAPACITY: usize = 4096;

/// Extra bytes added on top of doubling when an output buffer fills up.
const GROWTH_SLACK: usize = 8192;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Which interpretation of the LVZ bytes produced the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Zlib,
    Gzip,
    RawDeflate,
    /// Nothing decoded cleanly; the input was copied as-is
    Verbatim,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Zlib => "zlib",
            Stage::Gzip => "gzip",
            Stage::RawDeflate => "raw deflate",
            Stage::Verbatim => "verbatim",
        };
        f.write_str(name)
    }
}

/// Decoded metadata stream together with the stage that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    pub data: Vec<u8>,
    pub stage: Stage,
}

impl Decompressed {
    pub fn is_verbatim(&self) -> bool {
        self.stage == Stage::Verbatim
    }
}

/// Run the decompression cascade over `raw`.
///
/// Never fails: input that no decoder accepts, the empty buffer included,
/// comes back verbatim.
pub fn decompress(raw: &[u8]) -> Decompressed {
    let attempts: [(Stage, fn(&[u8]) -> Option<Vec<u8>>); 3] = [
        (Stage::Zlib, |input| inflate(input, true)),
        (Stage::Gzip, gunzip),
        (Stage::RawDeflate, |input| inflate(input, false)),
    ];

    for (stage, attempt) in attempts {
        if let Some(data) = attempt(raw) {
            return Decompressed { data, stage };
        }
    }

    Decompressed {
        data: raw.to_vec(),
        stage: Stage::Verbatim,
    }
}

fn initial_capacity(input_len: usize) -> usize {
    input_len
        .saturating_mul(3)
        .saturating_add(1024)
        .max(MIN_CAPACITY)
}

/// Inflate a zlib-wrapped (`zlib_header`) or headerless DEFLATE stream.
///
/// Returns `None` on a format error, or when the input runs out before the
/// decoder sees the end-of-stream marker.
fn inflate(input: &[u8], zlib_header: bool) -> Option<Vec<u8>> {
    let mut inflater = Decompress::new(zlib_header);
    let mut out = Vec::with_capacity(initial_capacity(input.len()));

    loop {
        if out.len() == out.capacity() {
            out.reserve_exact(out.capacity() + GROWTH_SLACK);
        }

        let before_in = inflater.total_in();
        let before_out = inflater.total_out();
        let remaining = input.get(usize::try_from(before_in).ok()?..)?;

        match inflater
            .decompress_vec(remaining, &mut out, FlushDecompress::None)
            .ok()?
        {
            Status::StreamEnd => return Some(out),
            Status::Ok | Status::BufError => {
                // output always has room here, so no progress means no input
                if inflater.total_in() == before_in && inflater.total_out() == before_out {
                    return None;
                }
            }
        }
    }
}

/// Decode a single gzip member, trailer checksum included.
fn gunzip(input: &[u8]) -> Option<Vec<u8>> {
    if !input.starts_with(&GZIP_MAGIC) {
        return None;
    }

    let mut out = Vec::with_capacity(initial_capacity(input.len()));
    GzDecoder::new(input).read_to_end(&mut out).ok()?;
    Some(out)
}
