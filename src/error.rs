use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Conditions that end a run before or instead of writing records.
///
/// Problems with a single record never show up here; they are logged and
/// counted in [`ExtractSummary`](crate::ExtractSummary).
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot read LVZ {}: {source}", .path.display())]
    ReadLvz {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("matching IMG not found for {} (tried: {})", .lvz.display(), .tried.display())]
    ImgNotFound { lvz: PathBuf, tried: PathBuf },

    #[error("cannot open IMG {}: {source}", .path.display())]
    OpenImg {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create output directory {}: {source}", .path.display())]
    CreateOutDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open log file {}: {source}", .path.display())]
    OpenLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("decompressed stream too small ({len} bytes, a header needs 32)")]
    StreamTooSmall { len: usize },

    #[error("no WRLD headers found")]
    NoHeaders,
}

impl ExtractError {
    /// Process exit code reported for this condition.
    pub fn exit_code(&self) -> u8 {
        match self {
            ExtractError::ImgNotFound { .. } => 2,
            ExtractError::StreamTooSmall { .. } => 3,
            ExtractError::NoHeaders => 4,
            ExtractError::OpenImg { .. } => 5,
            ExtractError::ReadLvz { .. }
            | ExtractError::CreateOutDir { .. }
            | ExtractError::OpenLog { .. } => 1,
        }
    }

    /// Whether the input was readable but simply held nothing to extract.
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            ExtractError::StreamTooSmall { .. } | ExtractError::NoHeaders
        )
    }
}
