//! One extraction run as the CLI performs it.
//!
//! A run has two halves. [`prepare`] resolves and checks paths before any
//! diagnostics exist, since the log lives in the output directory.
//! [`execute`] then does the work, emitting `tracing` events that the caller
//! routes with [`log_subscriber`].

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;

use crate::cli::Cli;
use crate::error::ExtractError;
use crate::io::LocalFileReader;
use crate::lvz::{ExtractSummary, MetadataIndex, WrldExtractor};

/// Paths a run reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub img: PathBuf,
    pub out_dir: PathBuf,
    pub log: PathBuf,
}

/// Locate the companion IMG and create the output directory.
///
/// # Errors
///
/// [`ExtractError::ImgNotFound`] when the IMG does not exist, checked before
/// anything is created on disk.
pub fn prepare(cli: &Cli) -> Result<RunPaths, ExtractError> {
    let img = cli.img_path();
    if !img.is_file() {
        return Err(ExtractError::ImgNotFound {
            lvz: cli.lvz.clone(),
            tried: img,
        });
    }

    let out_dir = cli.out_dir();
    std::fs::create_dir_all(&out_dir).map_err(|source| ExtractError::CreateOutDir {
        path: out_dir.clone(),
        source,
    })?;

    Ok(RunPaths {
        img,
        out_dir,
        log: cli.log_path(),
    })
}

/// Read and scan the LVZ, then write its records from the IMG.
///
/// The LVZ is decoded and scanned before the IMG is opened, so an empty LVZ
/// is reported as such even when the IMG is unreadable.
pub async fn execute(cli: &Cli, paths: &RunPaths) -> Result<ExtractSummary, ExtractError> {
    info!(
        lvz = %cli.lvz.display(),
        img = %paths.img.display(),
        out = %paths.out_dir.display(),
        "unimg run started"
    );

    let lvz = tokio::fs::read(&cli.lvz)
        .await
        .map_err(|source| ExtractError::ReadLvz {
            path: cli.lvz.clone(),
            source,
        })?;

    let options = cli.options();
    let index = MetadataIndex::load(&lvz, options.scan_report_limit)?;

    let reader = LocalFileReader::new(&paths.img).map_err(|source| ExtractError::OpenImg {
        path: paths.img.clone(),
        source,
    })?;
    let extractor = WrldExtractor::with_options(Arc::new(reader), options);

    Ok(extractor.extract_all(&index, lvz.len(), &paths.out_dir).await)
}

/// Plain-text diagnostic subscriber writing to `make_writer`.
pub fn log_subscriber<W>(make_writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_writer(make_writer)
        .with_ansi(false)
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish()
}
