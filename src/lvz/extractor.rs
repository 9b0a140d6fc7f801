use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

use crate::error::ExtractError;
use crate::io::ReadAt;
use anyhow::{Result, anyhow};

use super::decompress::Stage;
use super::index::MetadataIndex;
use super::scanner::SCAN_LOG_LIMIT;
use super::structures::{HEADER_SIZE, HeaderRecord, PayloadWindow};

/// Size of one payload copy step, and so the peak buffer per record.
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

/// Tuning knobs for an extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Bytes copied from the IMG source per read
    pub chunk_size: usize,
    /// How many admitted headers are logged in full during the scan
    pub scan_report_limit: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            scan_report_limit: SCAN_LOG_LIMIT,
        }
    }
}

/// Outcome of writing one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Materialized {
    pub window: PayloadWindow,
    /// Payload bytes actually copied; less than the window on a short read
    pub payload_written: u64,
}

impl Materialized {
    pub fn total_written(&self) -> u64 {
        HEADER_SIZE as u64 + self.payload_written
    }

    pub fn is_short(&self) -> bool {
        self.payload_written < self.window.len()
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    pub lvz_bytes: usize,
    pub stream_bytes: usize,
    pub stage: Stage,
    pub headers_found: usize,
    /// Records written, clipped and header-only ones included
    pub written: usize,
    pub failed: usize,
    /// Records whose payload was cut at the end of the IMG. A payload that
    /// starts exactly at the end is counted here with nothing kept.
    pub clipped: usize,
    /// Records whose payload starts past the end of the IMG
    pub header_only: usize,
    pub payload_bytes: u64,
}

/// Write one record to `sink`: the 32 header bytes from `stream`, then the
/// header's payload window read from `source`.
///
/// The payload is streamed in `chunk_size` pieces. A short read from the
/// source ends the copy early; the record is then shorter than declared but
/// still counts as written.
pub async fn materialize<R, W>(
    header: &HeaderRecord,
    stream: &[u8],
    source: &R,
    sink: &mut W,
    chunk_size: usize,
) -> Result<Materialized>
where
    R: ReadAt + ?Sized,
    W: AsyncWrite + Unpin,
{
    let header_bytes = header.header_bytes(stream).ok_or_else(|| {
        anyhow!(
            "header at stream offset {} runs past the {}-byte stream",
            header.stream_offset,
            stream.len()
        )
    })?;
    sink.write_all(header_bytes).await?;

    let window = header.payload_window(source.size());
    let (start, end) = window.range();
    let payload_written = copy_range(source, start, end, sink, chunk_size).await?;

    Ok(Materialized {
        window,
        payload_written,
    })
}

/// Copy `[start, end)` of `source` into `sink`, returning the bytes copied.
async fn copy_range<R, W>(
    source: &R,
    start: u64,
    end: u64,
    sink: &mut W,
    chunk_size: usize,
) -> Result<u64>
where
    R: ReadAt + ?Sized,
    W: AsyncWrite + Unpin,
{
    let mut left = end.saturating_sub(start);
    if left == 0 {
        return Ok(0);
    }

    let chunk = usize::try_from(left).map_or(chunk_size, |l| l.min(chunk_size)).max(1);
    let mut buf = vec![0u8; chunk];
    let mut offset = start;
    let mut total = 0u64;

    while left > 0 {
        let want = usize::try_from(left).map_or(buf.len(), |l| l.min(buf.len()));
        let got = source.read_at(offset, &mut buf[..want]).await?;
        if got == 0 {
            break;
        }

        sink.write_all(&buf[..got]).await?;
        left -= got as u64;
        offset += got as u64;
        total += got as u64;

        if got < want {
            // source ended earlier than its reported size
            break;
        }
    }

    Ok(total)
}

/// WRLD record extractor over a random-access IMG source.
pub struct WrldExtractor<R: ReadAt> {
    reader: Arc<R>,
    options: ExtractOptions,
}

impl<R: ReadAt> WrldExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self::with_options(reader, ExtractOptions::default())
    }

    pub fn with_options(reader: Arc<R>, options: ExtractOptions) -> Self {
        Self { reader, options }
    }

    /// Decode `lvz` and write every record under `out_dir`.
    pub async fn extract(&self, lvz: &[u8], out_dir: &Path) -> Result<ExtractSummary, ExtractError> {
        let index = MetadataIndex::load(lvz, self.options.scan_report_limit)?;
        Ok(self.extract_all(&index, lvz.len(), out_dir).await)
    }

    /// Write every record of `index` to `out_dir`, in header order.
    ///
    /// Individual failures are logged and counted; the batch always runs to
    /// the end.
    pub async fn extract_all(
        &self,
        index: &MetadataIndex,
        lvz_bytes: usize,
        out_dir: &Path,
    ) -> ExtractSummary {
        info!(img_bytes = self.reader.size(), "opened IMG");

        let mut summary = ExtractSummary {
            lvz_bytes,
            stream_bytes: index.stream.data.len(),
            stage: index.stream.stage,
            headers_found: index.headers.len(),
            written: 0,
            failed: 0,
            clipped: 0,
            header_only: 0,
            payload_bytes: 0,
        };

        for (i, header) in index.headers.iter().enumerate() {
            let path = out_dir.join(crate::paths::record_file_name(i));

            match self.extract_to_file(header, index.stream_bytes(), &path).await {
                Ok(done) => {
                    summary.written += 1;
                    summary.payload_bytes += done.payload_written;
                    match done.window {
                        PayloadWindow::Clipped { .. } => summary.clipped += 1,
                        PayloadWindow::BeyondSource { .. } => summary.header_only += 1,
                        PayloadWindow::Full { .. } => {}
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(path = %path.display(), error = %e, "failed to write record");
                }
            }
        }

        info!(
            written = summary.written,
            failed = summary.failed,
            out_dir = %out_dir.display(),
            "wrote WRLD files"
        );
        summary
    }

    /// Write `header`'s record to a new file at `output_path`.
    pub async fn extract_to_file(
        &self,
        header: &HeaderRecord,
        stream: &[u8],
        output_path: &Path,
    ) -> Result<Materialized> {
        // Create parent directories if needed
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = fs::File::create(output_path)
            .await
            .map_err(|e| anyhow!("cannot write {}: {}", output_path.display(), e))?;

        let done = materialize(
            header,
            stream,
            self.reader.as_ref(),
            &mut file,
            self.options.chunk_size,
        )
        .await?;
        file.flush().await?;

        match done.window {
            PayloadWindow::BeyondSource { start, source_size } => warn!(
                path = %output_path.display(),
                start,
                img_bytes = source_size,
                "payload starts beyond IMG; wrote header only"
            ),
            PayloadWindow::Clipped {
                start,
                declared_end,
                end,
            } => warn!(
                path = %output_path.display(),
                declared_end,
                clipped_end = end,
                kept = end - start,
                "payload clipped at end of IMG"
            ),
            PayloadWindow::Full { .. } => {}
        }
        if done.is_short() {
            warn!(
                path = %output_path.display(),
                expected = done.window.len(),
                copied = done.payload_written,
                "IMG read ended early"
            );
        }

        info!(
            path = %output_path.display(),
            header = HEADER_SIZE,
            body = done.payload_written,
            total_out = done.total_written(),
            expected = header.total_size,
            "built record"
        );
        Ok(done)
    }
}
