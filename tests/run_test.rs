use byteorder::{LittleEndian, WriteBytesExt};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use unimg::{Cli, ExtractError, run};

/// Shared in-memory sink for the diagnostic log.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn header(record_type: u32, total_size: u32, payload_offset: u32) -> Vec<u8> {
    let mut buf = b"DLRW".to_vec();
    for field in [record_type, total_size, 0, 0, 1, payload_offset, 0] {
        buf.write_u32::<LittleEndian>(field).unwrap();
    }
    buf
}

fn cli_for(lvz: &Path) -> Cli {
    Cli::parse_from([Path::new("unimg"), lvz])
}

/// LVZ with a 2-byte prefix and three headers at 2, 34 and 66 against an
/// 8-byte IMG: one clipped, one past the end, one starting at the end.
fn level(dir: &TempDir) -> PathBuf {
    let mut lvz = vec![0xEE, 0xEE];
    lvz.extend(header(1, 40, 4));
    lvz.extend(header(2, 40, 100));
    lvz.extend(header(3, 40, 8));

    let path = dir.path().join("L.lvz");
    fs::write(&path, &lvz).unwrap();
    fs::write(dir.path().join("L.img"), b"abcdefgh").unwrap();
    path
}

#[tokio::test]
async fn test_log_records_run_details() {
    let tmp = TempDir::new().unwrap();
    let cli = cli_for(&level(&tmp));

    let log = LogBuffer::default();
    let writer = log.clone();
    let _guard = tracing::subscriber::set_default(run::log_subscriber(move || writer.clone()));

    let paths = run::prepare(&cli).unwrap();
    assert_eq!(paths.img, tmp.path().join("L.img"));
    assert_eq!(paths.out_dir, tmp.path().join("out_wrld"));

    let summary = run::execute(&cli, &paths).await.unwrap();
    assert_eq!(summary.headers_found, 3);
    assert_eq!(summary.written, 3);
    assert_eq!(summary.clipped, 2);
    assert_eq!(summary.header_only, 1);

    let text = log.contents();
    for expected in [
        "decoded LVZ metadata lvz_bytes=98 decompressed_bytes=98 stage=verbatim",
        "decompressed data does not start with DLRW, scanning anyway",
        "admitted header index=0 offset=2 record_type=1 total_size=40",
        "admitted header index=2 offset=66",
        "total WRLD headers count=3",
        "opened IMG img_bytes=8",
        "declared_end=12 clipped_end=8 kept=4",
        "declared_end=16 clipped_end=8 kept=0",
        "payload starts beyond IMG; wrote header only",
        "written=3 failed=0",
    ] {
        assert!(text.contains(expected), "missing {expected:?} in log:\n{text}");
    }

    let first = fs::read(paths.out_dir.join("wrld_0000.wrld")).unwrap();
    assert_eq!(&first[32..], b"efgh");
}

#[test]
fn test_missing_img_fails_before_output_dir() {
    let tmp = TempDir::new().unwrap();
    let lvz = tmp.path().join("L.lvz");
    fs::write(&lvz, header(1, 40, 4)).unwrap();

    let err = run::prepare(&cli_for(&lvz)).unwrap_err();
    assert!(matches!(err, ExtractError::ImgNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!tmp.path().join("out_wrld").exists());
}

#[tokio::test]
async fn test_lvz_scanned_before_img_opened() {
    let tmp = TempDir::new().unwrap();
    let lvz = level(&tmp);
    let cli = cli_for(&lvz);
    let paths = run::prepare(&cli).unwrap();

    // IMG disappears after preparation
    fs::remove_file(&paths.img).unwrap();

    let err = run::execute(&cli, &paths).await.unwrap_err();
    assert!(matches!(err, ExtractError::OpenImg { .. }));
    assert_eq!(err.exit_code(), 5);

    fs::write(&lvz, [0xEEu8; 64]).unwrap();
    let err = run::execute(&cli, &paths).await.unwrap_err();
    assert!(matches!(err, ExtractError::NoHeaders));
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn test_unreadable_lvz_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let lvz = level(&tmp);
    let cli = cli_for(&lvz);
    let paths = run::prepare(&cli).unwrap();
    fs::remove_file(&lvz).unwrap();

    let err = run::execute(&cli, &paths).await.unwrap_err();
    assert!(matches!(err, ExtractError::ReadLvz { .. }));
    assert_eq!(err.exit_code(), 1);
}
