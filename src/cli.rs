use clap::Parser;
use std::path::PathBuf;

use crate::lvz::{DEFAULT_CHUNK_SIZE, ExtractOptions, SCAN_LOG_LIMIT};
use crate::paths::{LOG_FILE_NAME, companion_img_path, default_out_dir};

#[derive(Parser, Debug)]
#[command(name = "unimg")]
#[command(version)]
#[command(about = "Extract WRLD records from an LVZ/IMG pair", long_about = None)]
#[command(after_help = "Examples:\n  \
  unimg BEACH.LVZ                 read BEACH.IMG, write BEACH's records to out_wrld/\n  \
  unimg BEACH.LVZ -d wrld         write records to ./wrld\n  \
  unimg lvz/BEACH.LVZ --img BEACH.IMG   use an IMG from elsewhere")]
pub struct Cli {
    /// LVZ metadata file
    #[arg(value_name = "LVZ")]
    pub lvz: PathBuf,

    /// Companion IMG file (default: <LVZ stem>.IMG next to the LVZ)
    #[arg(long, value_name = "PATH")]
    pub img: Option<PathBuf>,

    /// Write records into DIR (default: out_wrld next to the LVZ)
    #[arg(short = 'd', long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Diagnostic log file (default: DIR/wrld_import.log)
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Payload copy chunk size in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Quiet mode, no summary on stderr
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn img_path(&self) -> PathBuf {
        self.img
            .clone()
            .unwrap_or_else(|| companion_img_path(&self.lvz))
    }

    pub fn out_dir(&self) -> PathBuf {
        self.out_dir
            .clone()
            .unwrap_or_else(|| default_out_dir(&self.lvz))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log
            .clone()
            .unwrap_or_else(|| self.out_dir().join(LOG_FILE_NAME))
    }

    pub fn options(&self) -> ExtractOptions {
        ExtractOptions {
            chunk_size: self.chunk_size.max(1),
            scan_report_limit: SCAN_LOG_LIMIT,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }
}
