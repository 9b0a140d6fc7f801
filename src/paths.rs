//! File naming conventions around an LVZ file.

use std::path::{Path, PathBuf};

/// Directory created next to the LVZ file when none is given.
pub const OUTPUT_DIR_NAME: &str = "out_wrld";

/// Diagnostic log written inside the output directory.
pub const LOG_FILE_NAME: &str = "wrld_import.log";

/// Companion IMG path for `lvz`: `<stem>.IMG`, else `<stem>.img`, in the
/// same directory.
///
/// When neither exists the `.IMG` candidate is returned so the caller can
/// report what was tried.
pub fn companion_img_path(lvz: &Path) -> PathBuf {
    let upper = lvz.with_extension("IMG");
    if upper.is_file() {
        return upper;
    }

    let lower = lvz.with_extension("img");
    if lower.is_file() {
        return lower;
    }

    upper
}

/// Default output directory for `lvz`.
pub fn default_out_dir(lvz: &Path) -> PathBuf {
    match lvz.parent() {
        Some(dir) => dir.join(OUTPUT_DIR_NAME),
        None => PathBuf::from(OUTPUT_DIR_NAME),
    }
}

/// File name of the record at position `index` in the header list.
pub fn record_file_name(index: usize) -> String {
    format!("wrld_{:04}.wrld", index)
}
