//! Atomic file writes
//!
//! Output is written to a sibling `.tmp` file, synced, then renamed over the
//! destination, so readers see either the old file or the complete new one.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Atomically write a file using a writer function
///
/// # Example
///
/// ```ignore
/// atomic_write_with("out/meilong.csv", |out| {
///     writeln!(out, "date,mean_price,median_price,active_count")
/// })?;
/// ```
pub fn atomic_write_with<P, F>(path: P, write_fn: F) -> io::Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let path = path.as_ref();
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(&temp_path)?);
    if let Err(e) = write_fn(&mut writer) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    writer.flush()?;

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    fs::rename(&temp_path, path)
}
