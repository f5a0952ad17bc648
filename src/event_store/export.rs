//! Daily series export
//!
//! Writes a `DailySeries` as CSV with a header row, or in the compact
//! `M/D,mean,median,count` form used for quick plotting.

use std::io::Write;
use std::path::Path;

use crate::types::DailySeries;
use crate::utils::atomic_write_with;

use super::store::EventStoreResult;

/// Header row written by `write_csv`
pub const CSV_HEADER: [&str; 4] = ["date", "mean_price", "median_price", "active_count"];

/// Write the series as CSV with an ISO-date column
pub fn write_csv<W: Write>(series: &DailySeries, writer: W) -> EventStoreResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if series.is_empty() {
        wtr.write_record(CSV_HEADER)?;
    }
    for day in series {
        wtr.serialize(day)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write one compact line per day, no header
pub fn write_compact<W: Write>(series: &DailySeries, mut writer: W) -> EventStoreResult<()> {
    for day in series {
        writeln!(writer, "{}", day.csv_line())?;
    }
    writer.flush()?;
    Ok(())
}

/// Export the series to a CSV file, replacing it atomically
pub fn export_csv_file<P: AsRef<Path>>(series: &DailySeries, path: P) -> EventStoreResult<()> {
    atomic_write_with(path, |out| {
        write_csv(series, out).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    })?;
    Ok(())
}
