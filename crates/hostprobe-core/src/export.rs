//! CSV export of host records
//!
//! The format is a `hostname,ip,os` header followed by one comma-joined row
//! per record, rows separated by `\n` with no trailing newline. Fields are
//! not quoted: a hostname containing a comma corrupts its row.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::CoreError;
use crate::model::HostRecord;

/// Header line of the export
pub const CSV_HEADER: &str = "hostname,ip,os";

/// Write `records` as CSV to `writer`
///
/// # Errors
/// Returns any I/O error raised by `writer`.
pub fn write_csv<W: Write>(records: &[HostRecord], mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for (position, record) in records.iter().enumerate() {
        if position > 0 {
            writer.write_all(b"\n")?;
        }
        write!(
            writer,
            "{},{},{}",
            record.hostname,
            record.ip_field(),
            record.os_field()
        )?;
    }
    writer.flush()
}

/// Write `records` as CSV to the file at `path`, replacing it
///
/// # Errors
/// Returns [`CoreError::Export`] if the file cannot be created or written.
pub fn export_csv(records: &[HostRecord], path: &Path) -> Result<(), CoreError> {
    let file = File::create(path)
        .map_err(|e| CoreError::Export(format!("{}: {e}", path.display())))?;
    write_csv(records, BufWriter::new(file))
        .map_err(|e| CoreError::Export(format!("{}: {e}", path.display())))?;

    info!(path = %path.display(), rows = records.len(), "export written");
    Ok(())
}
