//! Flat CSV export of the buffered history, one file per modality.
//!
//! Row layout matches the live buffers: a header naming the time column and
//! every channel, then one row per buffered sample index.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use csv::Writer;
use tracing::info;

use telemetry_types::Modality;

use crate::buffer::ModalityBuffer;
use crate::store::TelemetryStore;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("export I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Write one modality's buffered samples as CSV rows.
pub fn write_csv<W: Write>(buffer: &ModalityBuffer, writer: W) -> Result<(), ExportError> {
    let modality = buffer.modality();
    let mut csv = Writer::from_writer(writer);

    let mut header = vec!["Time".to_string()];
    header.extend(modality.channel_names().iter().map(|s| s.to_string()));
    csv.write_record(&header)?;

    for (i, timestamp) in buffer.timestamps().iter().enumerate() {
        let mut record = Vec::with_capacity(1 + modality.channel_count());
        record.push(timestamp.to_string());
        for ch in 0..modality.channel_count() {
            // Lockstep invariant: every channel has an entry at index i.
            let value = buffer.channel(ch).and_then(|c| c.get(i)).copied().unwrap_or(0.0);
            record.push(value.to_string());
        }
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Export every modality's buffer to `dir`, one timestamped file per
/// modality. Returns the paths written; empty modalities still produce a
/// header-only file so a session export is always complete.
pub fn export_session(store: &TelemetryStore, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir)?;
    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S");

    let mut written = Vec::with_capacity(Modality::ALL.len());
    for modality in Modality::ALL {
        let path = dir.join(format!("{}_{}.csv", stamp, modality.tag()));
        let file = File::create(&path)?;
        store.with_buffer(modality, |buffer| write_csv(buffer, file))?;
        info!(modality = %modality, path = %path.display(), "exported session CSV");
        written.push(path);
    }
    Ok(written)
}
