use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::RecorderError;
use crate::reading::Reading;

/// Appends readings to a CSV file, one line per cycle.
///
/// The file is opened and closed on every append, so no handle outlives a call.
#[derive(Clone, Debug)]
pub struct Recorder {
    path: PathBuf,
}

impl Recorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the recorder after checking that the file can be opened for appending.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RecorderError> {
        let recorder = Self::new(path);
        recorder.open_file()?;
        Ok(recorder)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, reading: &Reading) -> Result<(), RecorderError> {
        let file = self.open_file()?;
        write_record(file, reading)?;
        info!("Data saved to {}", self.path.display());
        Ok(())
    }

    fn open_file(&self) -> Result<File, RecorderError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| RecorderError::Open {
                path: self.path.clone(),
                source,
            })
    }
}

/// Writes `timestamp,temperature,label` followed by a newline.
pub fn write_record<W: io::Write>(writer: W, reading: &Reading) -> Result<(), RecorderError> {
    let temperature = format!("{:.2}", reading.temperature());
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    writer.write_record([reading.timestamp(), temperature.as_str(), reading.record_label()])?;
    writer.flush()?;
    Ok(())
}

/// The line [`Recorder::append`] writes for `reading`.
pub fn csv_line(reading: &Reading) -> Result<String, RecorderError> {
    let mut buffer = Vec::new();
    write_record(&mut buffer, reading)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
