// src/recorder.rs
use crate::config::FILE_PREFIX;
use crate::reading::Reading;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct CsvRow {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Distance_cm")]
    distance_cm: i32,
}

impl From<&Reading> for CsvRow {
    fn from(r: &Reading) -> Self {
        Self {
            timestamp: r.timestamp_label(),
            distance_cm: r.distance_cm,
        }
    }
}

/// Append-only CSV log. One writer lives for the whole session and every row is
/// flushed as soon as it is written.
pub struct CsvSink<W: Write = File> {
    writer: csv::Writer<W>,
    rows_written: u64,
}

impl CsvSink<File> {
    /// Creates (or truncates) `path` and writes the header row.
    pub fn create(path: &Path) -> Result<Self, csv::Error> {
        let file = File::create(path)?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(inner: W) -> Result<Self, csv::Error> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(["Timestamp", "Distance_cm"])?;
        writer.flush()?;
        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    pub fn append(&mut self, reading: &Reading) -> Result<(), csv::Error> {
        self.writer.serialize(CsvRow::from(reading))?;
        self.writer.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }
}

/// `ultrasonic_data_YYYYMMDD_HHMMSS.csv` inside `dir`.
pub fn session_file_path(dir: &Path, started: NaiveDateTime) -> PathBuf {
    dir.join(format!(
        "{FILE_PREFIX}{}.csv",
        started.format("%Y%m%d_%H%M%S")
    ))
}

/// Directory holding the running executable, falling back to the working directory.
pub fn output_dir() -> io::Result<PathBuf> {
    match env::current_exe() {
        Ok(exe) => match exe.parent() {
            Some(dir) => Ok(dir.to_path_buf()),
            None => env::current_dir(),
        },
        Err(e) => {
            log::warn!("cannot locate executable ({e}), saving next to the working directory");
            env::current_dir()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn at(h: u32, m: u32, s: u32, ms: u32) -> NaiveTime {
        NaiveTime::from_hms_milli_opt(h, m, s, ms).unwrap()
    }

    fn contents(sink: &CsvSink<Vec<u8>>) -> String {
        String::from_utf8(sink.get_ref().clone()).unwrap()
    }

    #[test]
    fn header_written_on_create() {
        let sink = CsvSink::from_writer(Vec::new()).unwrap();
        assert_eq!(contents(&sink), "Timestamp,Distance_cm\n");
        assert_eq!(sink.rows_written(), 0);
    }

    #[test]
    fn one_row_per_reading() {
        let mut sink = CsvSink::from_writer(Vec::new()).unwrap();
        sink.append(&Reading::new(123, at(14, 3, 9, 5))).unwrap();
        sink.append(&Reading::new(550, at(14, 3, 9, 105))).unwrap();
        assert_eq!(
            contents(&sink),
            "Timestamp,Distance_cm\n14:03:09.005,123\n14:03:09.105,400\n"
        );
        assert_eq!(sink.rows_written(), 2);
    }

    #[test]
    fn file_name_uses_start_time() {
        let started = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(8, 15, 2)
            .unwrap();
        let path = session_file_path(Path::new("/data"), started);
        assert_eq!(
            path,
            Path::new("/data").join("ultrasonic_data_20240307_081502.csv")
        );
    }

    #[test]
    fn create_writes_to_disk() {
        let started = chrono::Local::now().naive_local();
        let dir = env::temp_dir().join(format!("sonar_log_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = session_file_path(&dir, started);
        {
            let mut sink = CsvSink::create(&path).unwrap();
            sink.append(&Reading::new(-5, at(0, 0, 1, 0))).unwrap();
            // flushed per row, visible before the sink is dropped
            let text = std::fs::read_to_string(&path).unwrap();
            assert_eq!(text, "Timestamp,Distance_cm\n00:00:01.000,-5\n");
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
