// src/engine.rs
use crate::config::MAX_POINTS;
use crate::reading::{parse_distance, Reading};
use crate::recorder::CsvSink;
use crate::sensor::{LineSource, SensorError, SensorSession};
use crate::window::DisplayWindow;
use chrono::{Local, NaiveTime};
use std::fs::File;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Sensor(#[from] SensorError),
    #[error("failed to write CSV row: {0}")]
    Csv(#[from] csv::Error),
}

/// What one tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No serial input was pending.
    Idle,
    /// A line arrived but was not a distance; nothing was stored.
    Rejected(String),
    Accepted(Reading),
}

/// Everything a running logger owns. Dropping it closes the serial port and the CSV file.
pub struct Session<S = SensorSession, W: Write = File> {
    source: S,
    sink: CsvSink<W>,
    window: DisplayWindow,
}

impl<S: LineSource, W: Write> Session<S, W> {
    pub fn new(source: S, sink: CsvSink<W>) -> Self {
        Self {
            source,
            sink,
            window: DisplayWindow::new(MAX_POINTS),
        }
    }

    /// Read at most one line, and if it is a distance, log it and add it to the graph.
    pub fn tick(&mut self) -> Result<TickOutcome, EngineError> {
        self.tick_at(Local::now().time())
    }

    pub fn tick_at(&mut self, now: NaiveTime) -> Result<TickOutcome, EngineError> {
        let Some(line) = self.source.poll_line()? else {
            return Ok(TickOutcome::Idle);
        };
        let raw = match parse_distance(&line) {
            Ok(v) => v,
            Err(e) => {
                log::debug!("ignoring serial line: {e}");
                return Ok(TickOutcome::Rejected(line));
            }
        };
        let reading = Reading::new(raw, now);
        // 先落盘，写失败的点不上图
        self.sink.append(&reading)?;
        self.window.push(reading);
        Ok(TickOutcome::Accepted(reading))
    }

    pub fn window(&self) -> &DisplayWindow {
        &self.window
    }

    pub fn rows_written(&self) -> u64 {
        self.sink.rows_written()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
