// src/main.rs
mod config;
mod engine;
mod gui;
mod reading;
mod recorder;
mod sensor;
mod window;

use anyhow::Context;
use config::{BAUD_RATE, SERIAL_PORT};
use eframe::egui;
use engine::Session;
use recorder::CsvSink;
use sensor::SensorSession;
use std::path::PathBuf;
use std::process::ExitCode;

/// Opens the serial port first, then the CSV file: a bad port leaves nothing on disk.
fn open_session() -> anyhow::Result<(Session, PathBuf)> {
    let port = match SensorSession::connect(SERIAL_PORT, BAUD_RATE) {
        Ok(s) => s,
        Err(e) => {
            log::error!(
                "Check that {SERIAL_PORT} is correct and the Arduino IDE Serial Monitor is CLOSED."
            );
            let ports = sensor::list_port_names();
            if ports.is_empty() {
                log::error!("No serial ports detected.");
            } else {
                log::error!("Available ports: {}", ports.join(", "));
            }
            return Err(e.into());
        }
    };

    let dir = recorder::output_dir().context("cannot determine output directory")?;
    let path = recorder::session_file_path(&dir, chrono::Local::now().naive_local());
    let sink = CsvSink::create(&path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    log::info!("Data will be saved to: {}", path.display());

    Ok((Session::new(port, sink), path))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (session, path) = match open_session() {
        Ok(v) => v,
        Err(e) => {
            log::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 600.0])
            .with_title("Ultrasonic Distance Logger"),
        ..Default::default()
    };

    log::info!("Starting live graph... Close the graph window to stop and save.");
    let app_path = path.clone();
    let result = eframe::run_native(
        "sonar_log",
        options,
        Box::new(move |_cc| Box::new(gui::SonarApp::new(session, app_path))),
    );

    if let Err(e) = result {
        log::error!("graph window failed: {e}");
        return ExitCode::FAILURE;
    }
    log::info!(
        "Serial connection closed. All data successfully saved to {}",
        path.display()
    );
    ExitCode::SUCCESS
}
