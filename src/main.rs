// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zeitmaschine - unattended time-lapse station
//!
//! Captures a frame from a camera at a fixed interval, stamps the elapsed
//! capture time into the frame's pixels, and plays the growing sequence back
//! at variable speed while recording continues.

mod app;
mod config;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::TimelapseApp;
use clap::Parser;
use io::camera::{CameraSettings, FrameSource};
use std::path::PathBuf;
use ui::window::DisplaySink;

/// Time-lapse capture with live playback
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON or YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE", default_value = "config.json")]
    config: PathBuf,

    /// Override the projects folder from the configuration
    #[arg(short = 'p', long = "projects", value_name = "DIR")]
    projects: Option<PathBuf>,

    /// Use a generated test pattern instead of a camera
    #[arg(long = "synthetic")]
    synthetic: bool,

    /// Play back existing projects without recording
    #[arg(long = "no-capture")]
    no_capture: bool,

    /// Write the effective configuration to FILE and exit
    #[arg(long = "dump-config", value_name = "FILE")]
    dump_config: Option<PathBuf>,

    /// Increase logging verbosity (-v: debug, -vv: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbosity: u8,
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

#[cfg(feature = "camera-opencv")]
fn open_camera(settings: &CameraSettings, synthetic: bool) -> Result<Box<dyn FrameSource>> {
    if synthetic {
        return Ok(Box::new(io::camera::SyntheticSource::new(settings)));
    }
    Ok(Box::new(io::camera::OpenCvCamera::open(settings)?))
}

#[cfg(not(feature = "camera-opencv"))]
fn open_camera(settings: &CameraSettings, synthetic: bool) -> Result<Box<dyn FrameSource>> {
    if !synthetic {
        log::warn!("Built without camera support, falling back to the synthetic source");
    }
    Ok(Box::new(io::camera::SyntheticSource::new(settings)))
}

#[cfg(feature = "camera-opencv")]
fn open_display(config: &config::Config) -> Result<Box<dyn DisplaySink>> {
    Ok(Box::new(ui::window::OpenCvWindow::open(
        &config.window_name,
        config.fullscreen,
    )?))
}

#[cfg(not(feature = "camera-opencv"))]
fn open_display(_config: &config::Config) -> Result<Box<dyn DisplaySink>> {
    Ok(Box::new(ui::window::HeadlessDisplay::new()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity);

    let mut config = io::serialization::load_config_or_default(&args.config)?;
    if let Some(projects) = args.projects {
        config.projects_folder = projects;
    }
    if args.no_capture {
        config.capture = false;
    }

    if let Some(path) = args.dump_config {
        io::serialization::export_config(&config, &path)?;
        log::info!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    config.validate()?;

    // Devices are released when the app is dropped, on every exit path.
    let source = if config.capture {
        Some(open_camera(&CameraSettings::from(&config), args.synthetic)?)
    } else {
        None
    };
    let display = open_display(&config)?;

    let mut app = TimelapseApp::start(config, source, display, Box::new(util::clock::SystemClock))
        .context("Failed to start time-lapse session")?;
    app.run();

    Ok(())
}
