// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error taxonomy for capture, storage and playback.
//!
//! Startup errors (storage, device, configuration) abort the program. All
//! other variants are reported by the session loop and the loop carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the time-lapse core.
#[derive(Debug, Error)]
pub enum TimelapseError {
    /// The projects root (or a project directory) cannot be read or created.
    #[error("storage unavailable at {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The camera could not be opened.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// A single frame read failed.
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// A playback image is absent or cannot be decoded.
    #[error("frame missing at {path}: {reason}")]
    FrameMissing { path: PathBuf, reason: String },

    /// The persisted capture log exists but cannot be parsed.
    #[error("capture log at {path} is corrupt: {reason}")]
    LogCorrupt { path: PathBuf, reason: String },

    /// Configuration values that cannot drive a session.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Encoding a captured frame failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The window backend failed while showing a frame or polling keys.
    #[cfg(feature = "camera-opencv")]
    #[error("display error: {0}")]
    Display(String),
}

impl TimelapseError {
    /// Whether this error must abort the program.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TimelapseError::StorageUnavailable { .. }
                | TimelapseError::DeviceUnavailable(_)
                | TimelapseError::ConfigInvalid(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TimelapseError>;
