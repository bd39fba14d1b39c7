// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame sources.
//!
//! A frame source is opened once at startup and released when dropped.
//! Reading a frame either yields an RGB image or a `CaptureFailed` error
//! that the session loop retries.

use crate::config::Config;
use crate::error::Result;
use image::{Rgb, RgbImage};

/// Something that produces camera frames on demand.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<RgbImage>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn read_frame(&mut self) -> Result<RgbImage> {
        (**self).read_frame()
    }
}

/// Parameters for opening a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraSettings {
    pub device: i32,
    pub width: u32,
    pub height: u32,
    /// Prefer the V4L2 backend (Raspberry Pi and similar boards).
    pub v4l2: bool,
}

impl From<&Config> for CameraSettings {
    fn from(config: &Config) -> Self {
        Self {
            device: config.camera_device,
            width: config.width,
            height: config.height,
            v4l2: config.on_raspberry,
        }
    }
}

/// A moving colour gradient, for running a station without a camera.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: u32,
    height: u32,
    frame: u32,
}

impl SyntheticSource {
    pub fn new(settings: &CameraSettings) -> Self {
        log::info!(
            "Using synthetic {}x{} frame source",
            settings.width,
            settings.height
        );
        Self {
            width: settings.width,
            height: settings.height,
            frame: 0,
        }
    }
}

impl FrameSource for SyntheticSource {
    fn read_frame(&mut self) -> Result<RgbImage> {
        let shift = self.frame.wrapping_mul(7);
        self.frame = self.frame.wrapping_add(1);
        let (w, h) = (self.width.max(1), self.height.max(1));
        Ok(RgbImage::from_fn(self.width, self.height, |x, y| {
            Rgb([
                ((x * 255 / w + shift) % 256) as u8,
                ((y * 255 / h) % 256) as u8,
                (shift % 256) as u8,
            ])
        }))
    }
}

#[cfg(feature = "camera-opencv")]
pub use self::opencv_camera::OpenCvCamera;

#[cfg(feature = "camera-opencv")]
mod opencv_camera {
    use super::{CameraSettings, FrameSource};
    use crate::error::{Result, TimelapseError};
    use image::RgbImage;
    use opencv::core::Mat;
    use opencv::prelude::*;
    use opencv::videoio;

    fn device_error(e: opencv::Error) -> TimelapseError {
        TimelapseError::DeviceUnavailable(e.to_string())
    }

    fn capture_error(e: opencv::Error) -> TimelapseError {
        TimelapseError::CaptureFailed(e.to_string())
    }

    /// A camera read through OpenCV's `videoio`.
    pub struct OpenCvCamera {
        capture: videoio::VideoCapture,
        device: i32,
    }

    impl OpenCvCamera {
        pub fn open(settings: &CameraSettings) -> Result<Self> {
            let api = if settings.v4l2 {
                videoio::CAP_V4L2
            } else {
                videoio::CAP_ANY
            };
            let mut capture =
                videoio::VideoCapture::new(settings.device, api).map_err(device_error)?;
            if !capture.is_opened().map_err(device_error)? {
                return Err(TimelapseError::DeviceUnavailable(format!(
                    "camera {} did not open",
                    settings.device
                )));
            }

            capture
                .set(videoio::CAP_PROP_FRAME_WIDTH, f64::from(settings.width))
                .map_err(device_error)?;
            capture
                .set(videoio::CAP_PROP_FRAME_HEIGHT, f64::from(settings.height))
                .map_err(device_error)?;
            let mjpg = videoio::VideoWriter::fourcc('M', 'J', 'P', 'G').map_err(device_error)?;
            capture
                .set(videoio::CAP_PROP_FOURCC, f64::from(mjpg))
                .map_err(device_error)?;

            log::info!(
                "Camera {} opened at {}x{}",
                settings.device,
                settings.width,
                settings.height
            );
            Ok(Self {
                capture,
                device: settings.device,
            })
        }
    }

    impl FrameSource for OpenCvCamera {
        fn read_frame(&mut self) -> Result<RgbImage> {
            let mut bgr = Mat::default();
            let grabbed = self.capture.read(&mut bgr).map_err(capture_error)?;
            if !grabbed || bgr.rows() <= 0 || bgr.cols() <= 0 {
                return Err(TimelapseError::CaptureFailed(
                    "camera returned no frame".into(),
                ));
            }
            if bgr.channels() != 3 || !bgr.is_continuous() {
                return Err(TimelapseError::CaptureFailed(format!(
                    "unexpected frame layout with {} channels",
                    bgr.channels()
                )));
            }

            let (width, height) = (bgr.cols() as u32, bgr.rows() as u32);
            let bytes = bgr.data_bytes().map_err(capture_error)?;
            let mut rgb = Vec::with_capacity(bytes.len());
            for px in bytes.chunks_exact(3) {
                rgb.extend_from_slice(&[px[2], px[1], px[0]]);
            }
            RgbImage::from_raw(width, height, rgb).ok_or_else(|| {
                TimelapseError::CaptureFailed("frame buffer size mismatch".into())
            })
        }
    }

    impl Drop for OpenCvCamera {
        fn drop(&mut self) {
            if let Err(e) = self.capture.release() {
                log::warn!("Failed to release camera {}: {}", self.device, e);
            } else {
                log::info!("Camera {} released", self.device);
            }
        }
    }
}
