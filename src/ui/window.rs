// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Display sinks.
//!
//! A display sink shows one frame at a time and is the session's only
//! blocking call: `poll_key` waits up to the playback delay for a key, which
//! paces both playback and capture checks.

use crate::error::Result;
use crate::ui::overlay::OverlayInfo;
use image::RgbImage;
use std::time::Duration;

/// A window (or stand-in) that shows frames and reports key presses.
pub trait DisplaySink {
    /// Show `frame` annotated with `overlay`.
    fn show(&mut self, frame: &RgbImage, overlay: &OverlayInfo) -> Result<()>;

    /// Wait up to `timeout_ms` for a key and return its raw code.
    fn poll_key(&mut self, timeout_ms: u64) -> Result<Option<i32>>;
}

impl<D: DisplaySink + ?Sized> DisplaySink for Box<D> {
    fn show(&mut self, frame: &RgbImage, overlay: &OverlayInfo) -> Result<()> {
        (**self).show(frame, overlay)
    }

    fn poll_key(&mut self, timeout_ms: u64) -> Result<Option<i32>> {
        (**self).poll_key(timeout_ms)
    }
}

/// Logs what would be shown and sleeps through the playback delay.
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    shown: u64,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        log::info!("No window backend, running headless");
        Self::default()
    }
}

impl DisplaySink for HeadlessDisplay {
    fn show(&mut self, frame: &RgbImage, overlay: &OverlayInfo) -> Result<()> {
        self.shown += 1;
        log::debug!(
            "Frame {} of {} ({}x{}): {}",
            overlay.frame_index,
            overlay.project,
            frame.width(),
            frame.height(),
            overlay.labels().join(" ")
        );
        Ok(())
    }

    fn poll_key(&mut self, timeout_ms: u64) -> Result<Option<i32>> {
        std::thread::sleep(Duration::from_millis(timeout_ms));
        Ok(None)
    }
}

#[cfg(feature = "camera-opencv")]
pub use self::opencv_window::OpenCvWindow;

#[cfg(feature = "camera-opencv")]
mod opencv_window {
    use super::DisplaySink;
    use crate::error::{Result, TimelapseError};
    use crate::ui::overlay::OverlayInfo;
    use crate::util::geometry::overlay_band;
    use image::RgbImage;
    use opencv::core::{self, Mat, Point, Rect, Scalar};
    use opencv::prelude::*;
    use opencv::{highgui, imgproc};

    const FONT_SCALE: f64 = 1.2;
    const LABEL_SPACING: i32 = 120;
    const BASELINE: i32 = 40;

    fn display_error(e: opencv::Error) -> TimelapseError {
        TimelapseError::Display(e.to_string())
    }

    /// An OpenCV `highgui` window.
    pub struct OpenCvWindow {
        name: String,
    }

    impl OpenCvWindow {
        pub fn open(name: &str, fullscreen: bool) -> Result<Self> {
            highgui::named_window(name, highgui::WINDOW_GUI_NORMAL)
                .map_err(|e| TimelapseError::DeviceUnavailable(e.to_string()))?;
            if fullscreen {
                highgui::set_window_property(
                    name,
                    highgui::WND_PROP_FULLSCREEN,
                    f64::from(highgui::WINDOW_FULLSCREEN),
                )
                .map_err(display_error)?;
            }
            log::info!("Opened window '{}'", name);
            Ok(Self {
                name: name.to_string(),
            })
        }

        fn to_bgr(frame: &RgbImage) -> Result<Mat> {
            let mut mat = Mat::new_rows_cols_with_default(
                frame.height() as i32,
                frame.width() as i32,
                core::CV_8UC3,
                Scalar::all(0.0),
            )
            .map_err(display_error)?;
            let bytes = mat.data_bytes_mut().map_err(display_error)?;
            for (dst, src) in bytes.chunks_exact_mut(3).zip(frame.pixels()) {
                dst[0] = src[2];
                dst[1] = src[1];
                dst[2] = src[0];
            }
            Ok(mat)
        }

        fn put_label(mat: &mut Mat, text: &str, at: Point) -> Result<()> {
            imgproc::put_text(
                mat,
                text,
                at,
                imgproc::FONT_HERSHEY_DUPLEX,
                FONT_SCALE,
                Scalar::all(255.0),
                1,
                imgproc::LINE_8,
                false,
            )
            .map_err(display_error)
        }

        fn draw_overlay(mat: &mut Mat, overlay: &OverlayInfo) -> Result<()> {
            let band = overlay_band(
                mat.cols() as u32,
                mat.rows() as u32,
                overlay.block,
                overlay.landscape,
            );
            let band_rect = Rect::new(
                band.x as i32,
                band.y as i32,
                band.width as i32,
                band.height as i32,
            );
            imgproc::rectangle(mat, band_rect, Scalar::all(0.0), -1, imgproc::LINE_8, 0)
                .map_err(display_error)?;

            // Landscape labels run along the band, portrait labels stack down it.
            for (i, label) in overlay.labels().iter().enumerate() {
                let i = i as i32;
                let at = if overlay.landscape {
                    Point::new(band_rect.x + 30 + i * LABEL_SPACING, BASELINE)
                } else {
                    Point::new(4, band_rect.y + BASELINE + i * BASELINE)
                };
                Self::put_label(mat, label, at)?;
            }
            Ok(())
        }
    }

    impl DisplaySink for OpenCvWindow {
        fn show(&mut self, frame: &RgbImage, overlay: &OverlayInfo) -> Result<()> {
            let mut mat = Self::to_bgr(frame)?;
            Self::draw_overlay(&mut mat, overlay)?;
            highgui::imshow(&self.name, &mat).map_err(display_error)
        }

        fn poll_key(&mut self, timeout_ms: u64) -> Result<Option<i32>> {
            // wait_key(0) blocks forever.
            let timeout = timeout_ms.clamp(1, i32::MAX as u64) as i32;
            let key = highgui::wait_key(timeout).map_err(display_error)?;
            Ok((key >= 0).then_some(key & 0xFF))
        }
    }

    impl Drop for OpenCvWindow {
        fn drop(&mut self) {
            if let Err(e) = highgui::destroy_window(&self.name) {
                log::warn!("Failed to close window '{}': {}", self.name, e);
            } else {
                log::info!("Closed window '{}'", self.name);
            }
        }
    }
}
