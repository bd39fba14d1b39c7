// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame file loading and saving.
//!
//! Captured frames are stored as RGB JPEGs. Loading converts whatever the
//! decoder produces to 8-bit RGB so the time-code reader sees one layout.

use crate::error::{Result, TimelapseError};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Load a frame for playback.
pub fn load_frame(path: &Path) -> Result<RgbImage> {
    if !path.is_file() {
        return Err(TimelapseError::FrameMissing {
            path: path.to_path_buf(),
            reason: "no such file".into(),
        });
    }
    let img = image::open(path).map_err(|e| TimelapseError::FrameMissing {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(img.to_rgb8())
}

/// Encode `frame` as a JPEG at `path`.
pub fn save_frame(frame: &RgbImage, path: &Path, quality: u8) -> Result<()> {
    let file = File::create(path).map_err(|source| TimelapseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    frame.write_with_encoder(encoder)?;
    writer.flush().map_err(|source| TimelapseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timecode::{TimeCode, TimeCodec};
    use image::Rgb;

    #[test]
    fn test_missing_frame_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_frame(&dir.path().join("image_9.jpg")).unwrap_err();
        assert!(matches!(err, TimelapseError::FrameMissing { .. }));
    }

    #[test]
    fn test_undecodable_frame_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_0.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        assert!(matches!(
            load_frame(&path),
            Err(TimelapseError::FrameMissing { .. })
        ));
    }

    #[test]
    fn test_time_code_survives_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_0.jpg");
        let codec = TimeCodec::new(16);

        let mut frame = RgbImage::from_pixel(320, 240, Rgb([90, 160, 30]));
        let elapsed = 3 * 86_400 + 22 * 3600 + 45 * 60 + 17;
        codec.stamp(&mut frame, elapsed).unwrap();
        save_frame(&frame, &path, 90).unwrap();

        let loaded = load_frame(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (320, 240));
        assert_eq!(codec.read(&loaded), Some(TimeCode::new(3, 22, 45, 17)));
    }
}
