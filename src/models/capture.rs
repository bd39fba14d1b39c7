// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Recording project selection and frame capture.
//!
//! The capture cursor decides once, at startup, which project receives new
//! frames and where its index sequence continues. After that it appends one
//! frame per successful capture and persists its state immediately, so a
//! restart never reuses or skips an index.

use crate::error::Result;
use crate::io::camera::FrameSource;
use crate::io::capture_log::{self, CaptureLog};
use crate::io::media;
use crate::io::store::ProjectStore;
use crate::models::project::ProjectDescriptor;
use crate::models::timecode::TimeCodec;
use crate::util::clock::elapsed_seconds;
use std::path::{Path, PathBuf};

/// How the recording project was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// An empty project directory was found; recording starts over.
    Fresh,
    /// The project named in the capture log was resumed.
    Resumed,
    /// Nothing to start or resume; the configured default project is used.
    Default,
}

/// Everything a capture needs besides the cursor itself.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub codec: TimeCodec,
    pub log_path: PathBuf,
    pub jpeg_quality: u8,
}

/// The active recording project and its next write index.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureCursor {
    project: String,
    next_index: u64,
    epoch: f64,
}

impl CaptureCursor {
    pub fn new(project: impl Into<String>, next_index: u64, epoch: f64) -> Self {
        Self {
            project: project.into(),
            next_index,
            epoch,
        }
    }

    /// Choose the recording project.
    ///
    /// The first empty project wins and starts a fresh epoch. Otherwise the
    /// logged project resumes if it still exists. Otherwise the store's
    /// default project is used, created if absent. Resumed and default
    /// projects continue past the highest frame already on disk.
    pub fn select(
        store: &ProjectStore,
        projects: &[ProjectDescriptor],
        persisted: Option<&CaptureLog>,
        now: f64,
    ) -> Result<(Self, Selection)> {
        if let Some(empty) = projects.iter().find(|p| p.is_empty()) {
            return Ok((Self::new(empty.name.clone(), 0, now), Selection::Fresh));
        }

        if let Some(log) = persisted {
            if let Some(project) = projects.iter().find(|p| p.name == log.project) {
                let next_index = log.next_index.max(project.max_index());
                if next_index != log.next_index {
                    log::warn!(
                        "Log for {} says next index {}, but frames exist up to {}; continuing at {}",
                        project.name,
                        log.next_index,
                        project.max_index() - 1,
                        next_index
                    );
                }
                return Ok((
                    Self::new(project.name.clone(), next_index, log.epoch),
                    Selection::Resumed,
                ));
            }
            log::info!("Logged project {} no longer exists", log.project);
        }

        let name = store.default_project();
        store.create_project(name)?;
        let existing = store.describe(name)?;
        Ok((
            Self::new(name, existing.max_index(), now),
            Selection::Default,
        ))
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    pub fn to_log(&self) -> CaptureLog {
        CaptureLog {
            project: self.project.clone(),
            next_index: self.next_index,
            epoch: self.epoch,
        }
    }

    /// Write the cursor state to the capture log.
    pub fn persist(&self, log_path: &Path) -> Result<()> {
        capture_log::write_log(log_path, &self.to_log())
    }

    /// Grab, stamp and save one frame, then persist the advanced cursor.
    ///
    /// On error nothing has changed: no index is consumed and the log is
    /// untouched. A failed log write after a saved frame is only reported;
    /// the frame exists and the next resume skips past it.
    pub fn capture<S: FrameSource + ?Sized>(
        &mut self,
        source: &mut S,
        store: &ProjectStore,
        settings: &CaptureSettings,
        now: f64,
    ) -> Result<PathBuf> {
        let mut frame = source.read_frame()?;
        settings
            .codec
            .stamp(&mut frame, elapsed_seconds(now, self.epoch))?;

        let path = store.frame_path(&self.project, self.next_index);
        media::save_frame(&frame, &path, settings.jpeg_quality)?;
        self.next_index += 1;
        log::info!("Image saved: {}", path.display());

        if let Err(e) = self.persist(&settings.log_path) {
            log::error!("Failed to persist capture state: {}", e);
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimelapseError;
    use crate::models::timecode::TimeCode;
    use image::{Rgb, RgbImage};
    use std::fs;

    struct FlakySource {
        fail_next: bool,
    }

    impl FrameSource for FlakySource {
        fn read_frame(&mut self) -> Result<RgbImage> {
            if std::mem::take(&mut self.fail_next) {
                return Err(TimelapseError::CaptureFailed("no frame".into()));
            }
            Ok(RgbImage::from_pixel(96, 72, Rgb([60, 60, 60])))
        }
    }

    fn settings(dir: &Path) -> CaptureSettings {
        CaptureSettings {
            codec: TimeCodec::new(16),
            log_path: dir.join("log.txt"),
            jpeg_quality: 90,
        }
    }

    fn project_with_frames(store: &ProjectStore, name: &str, count: u64) -> ProjectDescriptor {
        store.create_project(name).unwrap();
        for i in 0..count {
            fs::write(store.frame_path(name, i), b"jpeg").unwrap();
        }
        store.describe(name).unwrap()
    }

    #[test]
    fn test_empty_project_is_selected_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path(), "image_", "default");
        let projects = vec![
            project_with_frames(&store, "a", 0),
            project_with_frames(&store, "b", 3),
        ];
        let log = CaptureLog {
            project: "b".into(),
            next_index: 3,
            epoch: 10.0,
        };

        let (cursor, selection) = CaptureCursor::select(&store, &projects, Some(&log), 500.0).unwrap();
        assert_eq!(selection, Selection::Fresh);
        assert_eq!(cursor, CaptureCursor::new("a", 0, 500.0));
    }

    #[test]
    fn test_no_empty_project_and_no_log_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path(), "image_", "default");
        let projects = vec![
            project_with_frames(&store, "a", 2),
            project_with_frames(&store, "b", 3),
        ];

        let (cursor, selection) = CaptureCursor::select(&store, &projects, None, 500.0).unwrap();
        assert_eq!(selection, Selection::Default);
        assert_eq!(cursor, CaptureCursor::new("default", 0, 500.0));
        assert!(store.project_dir("default").is_dir());
    }

    #[test]
    fn test_existing_default_project_continues_after_last_frame() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path(), "image_", "default");
        let projects = vec![
            project_with_frames(&store, "default", 4),
            project_with_frames(&store, "b", 3),
        ];
        let log = CaptureLog {
            project: "gone".into(),
            next_index: 9,
            epoch: 10.0,
        };

        let (cursor, selection) = CaptureCursor::select(&store, &projects, Some(&log), 500.0).unwrap();
        assert_eq!(selection, Selection::Default);
        assert_eq!(cursor.project(), "default");
        assert_eq!(cursor.next_index(), 4);
    }

    #[test]
    fn test_logged_project_resumes() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path(), "image_", "default");
        let projects = vec![
            project_with_frames(&store, "a", 2),
            project_with_frames(&store, "b", 3),
        ];
        let log = CaptureLog {
            project: "b".into(),
            next_index: 3,
            epoch: 123.5,
        };

        let (cursor, selection) = CaptureCursor::select(&store, &projects, Some(&log), 500.0).unwrap();
        assert_eq!(selection, Selection::Resumed);
        assert_eq!(cursor, CaptureCursor::new("b", 3, 123.5));
    }

    #[test]
    fn test_resume_never_reuses_an_unlogged_frame() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path(), "image_", "default");
        // Frame 3 was saved but the log still says 3.
        let projects = vec![project_with_frames(&store, "b", 4)];
        let log = CaptureLog {
            project: "b".into(),
            next_index: 3,
            epoch: 123.5,
        };

        let (cursor, _) = CaptureCursor::select(&store, &projects, Some(&log), 500.0).unwrap();
        assert_eq!(cursor.next_index(), 4);
    }

    #[test]
    fn test_capture_writes_stamped_frame_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path().join("projects"), "image_", "default");
        store.create_project("default").unwrap();
        let settings = settings(dir.path());
        let mut cursor = CaptureCursor::new("default", 0, 1_000.0);
        let mut source = FlakySource { fail_next: false };

        let path = cursor.capture(&mut source, &store, &settings, 4_725.2).unwrap();
        assert_eq!(path, store.frame_path("default", 0));
        assert_eq!(cursor.next_index(), 1);

        let frame = media::load_frame(&path).unwrap();
        assert_eq!(settings.codec.read(&frame), Some(TimeCode::new(0, 1, 2, 5)));

        let log = capture_log::read_log(&settings.log_path).unwrap().unwrap();
        assert_eq!(log, CaptureLog { project: "default".into(), next_index: 1, epoch: 1_000.0 });
    }

    #[test]
    fn test_failed_read_consumes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path().join("projects"), "image_", "default");
        store.create_project("default").unwrap();
        let settings = settings(dir.path());
        let mut cursor = CaptureCursor::new("default", 5, 1_000.0);
        let mut source = FlakySource { fail_next: true };

        let err = cursor.capture(&mut source, &store, &settings, 2_000.0).unwrap_err();
        assert!(matches!(err, TimelapseError::CaptureFailed(_)));
        assert_eq!(cursor.next_index(), 5);
        assert!(!settings.log_path.exists());
        assert!(!store.frame_path("default", 5).exists());

        // The retry succeeds and uses the same index.
        let path = cursor.capture(&mut source, &store, &settings, 2_005.0).unwrap();
        assert_eq!(path, store.frame_path("default", 5));
        assert_eq!(cursor.next_index(), 6);
    }
}
