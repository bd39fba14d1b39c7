// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! The time-lapse session loop.
//!
//! One thread runs everything. Each tick handles at most one key, captures
//! when the capture interval has passed, then shows the next playback frame
//! and waits for the playback delay. That wait is the only pacing, so a slow
//! playback speed also delays capture checks: with a delay longer than the
//! capture interval, captures happen once per tick rather than on schedule.

use crate::config::Config;
use crate::error::{Result, TimelapseError};
use crate::io::camera::FrameSource;
use crate::io::capture_log;
use crate::io::media;
use crate::io::store::ProjectStore;
use crate::models::capture::{CaptureCursor, CaptureSettings, Selection};
use crate::models::display::{Direction, DisplayCursor, PlaybackSettings};
use crate::models::project::{position_of, ProjectDescriptor};
use crate::models::timecode::TimeCodec;
use crate::ui::input::Command;
use crate::ui::overlay::OverlayInfo;
use crate::ui::window::DisplaySink;
use crate::util::clock::Clock;

/// Whether the loop should keep going after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Quit,
}

/// A running station: recording side, playback side and their devices.
pub struct TimelapseApp {
    config: Config,
    store: ProjectStore,
    codec: TimeCodec,
    capture_settings: CaptureSettings,

    /// Latest project listing, refreshed when the operator switches project.
    projects: Vec<ProjectDescriptor>,

    /// Recording cursor; absent on playback-only stations.
    capture: Option<CaptureCursor>,
    display: DisplayCursor,

    source: Option<Box<dyn FrameSource>>,
    sink: Box<dyn DisplaySink>,
    clock: Box<dyn Clock>,

    /// Time of the last successful capture.
    last_capture: f64,
    /// Key returned by the last display wait, handled on the next tick.
    pending_key: Option<i32>,
}

impl TimelapseApp {
    /// Set up both cursors.
    ///
    /// Fails only on fatal startup errors: invalid configuration, an
    /// unusable projects root, or recording enabled without a frame source.
    /// An absent or corrupt capture log starts fresh.
    pub fn start(
        config: Config,
        source: Option<Box<dyn FrameSource>>,
        sink: Box<dyn DisplaySink>,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let now = clock.now();

        let store = ProjectStore::new(
            config.projects_folder.clone(),
            config.image_prefix.clone(),
            config.default_project.clone(),
        );
        let mut projects = store.list_projects()?;
        log::info!(
            "Projects: {:?}",
            projects
                .iter()
                .map(|p| format!("{} ({} frames)", p.name, p.frame_count()))
                .collect::<Vec<_>>()
        );

        let codec = TimeCodec::new(config.pixels_for_timestamp);
        let capture_settings = CaptureSettings {
            codec,
            log_path: config.log_path.clone(),
            jpeg_quality: config.jpeg_quality,
        };

        let capture = if config.capture {
            if source.is_none() {
                return Err(TimelapseError::DeviceUnavailable(
                    "recording is enabled but no frame source was opened".into(),
                ));
            }
            let persisted = match capture_log::read_log(&config.log_path) {
                Ok(None) => {
                    log::info!("No capture log found, starting fresh");
                    None
                }
                Ok(log) => log,
                Err(e) => {
                    log::warn!("{}; starting fresh", e);
                    None
                }
            };

            let (cursor, selection) =
                CaptureCursor::select(&store, &projects, persisted.as_ref(), now)?;
            match selection {
                Selection::Fresh => log::info!("Started new project {}", cursor.project()),
                Selection::Resumed => log::info!(
                    "Resumed project {} recording since {}",
                    cursor.project(),
                    cursor.epoch()
                ),
                Selection::Default => log::info!("Recording into default project {}", cursor.project()),
            }
            log::info!(
                "Recording project: {} | next image index: {}",
                cursor.project(),
                cursor.next_index()
            );

            if position_of(&projects, cursor.project()).is_none() {
                projects = store.list_projects()?;
            }
            if let Err(e) = cursor.persist(&config.log_path) {
                log::error!("Failed to write capture log: {}", e);
            }
            Some(cursor)
        } else {
            log::info!("Capture disabled, playback only");
            None
        };

        let home = match &capture {
            Some(cursor) => cursor.project().to_string(),
            None => config
                .default_display
                .clone()
                .filter(|name| position_of(&projects, name).is_some())
                .or_else(|| projects.first().map(|p| p.name.clone()))
                .unwrap_or_else(|| config.default_project.clone()),
        };
        let mut display = DisplayCursor::new(PlaybackSettings::from(&config), &projects, &home, now);
        if let Some(cursor) = &capture {
            display.track_capture(cursor.project(), cursor.next_index());
        }
        log::info!("Display project: {} (home {})", display.project(), display.home());

        Ok(Self {
            last_capture: now - config.capture_interval,
            config,
            store,
            codec,
            capture_settings,
            projects,
            capture,
            display,
            source,
            sink,
            clock,
            pending_key: None,
        })
    }

    #[cfg(test)]
    pub fn capture_cursor(&self) -> Option<&CaptureCursor> {
        self.capture.as_ref()
    }

    #[cfg(test)]
    pub fn display_cursor(&self) -> &DisplayCursor {
        &self.display
    }

    /// Run until the operator quits.
    pub fn run(&mut self) {
        while self.tick() == TickOutcome::Continue {}
        log::info!("Session ended");
    }

    /// One loop iteration: key, capture, playback frame, idle revert.
    pub fn tick(&mut self) -> TickOutcome {
        if let Some(code) = self.pending_key.take() {
            match Command::from_key(code, &self.config.keys) {
                Some(Command::Quit) => {
                    log::info!("Quit");
                    return TickOutcome::Quit;
                }
                Some(command) => self.apply(command),
                None => log::debug!("Unbound key {}", code),
            }
        }

        self.capture_if_due();
        self.show_next_frame();

        let now = self.clock.now();
        if self.display.revert_if_idle(&self.projects, now) {
            self.sync_live_project();
            log::info!("Returning to default playback of {}", self.display.project());
        }
        TickOutcome::Continue
    }

    fn apply(&mut self, command: Command) {
        let now = self.clock.now();
        match command {
            Command::Forward | Command::Backward => {
                let direction = if command == Command::Forward {
                    Direction::Forward
                } else {
                    Direction::Backward
                };
                self.display.change_speed(direction, now);
                log::info!("{:?} speed {}", direction, self.display.speed());
            }
            Command::PlayPause => {
                self.display.play_pause(now);
                log::info!("Play/Pause");
            }
            Command::NextProject | Command::PreviousProject => {
                match self.store.list_projects() {
                    Ok(projects) => self.projects = projects,
                    Err(e) => log::warn!("Keeping previous project list: {}", e),
                }
                let offset = if command == Command::NextProject { 1 } else { -1 };
                self.display.select_project(offset, &self.projects, now);
                self.sync_live_project();
                log::info!(
                    "Select {} {} ({} frames)",
                    self.display.project_pos(),
                    self.display.project(),
                    self.display.max_index()
                );
            }
            Command::Quit => {}
        }
    }

    fn sync_live_project(&mut self) {
        if let Some(cursor) = &self.capture {
            self.display
                .track_capture(cursor.project(), cursor.next_index());
        }
    }

    fn capture_if_due(&mut self) {
        let now = self.clock.now();
        if now - self.last_capture < self.config.capture_interval {
            return;
        }
        let (Some(cursor), Some(source)) = (self.capture.as_mut(), self.source.as_mut()) else {
            return;
        };

        match cursor.capture(source, &self.store, &self.capture_settings, now) {
            Ok(_) => {
                self.last_capture = now;
                self.sync_live_project();
            }
            Err(e) if e.is_fatal() => log::error!("{}; retrying on the next tick", e),
            Err(e) => log::warn!("{}; retrying on the next tick", e),
        }
    }

    fn show_next_frame(&mut self) {
        let index = self.display.advance();
        let path = self.store.frame_path(self.display.project(), index);

        match media::load_frame(&path) {
            Ok(frame) => {
                let overlay = OverlayInfo {
                    elapsed: self.codec.read(&frame),
                    speed: self.display.speed(),
                    project: self.display.project().to_string(),
                    frame_index: index,
                    landscape: self.config.landscape,
                    block: self.codec.block_size(),
                };
                if let Err(e) = self.sink.show(&frame, &overlay) {
                    log::warn!("Failed to show frame {}: {}", index, e);
                }
            }
            Err(e) => log::debug!("Skipping render: {}", e),
        }

        match self.sink.poll_key(self.display.delay_ms()) {
            Ok(key) => self.pending_key = key,
            Err(e) => log::warn!("Failed to poll keys: {}", e),
        }
    }
}
