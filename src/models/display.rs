// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback navigation.
//!
//! The display cursor browses one project at a time, stepping through its
//! frames at a signed speed. It never writes project data. When it browses
//! the project being recorded, the session feeds it the live frame count
//! through [`DisplayCursor::track_capture`].
//!
//! The "home" project is where playback returns after the operator has been
//! idle: the recording project, or the configured display project on a
//! playback-only station.

use crate::config::Config;
use crate::models::project::{position_of, ProjectDescriptor};

/// Playback parameters taken from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSettings {
    pub speeds: Vec<f64>,
    pub steps: Vec<u64>,
    pub default_speed: f64,
    pub default_step: u64,
    pub capture_interval: f64,
    pub min_delay_ms: f64,
    pub idle_timeout: f64,
}

impl From<&Config> for PlaybackSettings {
    fn from(config: &Config) -> Self {
        Self {
            speeds: config.playback_speeds.clone(),
            steps: config.image_step.clone(),
            default_speed: config.default_playback_speed,
            default_step: config.default_image_step(),
            capture_interval: config.capture_interval,
            min_delay_ms: config.min_frame_delay_ms,
            idle_timeout: config.idle_timeout,
        }
    }
}

/// Playback direction chosen by the forward/backward keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn sign(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Browsing state of the playback window.
#[derive(Debug, Clone)]
pub struct DisplayCursor {
    settings: PlaybackSettings,
    home: String,
    project: String,
    project_pos: usize,
    shown_index: u64,
    /// Exclusive upper bound of playable indices.
    max_index: u64,
    speed: f64,
    /// Next entry of the speed list used by forward/backward.
    speed_slot: usize,
    step: i64,
    last_input: f64,
}

impl DisplayCursor {
    /// Start browsing `home` at default speed.
    pub fn new(
        settings: PlaybackSettings,
        projects: &[ProjectDescriptor],
        home: &str,
        now: f64,
    ) -> Self {
        let speed = settings.default_speed;
        let step = settings.default_step as i64;
        let mut cursor = Self {
            settings,
            home: home.to_string(),
            project: home.to_string(),
            project_pos: 0,
            shown_index: 0,
            max_index: 0,
            speed,
            speed_slot: 0,
            step,
            last_input: now,
        };
        cursor.browse(projects, position_of(projects, home).unwrap_or(usize::MAX), home);
        cursor
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn project_pos(&self) -> usize {
        self.project_pos
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    #[cfg(test)]
    pub fn shown_index(&self) -> u64 {
        self.shown_index
    }

    pub fn max_index(&self) -> u64 {
        self.max_index
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[cfg(test)]
    pub fn step(&self) -> i64 {
        self.step
    }

    /// True while browsing the home project at the default speed.
    pub fn is_default(&self) -> bool {
        self.project == self.home && self.speed == self.settings.default_speed
    }

    fn browse(&mut self, projects: &[ProjectDescriptor], pos: usize, fallback: &str) {
        match projects.get(pos) {
            Some(descriptor) => {
                self.project = descriptor.name.clone();
                self.project_pos = pos;
                self.shown_index = descriptor.first_index();
                self.max_index = descriptor.max_index();
            }
            None => {
                self.project = fallback.to_string();
                self.project_pos = 0;
                self.shown_index = 0;
                self.max_index = 0;
            }
        }
    }

    /// Follow the live frame count of the recording project.
    pub fn track_capture(&mut self, project: &str, next_index: u64) {
        if self.project == project {
            self.max_index = next_index;
        }
    }

    /// Step to the next frame, wrapping in both directions.
    pub fn advance(&mut self) -> u64 {
        self.shown_index = if self.max_index > 0 {
            let max = self.max_index as i128;
            (self.shown_index as i128 + self.step as i128).rem_euclid(max) as u64
        } else {
            0
        };
        self.shown_index
    }

    /// Milliseconds to wait after showing a frame.
    pub fn delay_ms(&self) -> u64 {
        let paced = 1000.0 * self.settings.capture_interval / self.speed.abs();
        paced.max(self.settings.min_delay_ms) as u64
    }

    /// Cycle to the next speed of the list in `direction`.
    pub fn change_speed(&mut self, direction: Direction, now: f64) {
        let slot = self.speed_slot;
        let sign = direction.sign();
        self.speed = self.settings.speeds[slot] * sign as f64;
        self.step = self.settings.steps[slot] as i64 * sign;
        self.speed_slot = (slot + 1) % self.settings.speeds.len();
        self.last_input = now;
    }

    /// Back to the default speed, keeping the current direction.
    ///
    /// The speed slot is left alone, so the next forward/backward press
    /// continues the cycle where it stopped.
    pub fn play_pause(&mut self, now: f64) {
        let sign = if self.speed < 0.0 { -1 } else { 1 };
        self.speed = self.settings.default_speed * sign as f64;
        self.step = self.settings.default_step as i64 * sign;
        self.last_input = now;
    }

    /// Browse the project `offset` places away in `projects`, wrapping.
    ///
    /// `projects` may be a fresher listing than the one the cursor was
    /// created with; the current project is located by name.
    pub fn select_project(&mut self, offset: isize, projects: &[ProjectDescriptor], now: f64) {
        self.last_input = now;
        if projects.is_empty() {
            return;
        }
        let len = projects.len() as isize;
        let current = position_of(projects, &self.project)
            .unwrap_or_else(|| self.project_pos.min(projects.len() - 1));
        let pos = (current as isize + offset).rem_euclid(len) as usize;
        let name = projects[pos].name.clone();
        self.browse(projects, pos, &name);
    }

    /// Return to the home project at default speed after `idle_timeout`
    /// seconds without input. Returns whether a revert happened.
    pub fn revert_if_idle(&mut self, projects: &[ProjectDescriptor], now: f64) -> bool {
        if self.is_default() || now - self.last_input <= self.settings.idle_timeout {
            return false;
        }

        if self.project != self.home {
            let home = self.home.clone();
            self.browse(projects, position_of(projects, &home).unwrap_or(usize::MAX), &home);
        }
        self.speed = self.settings.default_speed;
        self.step = self.settings.default_step as i64;
        self.speed_slot = 0;
        true
    }
}
