// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Station configuration.
//!
//! Every field has a default so partial config files are accepted. Call
//! [`Config::validate`] before driving a session with a loaded config.

use crate::error::{Result, TimelapseError};
use crate::util::geometry::reserved_side;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw key code for Escape, which always quits.
pub const ESCAPE_KEY: i32 = 27;

/// Keys bound to playback commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: char,
    pub backward: char,
    pub play_pause: char,
    pub next_project: char,
    pub previous_project: char,
    pub quit: char,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: 'd',
            backward: 'a',
            play_pause: 's',
            next_project: 'e',
            previous_project: 'w',
            quit: 'q',
        }
    }
}

/// Complete station configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory holding one sub-directory per project.
    pub projects_folder: PathBuf,
    /// Three-line capture log used to resume after a restart.
    pub log_path: PathBuf,
    /// Project recorded into when no empty or resumable project exists.
    pub default_project: String,
    /// File name prefix of captured frames.
    pub image_prefix: String,
    /// Record frames (false runs a playback-only station).
    pub capture: bool,
    /// Project browsed by default when not recording.
    pub default_display: Option<String>,
    /// Seconds between captures.
    pub capture_interval: f64,
    /// Ascending playback speed magnitudes cycled by forward/backward.
    pub playback_speeds: Vec<f64>,
    /// Frame step paired with each entry of `playback_speeds`.
    pub image_step: Vec<u64>,
    pub default_playback_speed: f64,
    /// Lower bound of the playback delay in milliseconds.
    pub min_frame_delay_ms: f64,
    /// Seconds without input before playback returns to its default state.
    pub idle_timeout: f64,
    /// Side of one time-code block in pixels.
    pub pixels_for_timestamp: u32,
    pub jpeg_quality: u8,
    pub width: u32,
    pub height: u32,
    pub landscape: bool,
    pub fullscreen: bool,
    /// Use the V4L2 capture backend.
    pub on_raspberry: bool,
    pub camera_device: i32,
    pub window_name: String,
    pub keys: KeyBindings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            projects_folder: PathBuf::from("projects"),
            log_path: PathBuf::from("log.txt"),
            default_project: "default".to_string(),
            image_prefix: "image_".to_string(),
            capture: true,
            default_display: None,
            capture_interval: 5.0,
            playback_speeds: vec![1.0, 4.0, 16.0, 64.0, 256.0],
            image_step: vec![1, 1, 1, 2, 4],
            default_playback_speed: 1.0,
            min_frame_delay_ms: 46.87,
            idle_timeout: 120.0,
            pixels_for_timestamp: 15,
            jpeg_quality: 90,
            width: 1280,
            height: 960,
            landscape: true,
            fullscreen: false,
            on_raspberry: false,
            camera_device: 0,
            window_name: "Time Lapse".to_string(),
            keys: KeyBindings::default(),
        }
    }
}

impl Config {
    /// Check that the values can drive a session.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(TimelapseError::ConfigInvalid(msg));

        if self.playback_speeds.is_empty() {
            return invalid("playback_speeds must not be empty".into());
        }
        if let Some(speed) = self.playback_speeds.iter().find(|s| !(**s > 0.0)) {
            return invalid(format!("playback speed {speed} must be positive"));
        }
        if self.image_step.len() != self.playback_speeds.len() {
            return invalid(format!(
                "image_step has {} entries but playback_speeds has {}",
                self.image_step.len(),
                self.playback_speeds.len()
            ));
        }
        if !(self.default_playback_speed > 0.0) {
            return invalid("default_playback_speed must be positive".into());
        }
        if !(self.capture_interval > 0.0) {
            return invalid("capture_interval must be positive".into());
        }
        if self.pixels_for_timestamp == 0 {
            return invalid("pixels_for_timestamp must be at least 1".into());
        }
        let side = reserved_side(self.pixels_for_timestamp);
        if side > self.width || side > self.height {
            return invalid(format!(
                "time-code corner of {side}px does not fit a {}x{} frame",
                self.width, self.height
            ));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return invalid("jpeg_quality must be within 1..=100".into());
        }
        if self.default_project.is_empty() || self.image_prefix.is_empty() {
            return invalid("default_project and image_prefix must not be empty".into());
        }
        Ok(())
    }

    /// Step paired with the default speed, or 1 when it is not listed.
    pub fn default_image_step(&self) -> u64 {
        self.playback_speeds
            .iter()
            .position(|s| *s == self.default_playback_speed)
            .and_then(|i| self.image_step.get(i).copied())
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_image_step(), 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "capture_interval": 30, "projects_folder": "/srv/timelapse" }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.capture_interval, 30.0);
        assert_eq!(config.projects_folder, PathBuf::from("/srv/timelapse"));
        assert_eq!(config.pixels_for_timestamp, 15);
        assert_eq!(config.keys.forward, 'd');
    }

    #[test]
    fn test_lockstep_lists_must_match() {
        let config = Config {
            image_step: vec![1, 2],
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TimelapseError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_rejects_zero_speed_and_oversized_corner() {
        let zero_speed = Config {
            playback_speeds: vec![0.0, 2.0],
            image_step: vec![1, 1],
            ..Config::default()
        };
        assert!(zero_speed.validate().is_err());

        let oversized = Config {
            pixels_for_timestamp: 100,
            width: 320,
            height: 240,
            ..Config::default()
        };
        assert!(oversized.validate().is_err());
    }

    #[test]
    fn test_default_step_follows_speed_list() {
        let config = Config {
            playback_speeds: vec![2.0, 8.0, 32.0],
            image_step: vec![1, 3, 9],
            default_playback_speed: 8.0,
            ..Config::default()
        };
        assert_eq!(config.default_image_step(), 3);
    }
}
