// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Information shown next to a playback frame.
//!
//! Renderers decide how this looks; this module only decides what is shown.

use crate::models::timecode::TimeCode;

/// Everything a renderer needs to annotate one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayInfo {
    /// Time code read back from the frame, if the corner was readable.
    pub elapsed: Option<TimeCode>,
    /// Signed playback speed.
    pub speed: f64,
    pub project: String,
    pub frame_index: u64,
    pub landscape: bool,
    /// Time-code block size, so renderers can keep clear of the corner.
    pub block: u32,
}

impl OverlayInfo {
    /// Direction/speed glyph.
    pub fn speed_icon(&self) -> &'static str {
        if self.speed > 1.0 {
            ">>"
        } else if self.speed < -1.0 {
            "<<"
        } else {
            "> "
        }
    }

    pub fn speed_label(&self) -> String {
        format!("{}{}x", self.speed_icon(), self.speed.abs())
    }

    /// Day, hour, minute and second labels; empty when unreadable.
    pub fn elapsed_labels(&self) -> Vec<String> {
        match self.elapsed {
            Some(code) => vec![
                format!("{}d", code.days),
                format!("{}h", code.hours),
                format!("{}m", code.minutes),
                format!("{}s", code.seconds),
            ],
            None => Vec::new(),
        }
    }

    /// All labels in reading order: elapsed time, speed, project.
    pub fn labels(&self) -> Vec<String> {
        let mut labels = self.elapsed_labels();
        labels.push(self.speed_label());
        labels.push(self.project.clone());
        labels
    }
}
