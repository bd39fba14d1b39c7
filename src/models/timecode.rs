// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Elapsed-time code embedded in captured frames.
//!
//! Each frame carries the time since its project's capture epoch as four
//! grey intensities, one per field. The scale/bias per field keeps every
//! encoded value above zero, so an encoded zero never looks like an unwritten
//! black block, and leaves slack for JPEG noise when reading back.
//!
//! The days field saturates: from day 26 on the intensity clamps to 255 and
//! decodes as day 25.

use crate::error::{Result, TimelapseError};
use crate::util::geometry::{field_blocks, reserved_side, sample_window, FIELD_COUNT};
use image::{Rgb, RgbImage};
use std::fmt;

const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_MINUTE: u64 = 60;

/// One intensity per field: days, hours, minutes, seconds.
pub type Intensities = [u8; FIELD_COUNT];

/// An elapsed duration split into calendar-style fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeCode {
    pub days: u64,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl TimeCode {
    #[cfg(test)]
    pub fn new(days: u64, hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Split a number of elapsed seconds into fields.
    pub fn from_elapsed(elapsed: u64) -> Self {
        Self {
            days: elapsed / SECONDS_PER_DAY,
            hours: (elapsed % SECONDS_PER_DAY / SECONDS_PER_HOUR) as u8,
            minutes: (elapsed % SECONDS_PER_HOUR / SECONDS_PER_MINUTE) as u8,
            seconds: (elapsed % SECONDS_PER_MINUTE) as u8,
        }
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {}h {}m {}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

fn clamp_intensity(value: u64) -> u8 {
    value.min(u64::from(u8::MAX)) as u8
}

/// Map elapsed seconds to field intensities.
pub fn encode(elapsed: u64) -> Intensities {
    let code = TimeCode::from_elapsed(elapsed);
    [
        clamp_intensity(code.days.saturating_mul(10).saturating_add(4)),
        clamp_intensity(u64::from(code.hours) * 10 + 4),
        clamp_intensity(u64::from(code.minutes) * 4 + 2),
        clamp_intensity(u64::from(code.seconds) * 4 + 2),
    ]
}

/// Map field intensities back to a time code by integer division.
pub fn decode(values: Intensities) -> TimeCode {
    TimeCode {
        days: u64::from(values[0] / 10),
        hours: values[1] / 10,
        minutes: values[2] / 4,
        seconds: values[3] / 4,
    }
}

/// Paints and reads time codes in the reserved corner of a frame.
#[derive(Debug, Clone, Copy)]
pub struct TimeCodec {
    block: u32,
}

impl TimeCodec {
    /// Codec for blocks of `block` x `block` pixels.
    pub fn new(block: u32) -> Self {
        Self { block }
    }

    /// Side length of one time-code block in pixels.
    pub fn block_size(&self) -> u32 {
        self.block
    }

    fn fits(&self, frame: &RgbImage) -> bool {
        let side = reserved_side(self.block);
        self.block > 0 && frame.width() >= side && frame.height() >= side
    }

    /// Embed the time code for `elapsed` seconds into `frame`.
    pub fn stamp(&self, frame: &mut RgbImage, elapsed: u64) -> Result<()> {
        if !self.fits(frame) {
            return Err(TimelapseError::CaptureFailed(format!(
                "frame {}x{} is smaller than the {}px time-code corner",
                frame.width(),
                frame.height(),
                reserved_side(self.block)
            )));
        }

        for (field, value) in encode(elapsed).into_iter().enumerate() {
            let pixel = Rgb([value, value, value]);
            for rect in field_blocks(field, self.block) {
                for y in rect.y..rect.bottom() {
                    for x in rect.x..rect.right() {
                        frame.put_pixel(x, y, pixel);
                    }
                }
            }
        }
        Ok(())
    }

    /// Sample the raw field intensities from `frame`.
    ///
    /// Each field is the floored mean over its sample window and all three
    /// channels, which absorbs most compression noise.
    pub fn sample(&self, frame: &RgbImage) -> Option<Intensities> {
        if !self.fits(frame) {
            return None;
        }

        let mut values = [0u8; FIELD_COUNT];
        for (field, value) in values.iter_mut().enumerate() {
            let window = sample_window(field, self.block);
            let mut sum = 0u32;
            let mut count = 0u32;
            for y in window.y..window.bottom() {
                for x in window.x..window.right() {
                    let Rgb([r, g, b]) = *frame.get_pixel(x, y);
                    sum += u32::from(r) + u32::from(g) + u32::from(b);
                    count += 3;
                }
            }
            *value = (sum / count) as u8;
        }
        Some(values)
    }

    /// Recover the time code stamped into `frame`.
    pub fn read(&self, frame: &RgbImage) -> Option<TimeCode> {
        self.sample(frame).map(decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_example() {
        let values = encode(3725);
        assert_eq!(values, [4, 14, 10, 22]);
        assert_eq!(decode(values), TimeCode::new(0, 1, 2, 5));
    }

    #[test]
    fn test_round_trip_within_one_day() {
        for h in 0..24u64 {
            for m in 0..60u64 {
                for s in 0..60u64 {
                    let elapsed = h * 3600 + m * 60 + s;
                    let code = decode(encode(elapsed));
                    assert_eq!(code, TimeCode::new(0, h as u8, m as u8, s as u8));
                }
            }
        }
    }

    #[test]
    fn test_encoded_values_are_never_zero() {
        assert_eq!(encode(0), [4, 4, 2, 2]);
        let worst = encode(23 * 3600 + 59 * 60 + 59);
        assert_eq!(worst, [4, 234, 238, 238]);
    }

    #[test]
    fn test_days_saturate_after_day_25() {
        let day = 86_400;
        let at_25 = encode(25 * day + 3725);
        assert_eq!(at_25[0], 254);
        assert_eq!(decode(at_25).days, 25);

        let at_26 = encode(26 * day + 3725);
        assert_eq!(at_26[0], 255);
        assert_eq!(decode(at_26).days, 25);
        assert_eq!(decode(at_26).hours, 1);

        let far = encode(400 * day);
        assert_eq!(decode(far).days, 25);
    }

    #[test]
    fn test_time_code_fields_and_display() {
        let code = TimeCode::from_elapsed(2 * 86_400 + 3725);
        assert_eq!(code, TimeCode::new(2, 1, 2, 5));
        assert_eq!(code.to_string(), "2d 1h 2m 5s");
    }

    #[test]
    fn test_stamp_and_read_frame() {
        let codec = TimeCodec::new(15);
        let mut frame = RgbImage::from_pixel(320, 240, Rgb([200, 120, 40]));
        codec.stamp(&mut frame, 5 * 86_400 + 13 * 3600 + 7 * 60 + 42).unwrap();

        assert_eq!(codec.read(&frame), Some(TimeCode::new(5, 13, 7, 42)));
        // Row copy of the seconds field.
        assert_eq!(frame.get_pixel(50, 5), &Rgb([170, 170, 170]));
        // Outside the corner the camera content is untouched.
        assert_eq!(frame.get_pixel(100, 100), &Rgb([200, 120, 40]));
    }

    #[test]
    fn test_stamp_rejects_small_frames() {
        let codec = TimeCodec::new(15);
        let mut frame = RgbImage::new(40, 40);
        assert!(codec.stamp(&mut frame, 10).is_err());
        assert_eq!(codec.read(&frame), None);
    }

    #[test]
    fn test_read_tolerates_small_noise() {
        let codec = TimeCodec::new(8);
        let mut frame = RgbImage::new(64, 64);
        codec.stamp(&mut frame, 3725).unwrap();

        // Nudge one channel of every pixel in the corner down by one.
        for pixel in frame.pixels_mut() {
            pixel[0] = pixel[0].saturating_sub(1);
        }
        assert_eq!(codec.read(&frame), Some(TimeCode::new(0, 1, 2, 5)));
    }
}
