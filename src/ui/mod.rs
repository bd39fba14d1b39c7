// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playback window, key input and overlay information.

pub mod input;
pub mod overlay;
pub mod window;
