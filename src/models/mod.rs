// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Core data model: time codes, projects and the two cursors.

pub mod capture;
pub mod display;
pub mod project;
pub mod timecode;
