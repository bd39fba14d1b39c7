// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: cameras, frame files, projects, logs and config files.

pub mod camera;
pub mod capture_log;
pub mod media;
pub mod serialization;
pub mod store;
