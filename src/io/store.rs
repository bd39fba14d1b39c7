// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! On-disk project discovery.
//!
//! Every sub-directory of the projects root is a project. Frames inside a
//! project are named `{prefix}{index}.jpg`; anything else is ignored.

use crate::error::{Result, TimelapseError};
use crate::models::project::ProjectDescriptor;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File extension of captured frames.
pub const FRAME_EXTENSION: &str = "jpg";

/// Lists, creates and indexes project directories under one root.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    root: PathBuf,
    prefix: String,
    default_project: String,
}

fn storage_error(path: &Path, source: std::io::Error) -> TimelapseError {
    TimelapseError::StorageUnavailable {
        path: path.to_path_buf(),
        source,
    }
}

/// Order projects newest first, breaking ties by name.
fn sort_newest_first(projects: &mut [(String, SystemTime)]) {
    projects.sort_by(|(a_name, a_time), (b_name, b_time)| {
        b_time.cmp(a_time).then_with(|| a_name.cmp(b_name))
    });
}

impl ProjectStore {
    pub fn new(
        root: impl Into<PathBuf>,
        prefix: impl Into<String>,
        default_project: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
            default_project: default_project.into(),
        }
    }

    pub fn default_project(&self) -> &str {
        &self.default_project
    }

    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Path of frame `index` in project `name`.
    pub fn frame_path(&self, name: &str, index: u64) -> PathBuf {
        self.project_dir(name)
            .join(format!("{}{}.{}", self.prefix, index, FRAME_EXTENSION))
    }

    /// Create the projects root if needed.
    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| storage_error(&self.root, e))
    }

    /// Create the directory of project `name` if needed.
    pub fn create_project(&self, name: &str) -> Result<()> {
        let dir = self.project_dir(name);
        if !dir.is_dir() {
            log::info!("Creating project directory {}", dir.display());
        }
        fs::create_dir_all(&dir).map_err(|e| storage_error(&dir, e))
    }

    /// Parse the frame index out of a file name, if it is a frame.
    pub fn parse_index(&self, file_name: &str) -> Option<u64> {
        let stem = file_name
            .strip_prefix(&self.prefix)?
            .strip_suffix(FRAME_EXTENSION)?
            .strip_suffix('.')?;
        if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        stem.parse().ok()
    }

    /// Frame indices present in project `name`.
    pub fn scan_indices(&self, name: &str) -> Result<Vec<u64>> {
        let dir = self.project_dir(name);
        let entries = fs::read_dir(&dir).map_err(|e| storage_error(&dir, e))?;

        let mut indices = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| storage_error(&dir, e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            let file_name = entry.file_name();
            match file_name.to_str().and_then(|n| self.parse_index(n)) {
                Some(index) => indices.push(index),
                None => log::debug!(
                    "Ignoring {:?} in project {}",
                    file_name,
                    name
                ),
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }

    /// Descriptor of a single project.
    pub fn describe(&self, name: &str) -> Result<ProjectDescriptor> {
        Ok(ProjectDescriptor::new(name, self.scan_indices(name)?))
    }

    /// All projects, newest first.
    ///
    /// Creates the root if it is missing, and the default project when the
    /// root holds no project directories at all.
    pub fn list_projects(&self) -> Result<Vec<ProjectDescriptor>> {
        self.ensure_root()?;

        let entries = fs::read_dir(&self.root).map_err(|e| storage_error(&self.root, e))?;
        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| storage_error(&self.root, e))?;
            let metadata = match entry.metadata() {
                Ok(metadata) if metadata.is_dir() => metadata,
                _ => continue,
            };
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                log::warn!("Skipping project with non UTF-8 name {:?}", entry.file_name());
                continue;
            };
            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            dirs.push((name, created));
        }

        if dirs.is_empty() {
            self.create_project(&self.default_project)?;
            return Ok(vec![ProjectDescriptor::empty(self.default_project.clone())]);
        }

        sort_newest_first(&mut dirs);
        dirs.into_iter()
            .map(|(name, _)| self.describe(&name))
            .collect()
    }
}
