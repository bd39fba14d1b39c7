// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project descriptors.
//!
//! A project is a directory of numbered frames. Descriptors are snapshots
//! taken by the project store; the recording side keeps the live count in
//! its capture cursor.

/// A named project and the frame indices found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub name: String,
    /// Sorted, de-duplicated frame indices.
    pub indices: Vec<u64>,
}

impl ProjectDescriptor {
    /// Create a descriptor, normalising the index list.
    pub fn new(name: impl Into<String>, mut indices: Vec<u64>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Self {
            name: name.into(),
            indices,
        }
    }

    /// A project with no frames yet.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of frames on disk; gaps in the index sequence are not counted.
    pub fn frame_count(&self) -> usize {
        self.indices.len()
    }

    /// Exclusive upper bound of the frame indices (0 when empty).
    pub fn max_index(&self) -> u64 {
        self.indices.last().map_or(0, |last| last + 1)
    }

    /// First frame to show when the project is selected for browsing.
    pub fn first_index(&self) -> u64 {
        self.indices.first().copied().unwrap_or(0)
    }
}

/// Position of `name` in a project listing.
pub fn position_of(projects: &[ProjectDescriptor], name: &str) -> Option<usize> {
    projects.iter().position(|p| p.name == name)
}
