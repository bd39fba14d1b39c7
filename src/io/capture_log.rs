// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted capture state.
//!
//! The log is three plain-text lines: active project name, next write
//! index, and capture epoch in Unix seconds. It is rewritten after every
//! capture through a temporary file and a rename, so a crash leaves either
//! the old or the new state on disk.
//!
//! There is no file locking. Two stations sharing a log will clobber each
//! other's index sequence.

use crate::error::{Result, TimelapseError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// State needed to resume recording after a restart.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureLog {
    pub project: String,
    pub next_index: u64,
    pub epoch: f64,
}

impl CaptureLog {
    fn render(&self) -> String {
        format!("{}\n{}\n{}", self.project, self.next_index, self.epoch)
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut lines = text.lines().map(str::trim);
        let project = lines
            .next()
            .filter(|l| !l.is_empty())
            .ok_or("missing project name")?
            .to_string();
        let next_index = lines
            .next()
            .ok_or("missing next index")?
            .parse::<u64>()
            .map_err(|e| format!("bad next index: {e}"))?;
        let epoch = lines
            .next()
            .ok_or("missing capture epoch")?
            .parse::<f64>()
            .map_err(|e| format!("bad capture epoch: {e}"))?;
        if !epoch.is_finite() {
            return Err(format!("capture epoch {epoch} is not finite"));
        }
        Ok(Self {
            project,
            next_index,
            epoch,
        })
    }
}

/// Read the capture log. A missing file is `Ok(None)`.
pub fn read_log(path: &Path) -> Result<Option<CaptureLog>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(TimelapseError::LogCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };
    CaptureLog::parse(&text)
        .map(Some)
        .map_err(|reason| TimelapseError::LogCorrupt {
            path: path.to_path_buf(),
            reason,
        })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "capture_log".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> TimelapseError {
    let path = path.to_path_buf();
    move |source| TimelapseError::Io { path, source }
}

/// Durably replace the capture log with `log`.
pub fn write_log(path: &Path, log: &CaptureLog) -> Result<()> {
    let tmp = temp_path(path);
    let mut file = File::create(&tmp).map_err(io_error(&tmp))?;
    file.write_all(log.render().as_bytes())
        .map_err(io_error(&tmp))?;
    file.sync_all().map_err(io_error(&tmp))?;
    drop(file);
    fs::rename(&tmp, path).map_err(io_error(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_log_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_log(&dir.path().join("log.txt")).unwrap(), None);
    }

    #[test]
    fn test_written_log_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let log = CaptureLog {
            project: "garden".into(),
            next_index: 42,
            epoch: 1_760_000_000.125,
        };
        write_log(&path, &log).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "garden\n42\n1760000000.125"
        );
        assert_eq!(read_log(&path).unwrap(), Some(log));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_rewrite_replaces_log_without_leftover_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let mut log = CaptureLog {
            project: "garden".into(),
            next_index: 1,
            epoch: 1_760_000_000.0,
        };
        write_log(&path, &log).unwrap();
        log.next_index = 2;
        write_log(&path, &log).unwrap();

        assert_eq!(read_log(&path).unwrap(), Some(log));
        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("log.txt")]);
    }

    #[test]
    fn test_reads_log_with_trailing_newline_and_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        fs::write(&path, "default \n7\n1700000000.5\n").unwrap();

        let log = read_log(&path).unwrap().unwrap();
        assert_eq!(log.project, "default");
        assert_eq!(log.next_index, 7);
        assert_eq!(log.epoch, 1_700_000_000.5);
    }

    #[test]
    fn test_corrupt_log_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");

        fs::write(&path, "default\nseven\n1700000000").unwrap();
        assert!(matches!(
            read_log(&path),
            Err(TimelapseError::LogCorrupt { .. })
        ));

        fs::write(&path, "default\n3").unwrap();
        assert!(matches!(
            read_log(&path),
            Err(TimelapseError::LogCorrupt { .. })
        ));
    }
}
