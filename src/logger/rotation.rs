//! Rotation policy.
//!
//! # Decision Table
//! ```text
//! Minute  date/hour/minute label changed  → rebuild file name
//! Hour    date/hour label changed         → rebuild file name
//! Day     date label changed              → rebuild file name
//! Size    file missing                    → create it
//! Size    file size >= max                → rename to hidden backup,
//!                                           recreate, remove backup later
//! ```
//!
//! # Design Decisions
//! - All rotation state lives in `Rotator`, which the logger only touches
//!   under its lock. File name and bucket labels can never disagree.
//! - Backup removal is returned to the caller, which runs it off the write path

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::LogFailure;
use crate::logger::clock::TimeBucket;
use crate::logger::naming::{backup_name, file_name};

/// When the active file is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    /// Roll over once the file reaches a byte threshold.
    Size,
    /// One file per minute.
    Minute,
    /// One file per hour.
    Hour,
    /// One file per day.
    Day,
}

/// What a rotation check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rotation {
    /// Moved to a new time bucket.
    Renamed { from: PathBuf, to: PathBuf },
    /// Size mode found no file and created one.
    Created,
    /// Size mode rolled the file; `backup` holds the old content until removed.
    SizeRolled { backup: PathBuf },
}

/// Rotation state of one logger.
#[derive(Debug)]
pub struct Rotator {
    mode: RotationMode,
    prefix: String,
    directory: PathBuf,
    address: String,
    max_size: u64,
    bucket: TimeBucket,
    file_name: String,
}

impl Rotator {
    pub fn new(
        mode: RotationMode,
        prefix: impl Into<String>,
        directory: impl Into<PathBuf>,
        address: impl Into<String>,
        max_size: u64,
        now: &DateTime<Local>,
    ) -> Self {
        let prefix = prefix.into();
        let address = address.into();
        let bucket = TimeBucket::at(now);
        let file_name = file_name(&prefix, mode, &bucket, &address);
        Self {
            mode,
            prefix,
            directory: directory.into(),
            address,
            max_size,
            bucket,
            file_name,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Full path of the active file.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    pub fn bucket(&self) -> &TimeBucket {
        &self.bucket
    }

    /// Apply the decision table for `now`.
    pub fn check(&mut self, now: &DateTime<Local>) -> Result<Option<Rotation>, LogFailure> {
        match self.mode {
            RotationMode::Size => self.check_size(),
            _ => Ok(self.check_bucket(now)),
        }
    }

    fn check_bucket(&mut self, now: &DateTime<Local>) -> Option<Rotation> {
        let bucket = TimeBucket::at(now);
        let changed = match self.mode {
            RotationMode::Minute => bucket != self.bucket,
            RotationMode::Hour => {
                bucket.date != self.bucket.date || bucket.hour != self.bucket.hour
            }
            RotationMode::Day => bucket.date != self.bucket.date,
            RotationMode::Size => false,
        };
        if !changed {
            return None;
        }

        let from = self.path();
        self.file_name = file_name(&self.prefix, self.mode, &bucket, &self.address);
        self.bucket = bucket;
        Some(Rotation::Renamed {
            from,
            to: self.path(),
        })
    }

    fn check_size(&mut self) -> Result<Option<Rotation>, LogFailure> {
        let path = self.path();
        let rotate_err = |source: io::Error| LogFailure::Rotate {
            path: path.clone(),
            source,
        };

        match fs::metadata(&path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                File::create(&path).map_err(rotate_err)?;
                Ok(Some(Rotation::Created))
            }
            Err(e) => Err(rotate_err(e)),
            Ok(meta) if meta.len() >= self.max_size => {
                let backup = self.directory.join(backup_name(&self.file_name));
                fs::rename(&path, &backup).map_err(rotate_err)?;
                File::create(&path).map_err(rotate_err)?;
                Ok(Some(Rotation::SizeRolled { backup }))
            }
            Ok(_) => Ok(None),
        }
    }
}

/// Remove a rolled backup file. Missing files are not an error.
pub async fn remove_backup(backup: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(backup).await {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
