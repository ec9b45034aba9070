//! Structured log entry.

use std::fmt;
use std::panic::Location;

use chrono::{DateTime, Local};

use crate::logger::level::Level;

/// One log entry before it is rendered to text.
pub struct Entry<'a> {
    /// Address of the emitting host.
    pub address: &'a str,
    pub timestamp: DateTime<Local>,
    /// Basename of the calling source file.
    pub file: &'a str,
    pub line: u32,
    pub level: Level,
    pub message: &'a dyn fmt::Display,
}

impl<'a> Entry<'a> {
    /// Entry attributed to `location`.
    pub fn new(
        address: &'a str,
        timestamp: DateTime<Local>,
        location: &'a Location<'a>,
        level: Level,
        message: &'a dyn fmt::Display,
    ) -> Self {
        Self {
            address,
            timestamp,
            file: basename(location.file()),
            line: location.line(),
            level,
            message,
        }
    }
}

impl fmt::Debug for Entry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("address", &self.address)
            .field("timestamp", &self.timestamp)
            .field("file", &self.file)
            .field("line", &self.line)
            .field("level", &self.level)
            .field("message", &self.message.to_string())
            .finish()
    }
}

fn basename(path: &str) -> &str {
    path.rsplit(&['/', '\\'][..]).next().unwrap_or(path)
}
