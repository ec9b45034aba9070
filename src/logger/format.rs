//! Rendering entries into lines.

use std::fmt::Write;

use crate::logger::entry::Entry;

/// Timestamp layout of the on-disk format.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Field separator of the on-disk format.
pub const FIELD_SEPARATOR: char = '|';

/// Renders an entry into one terminated line.
pub trait Formatter: Send + Sync {
    fn format(&self, entry: &Entry<'_>) -> String;
}

/// `address|YYYY/MM/DD HH:MM:SS|file:line|LEVEL|message\n`
#[derive(Debug, Clone, Copy, Default)]
pub struct PipeFormatter;

impl Formatter for PipeFormatter {
    fn format(&self, entry: &Entry<'_>) -> String {
        let file = if entry.file.is_empty() { "unknown" } else { entry.file };
        let mut line = String::with_capacity(96);
        // Writing into a String cannot fail.
        let _ = writeln!(
            line,
            "{}|{}|{}:{}|{}|{}",
            entry.address,
            entry.timestamp.format(TIMESTAMP_FORMAT),
            file,
            entry.line,
            entry.level.label(),
            entry.message
        );
        line
    }
}
