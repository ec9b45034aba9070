//! Severities and the severity mask.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Flushed immediately, then the process exits.
    Fatal,
    /// Always written, whatever the mask says.
    Vip,
    Error,
    Info,
    Debug,
}

impl Level {
    /// Every level, most severe first.
    pub const ALL: [Level; 5] = [
        Level::Fatal,
        Level::Vip,
        Level::Error,
        Level::Info,
        Level::Debug,
    ];

    /// Upper-case label written into each line.
    pub fn label(self) -> &'static str {
        match self {
            Level::Fatal => "FATAL",
            Level::Vip => "VIP",
            Level::Error => "ERROR",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bitmask of enabled severities.
///
/// `Level::Vip` has no bit: it bypasses the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LevelMask(u8);

impl LevelMask {
    pub const NONE: LevelMask = LevelMask(0);
    pub const FATAL: LevelMask = LevelMask(0x01);
    pub const ERROR: LevelMask = LevelMask(0x02);
    pub const INFO: LevelMask = LevelMask(0x04);
    pub const DEBUG: LevelMask = LevelMask(0x08);
    pub const ALL: LevelMask = LevelMask(0x0f);

    /// Mask from raw bits. Unknown bits are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        LevelMask(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Bit for a single level.
    pub const fn of(level: Level) -> Self {
        match level {
            Level::Fatal => Self::FATAL,
            Level::Error => Self::ERROR,
            Level::Info => Self::INFO,
            Level::Debug => Self::DEBUG,
            Level::Vip => Self::NONE,
        }
    }

    /// Whether entries at `level` are written.
    pub fn enables(self, level: Level) -> bool {
        level == Level::Vip || self.0 & Self::of(level).0 != 0
    }
}

impl BitOr for LevelMask {
    type Output = LevelMask;

    fn bitor(self, rhs: LevelMask) -> LevelMask {
        LevelMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for LevelMask {
    fn bitor_assign(&mut self, rhs: LevelMask) {
        self.0 |= rhs.0;
    }
}
