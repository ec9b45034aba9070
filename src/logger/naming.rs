//! File names derived from prefix, rotation mode and time bucket.

use crate::logger::clock::TimeBucket;
use crate::logger::rotation::RotationMode;

/// Name of the active file for `mode` in `bucket`.
///
/// ```text
/// Size    {prefix}.{address}
/// Day     {prefix}_{date}.{address}
/// Hour    {prefix}_{date}_{hour}.{address}
/// Minute  {prefix}_{date}_{hour}_{minute}.{address}
/// ```
pub fn file_name(prefix: &str, mode: RotationMode, bucket: &TimeBucket, address: &str) -> String {
    let stem = match mode {
        RotationMode::Size => prefix.to_string(),
        RotationMode::Day => format!("{}_{}", prefix, bucket.date),
        RotationMode::Hour => format!("{}_{}_{}", prefix, bucket.date, bucket.hour),
        RotationMode::Minute => format!(
            "{}_{}_{}_{}",
            prefix, bucket.date, bucket.hour, bucket.minute
        ),
    };
    format!("{}.{}", stem, address)
}

/// Hidden sibling a size-rolled file is moved to before removal.
pub fn backup_name(file_name: &str) -> String {
    format!(".{}", file_name)
}
