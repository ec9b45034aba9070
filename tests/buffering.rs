//! Buffering, flush thresholds and severity filtering.

use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{Local, TimeZone};
use elog::logger::clock::ManualClock;
use elog::logger::entry::Entry;
use elog::logger::format::Formatter;
use elog::{ELog, LevelMask, RotationMode};

mod common;

fn clock() -> ManualClock {
    ManualClock::new(Local.with_ymd_and_hms(2024, 3, 7, 4, 5, 6).unwrap())
}

#[tokio::test]
async fn test_entries_stay_buffered_until_flush() {
    let dir = tempfile::tempdir().unwrap();
    let logger = ELog::builder(common::quiet_config(dir.path(), "buffered"))
        .clock(clock())
        .build()
        .unwrap();

    for i in 0..20 {
        logger.info(format_args!("entry {}", i));
    }
    assert!(!logger.current_file().exists(), "nothing should reach disk yet");
    assert!(logger.pending_bytes() > 0);

    logger.flush_now();

    let content = fs::read_to_string(logger.current_file()).unwrap();
    let messages: Vec<&str> = content
        .lines()
        .map(|l| l.rsplit('|').next().unwrap())
        .collect();
    let expected: Vec<String> = (0..20).map(|i| format!("entry {}", i)).collect();
    assert_eq!(messages, expected);
    assert_eq!(logger.pending_bytes(), 0);

    logger.finalize().await;
}

#[tokio::test]
async fn test_stale_buffer_flushes_on_next_write() {
    let dir = tempfile::tempdir().unwrap();
    let clock = clock();
    let mut config = common::quiet_config(dir.path(), "interval");
    config.write_interval_ms = 1_000;
    let logger = ELog::builder(config).clock(clock.clone()).build().unwrap();

    logger.info("first");
    logger.info("second");
    assert!(!logger.current_file().exists());

    clock.advance(chrono::Duration::milliseconds(1_500));
    logger.info("third");

    let content = fs::read_to_string(logger.current_file()).unwrap();
    assert_eq!(content.lines().count(), 3);
    assert!(content.lines().last().unwrap().ends_with("|INFO|third"));

    logger.finalize().await;
}

#[tokio::test]
async fn test_large_buffer_flushes_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::quiet_config(dir.path(), "bytes");
    config.write_buffer_check_bytes = 200;
    let logger = ELog::builder(config).clock(clock()).build().unwrap();

    logger.info("short");
    assert!(!logger.current_file().exists());

    let mut writes = 1;
    while logger.pending_bytes() > 0 {
        logger.info("x".repeat(40));
        writes += 1;
        assert!(writes < 20, "byte threshold never tripped");
    }

    let content = fs::read_to_string(logger.current_file()).unwrap();
    assert_eq!(content.lines().count(), writes);
    assert!(content.len() > 200);

    logger.finalize().await;
}

#[tokio::test]
async fn test_timer_drains_idle_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::quiet_config(dir.path(), "timer");
    config.write_interval_ms = 100;
    config.tick_interval_ms = 50;
    let logger = ELog::new(config).unwrap();

    logger.info("waiting for the timer");
    let path = logger.current_file();

    let flushed = common::wait_for(Duration::from_secs(3), || {
        fs::read_to_string(&path)
            .map(|c| c.contains("waiting for the timer"))
            .unwrap_or(false)
    })
    .await;
    assert!(flushed, "timer should flush the stale entry");

    logger.finalize().await;
}

#[tokio::test]
async fn test_level_mask_filters_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::quiet_config(dir.path(), "levels").with_mask(LevelMask::ERROR | LevelMask::INFO);
    let logger = ELog::builder(config).clock(clock()).build().unwrap();

    logger.debug("hidden detail");
    assert_eq!(logger.pending_bytes(), 0);

    // Fatal is masked out as well, so this neither writes nor exits.
    logger.fatal("not fatal here");
    assert_eq!(logger.pending_bytes(), 0);

    logger.error("visible error");
    logger.info("visible info");
    logger.flush_now();

    let content = fs::read_to_string(logger.current_file()).unwrap();
    assert!(content.contains("|ERROR|visible error"));
    assert!(content.contains("|INFO|visible info"));
    assert!(!content.contains("DEBUG"));
    assert!(!content.contains("FATAL"));

    logger.finalize().await;
}

#[tokio::test]
async fn test_vip_ignores_empty_mask() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::quiet_config(dir.path(), "vip").with_mask(LevelMask::NONE);
    let logger = ELog::builder(config).clock(clock()).build().unwrap();

    logger.error("dropped");
    logger.vip("always here");
    logger.flush_now();

    let content = fs::read_to_string(logger.current_file()).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("|VIP|always here"));

    logger.finalize().await;
}

#[tokio::test]
async fn test_concurrent_writers_keep_per_thread_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = common::quiet_config(dir.path(), "concurrent");
    config.write_buffer_check_bytes = 4096;
    let logger = Arc::new(ELog::builder(config).clock(clock()).build().unwrap());

    let handles: Vec<_> = (1..10)
        .map(|index| {
            let logger = logger.clone();
            thread::spawn(move || {
                for j in 0..100 {
                    let sum = index * 10000 + j;
                    logger.info(format_args!("i|{}|sum|{}", index, sum));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.flush_now();

    let content = fs::read_to_string(logger.current_file()).unwrap();
    assert_eq!(content.lines().count(), 900);

    for index in 1..10 {
        let sums: Vec<u32> = content
            .lines()
            .filter(|l| l.contains(&format!("|INFO|i|{}|sum|", index)))
            .map(|l| l.rsplit('|').next().unwrap().parse().unwrap())
            .collect();
        let expected: Vec<u32> = (0..100).map(|j| index * 10000 + j).collect();
        assert_eq!(sums, expected);
    }

    logger.finalize().await;
}

#[tokio::test]
async fn test_create_applies_mask_and_size_limit() {
    // `create` always logs into the working directory.
    let logger = ELog::create("create_size_check", RotationMode::Size, 1, LevelMask::ERROR).unwrap();
    let path = logger.current_file();
    let backup = path.with_file_name(format!(".{}", path.file_name().unwrap().to_string_lossy()));
    assert_eq!(logger.level_mask(), LevelMask::ERROR);

    logger.info("no");
    logger.error("yes");
    logger.flush_now();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.ends_with("|ERROR|yes\n"));

    // 1 KiB limit: the next write after crossing it starts a fresh file.
    logger.error("x".repeat(1100));
    logger.flush_now();
    assert!(fs::metadata(&path).unwrap().len() >= 1024);

    logger.error("after roll");
    logger.flush_now();
    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.ends_with("|ERROR|after roll\n"));

    logger.finalize().await;
    common::wait_for(Duration::from_secs(3), || !backup.exists()).await;
    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&backup);
}

#[tokio::test]
async fn test_write_line_lands_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let logger = ELog::builder(common::quiet_config(dir.path(), "raw"))
        .clock(clock())
        .build()
        .unwrap();

    let raw = "10.2.3.4|2024/03/07 04:00:00|relay.rs:12|INFO|forwarded|count|3\n";
    logger.write_line(raw);
    logger.write_line("");
    logger.info("native");
    logger.flush_now();

    let content = fs::read_to_string(logger.current_file()).unwrap();
    assert!(content.starts_with(raw));
    assert_eq!(content.lines().count(), 2);
    assert!(content.ends_with("|INFO|native\n"));

    logger.finalize().await;
}

struct LevelFirstFormatter;

impl Formatter for LevelFirstFormatter {
    fn format(&self, entry: &Entry<'_>) -> String {
        format!("{} {}@{} {}\n", entry.level.label(), entry.file, entry.address, entry.message)
    }
}

#[tokio::test]
async fn test_custom_formatter_output_reaches_file() {
    let dir = tempfile::tempdir().unwrap();
    let logger = ELog::builder(common::quiet_config(dir.path(), "custom"))
        .clock(clock())
        .formatter(LevelFirstFormatter)
        .build()
        .unwrap();

    logger.error("boom");
    logger.flush_now();

    let content = fs::read_to_string(logger.current_file()).unwrap();
    assert_eq!(content, "ERROR buffering.rs@10.0.0.9 boom\n");

    logger.finalize().await;
}
