//! Version and build stamps for `--version`, the run log and JSON exports

/// Bumped whenever a field of the JSON export envelopes changes meaning
pub const REPORT_SCHEMA_VERSION: u32 = 20251016;

pub const BUILD_TIME: &str = env!("REPODRIFT_BUILD_TIME");
pub const GIT_REV: &str = env!("REPODRIFT_GIT_REV");

pub fn report_schema_version() -> u32 {
    REPORT_SCHEMA_VERSION
}

/// `0.1.0 (rev abc1234567, built 2025-10-16T09:00:00Z, schema 20251016)`
pub fn long_version() -> String {
    format!(
        "{} (rev {}, built {}, schema {})",
        env!("CARGO_PKG_VERSION"),
        GIT_REV,
        BUILD_TIME,
        REPORT_SCHEMA_VERSION
    )
}
