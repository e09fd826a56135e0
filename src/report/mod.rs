//! Final run report: plain-text rendering, JSON export, and the files they
//! are written to.
mod json;
mod text;


use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::engine::DomainReport;
use crate::error::{AppError, AppResult, ReportError};

pub use json::{render_json, write_json};
pub use text::render_text;

/// Divisor for values carried as hundredths.
pub const HUNDREDTHS: u64 = 100;
const MS_PER_SEC: u128 = 1_000;
const SECS_PER_MIN: u64 = 60;
const SECS_PER_HOUR: u64 = 3_600;

/// Everything known about a finished run, in original domain order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub duration: Duration,
    pub elapsed: Duration,
    pub domains: Vec<DomainReport>,
}

impl RunReport {
    #[must_use]
    pub fn total_requests(&self) -> u64 {
        self.domains
            .iter()
            .map(|domain| domain.snapshot.counters.total)
            .fold(0, u64::saturating_add)
    }

    /// Overall requests per second, in hundredths.
    #[must_use]
    pub fn throughput_x100(&self) -> u64 {
        per_second_x100(self.total_requests(), self.elapsed)
    }
}

/// `count / elapsed` per second, in hundredths. Zero when nothing elapsed.
#[must_use]
pub fn per_second_x100(count: u64, elapsed: Duration) -> u64 {
    let elapsed_ms = elapsed.as_millis();
    if elapsed_ms == 0 {
        return 0;
    }
    let scaled = u128::from(count)
        .saturating_mul(u128::from(HUNDREDTHS))
        .saturating_mul(MS_PER_SEC)
        .checked_div(elapsed_ms)
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// `part / whole` as a percentage, in hundredths.
#[must_use]
pub fn percent_x100(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    let scaled = u128::from(part)
        .saturating_mul(u128::from(HUNDREDTHS))
        .saturating_mul(u128::from(HUNDREDTHS))
        .checked_div(u128::from(whole))
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

#[must_use]
pub fn format_hundredths(value: u64) -> String {
    format!("{}.{:02}", value / HUNDREDTHS, value % HUNDREDTHS)
}

/// Human duration rounded to whole seconds: `45s`, `1m5s`, `2h0m3s`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let mut secs = duration.as_secs();
    if duration.subsec_millis() >= 500 {
        secs = secs.saturating_add(1);
    }
    let hours = secs / SECS_PER_HOUR;
    let minutes = (secs % SECS_PER_HOUR) / SECS_PER_MIN;
    let seconds = secs % SECS_PER_MIN;
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// `report_<unix seconds>.txt`.
#[must_use]
pub fn report_file_name(at: DateTime<Local>) -> String {
    format!("report_{}.txt", at.timestamp())
}

/// Creates the output directory if needed. Runs before any worker starts.
///
/// # Errors
///
/// Returns an error when the directory cannot be created or the path is
/// not a directory.
pub async fn prepare_output_dir(dir: &Path) -> AppResult<()> {
    tokio::fs::create_dir_all(dir).await.map_err(|err| {
        AppError::report(ReportError::CreateOutputDir {
            path: dir.to_path_buf(),
            source: err,
        })
    })?;
    let metadata = tokio::fs::metadata(dir).await.map_err(|err| {
        AppError::report(ReportError::CreateOutputDir {
            path: dir.to_path_buf(),
            source: err,
        })
    })?;
    if !metadata.is_dir() {
        return Err(AppError::report(ReportError::OutputNotDirectory {
            path: dir.to_path_buf(),
        }));
    }
    Ok(())
}

/// Writes the text report into `dir` and returns the file path.
///
/// # Errors
///
/// Returns an error when the file cannot be written.
pub async fn write_text_report(dir: &Path, report: &RunReport) -> AppResult<PathBuf> {
    let path = dir.join(report_file_name(report.finished_at));
    tokio::fs::write(&path, render_text(report))
        .await
        .map_err(|err| {
            AppError::report(ReportError::WriteReport {
                path: path.clone(),
                source: err,
            })
        })?;
    Ok(path)
}
