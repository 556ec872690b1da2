//! Write-only audit log for slot generation
//!
//! Each full generation pass may append a human-readable listing of the
//! plan to a per-month file. The core never reads these files back; they
//! exist for operators checking what was scheduled and when.

use chrono::Utc;
use chrono_tz::Tz;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::scheduler::error::{SchedulerError, SchedulerResult};
use crate::scheduler::SlotPlan;

/// Append-only audit writer rooted at one directory.
pub struct AuditLog {
    dir: PathBuf,
}

impl AuditLog {
    /// Create an audit log writing under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory audit files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for one target month.
    pub fn month_file(&self, year: i32, month: u32) -> PathBuf {
        self.dir.join(format!("slots-{year:04}-{month:02}.log"))
    }

    /// Append the full listing for a generated plan to its month file.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::IoError` if the directory cannot be created
    /// or the file cannot be written.
    pub async fn append_plan(&self, plan: &SlotPlan, tz: Tz) -> SchedulerResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SchedulerError::io_error("create_audit_dir", e.to_string()))?;

        let path = self.month_file(plan.year, plan.month);
        let mut entry = format!("# generated at {}\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
        entry.push_str(&plan.display(tz));
        entry.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| SchedulerError::io_error("open_audit_file", e.to_string()))?;

        file.write_all(entry.as_bytes())
            .await
            .map_err(|e| SchedulerError::io_error("append_audit_file", e.to_string()))?;

        tracing::debug!(path = %path.display(), slots = plan.len(), "audit listing appended");
        Ok(())
    }
}
