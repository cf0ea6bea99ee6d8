//! Spoiler sink: persists the assignment snapshot produced after each
//! settled scouting round.

use std::path::PathBuf;

use anyhow::Context;

use apbridge::SpoilerRecord;

/// Destination for spoiler records. Failures are reported to the caller,
/// which logs them; nothing is retried.
pub trait SpoilerSink: Send + Sync {
    fn write(&self, record: &SpoilerRecord) -> anyhow::Result<()>;
}

/// Writes the record as pretty JSON, replacing any previous file.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SpoilerSink for JsonFileSink {
    fn write(&self, record: &SpoilerRecord) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create spoiler dir {}", dir.display()))?;
        }
        let contents = serde_json::to_string_pretty(record).context("failed to serialize spoiler")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        tracing::info!(
            "wrote spoiler with {} entries to {}",
            record.entries.len(),
            self.path.display()
        );
        Ok(())
    }
}
