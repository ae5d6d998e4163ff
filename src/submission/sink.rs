use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::FormSubmission;

/// Receives a submitted form in place of the browser's POST.
pub trait SubmissionSink {
    fn deliver(&mut self, submission: &FormSubmission) -> Result<()>;

    /// Called once the terminal has been restored
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes the encoded body to a file
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl SubmissionSink for FileSink {
    fn deliver(&mut self, submission: &FormSubmission) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.path, format!("{}\n", submission.encode()))
            .with_context(|| format!("could not write {}", self.path.display()))?;

        info!(path = %self.path.display(), items = submission.item_count(), "proforma written");
        Ok(())
    }
}

/// Holds the body until the terminal is back, then prints it to stdout
#[derive(Default)]
pub struct StdoutSink {
    pending: Option<String>,
}

impl SubmissionSink for StdoutSink {
    fn deliver(&mut self, submission: &FormSubmission) -> Result<()> {
        self.pending = Some(submission.encode());
        info!(items = submission.item_count(), "proforma queued for stdout");
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(body) = self.pending.take() {
            println!("{}", body);
        }
        Ok(())
    }
}

pub fn for_output(path: Option<&Path>) -> Box<dyn SubmissionSink> {
    match path {
        Some(path) => Box::new(FileSink::new(path)),
        None => Box::new(StdoutSink::default()),
    }
}

/// Keeps every delivered submission; can be told to fail
#[cfg(test)]
#[derive(Default)]
pub struct MemorySink {
    pub delivered: Vec<FormSubmission>,
    pub fail_with: Option<String>,
}

#[cfg(test)]
impl SubmissionSink for MemorySink {
    fn deliver(&mut self, submission: &FormSubmission) -> Result<()> {
        if let Some(message) = &self.fail_with {
            anyhow::bail!("{}", message);
        }
        self.delivered.push(submission.clone());
        Ok(())
    }
}
