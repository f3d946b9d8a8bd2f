// src/services/quote_storage.rs

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;

/// Where uploaded quote PDFs end up. Returns the URL recorded on the job.
#[async_trait]
pub trait QuoteStorage: Send + Sync {
    async fn store(&self, job_number: &str, bytes: &[u8]) -> anyhow::Result<String>;
}

/// Writes quotes under a local directory, served as `/uploads/quotes/<file>`.
pub struct LocalQuoteStorage {
    dir: PathBuf,
}

impl LocalQuoteStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn file_name_for(job_number: &str, millis: i64) -> String {
    let safe: String = job_number
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("{safe}-{millis}.pdf")
}

#[async_trait]
impl QuoteStorage for LocalQuoteStorage {
    async fn store(&self, job_number: &str, bytes: &[u8]) -> anyhow::Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;

        let file_name = file_name_for(job_number, Utc::now().timestamp_millis());
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing {}", path.display()))?;

        Ok(format!("/uploads/quotes/{file_name}"))
    }
}
