use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{Sink, SinkError};
use crate::data_models::Message;

/// Writes every batch as a JSON array to its own file under `root`, named
/// after the moment the file is created.
pub struct LogSink {
    root: PathBuf,
}

impl LogSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/<yyyy>/<MM>/<dd>/<HH>-<mm>-<ss>.<SSS>.json`
    pub fn batch_path(root: &Path, at: &DateTime<Local>) -> PathBuf {
        root.join(at.format("%Y/%m/%d/%H-%M-%S%.3f.json").to_string())
    }

    /// Batches landing in the same millisecond get `-1`, `-2`, ... appended
    /// to the stem so none of them replaces another.
    async fn write_new(path: &Path, contents: &[u8]) -> std::io::Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut candidate = path.to_path_buf();
        let mut suffix = 0u32;
        let mut file = loop {
            let opened = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await;
            match opened {
                Ok(file) => break file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    suffix += 1;
                    candidate = with_suffix(path, suffix);
                }
                Err(e) => return Err(e),
            }
        };
        file.write_all(contents).await?;
        file.flush().await?;
        Ok(candidate)
    }
}

fn with_suffix(path: &Path, suffix: u32) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    path.with_file_name(format!("{stem}-{suffix}.json"))
}

#[async_trait]
impl Sink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn emit(&self, batch: &[Message]) -> Result<(), SinkError> {
        let contents = serde_json::to_vec(batch)?;
        let path = Self::batch_path(&self.root, &Local::now());

        let written = Self::write_new(&path, &contents)
            .await
            .map_err(|source| SinkError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %written.display(), messages = batch.len(), "wrote batch log");
        Ok(())
    }
}
