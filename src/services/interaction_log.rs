use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::models::error::LogWriteError;
use crate::models::types::InteractionRecord;
use crate::traits::interaction_log::InteractionLog;

/// Реализация InteractionLog поверх JSON Lines файла
///
/// The file is opened once by [`JsonlInteractionLog::open`] and kept until
/// [`JsonlInteractionLog::close`]. Appends are serialized by a mutex, so each
/// record lands as one whole line.
pub struct JsonlInteractionLog {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl JsonlInteractionLog {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, LogWriteError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path).await?;
        info!(path = %path.display(), "interaction log opened");
        Ok(Self { path, file: Mutex::new(Some(file)) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes, syncs and releases the file. Later appends fail with
    /// [`LogWriteError::Closed`]. Closing twice is a no-op.
    pub async fn close(&self) -> Result<(), LogWriteError> {
        let mut guard = self.file.lock().await;
        if let Some(mut file) = guard.take() {
            file.flush().await?;
            file.sync_all().await?;
            info!(path = %self.path.display(), "interaction log closed");
        }
        Ok(())
    }
}

async fn write_line(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

#[async_trait]
impl InteractionLog for JsonlInteractionLog {
    async fn append(&self, record: &InteractionRecord) -> Result<(), LogWriteError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut guard = self.file.lock().await;
        let file = guard.as_mut().ok_or(LogWriteError::Closed)?;
        let len_before = file.metadata().await?.len();
        if let Err(e) = write_line(file, line.as_bytes()).await {
            // Обрезаем недописанную строку, чтобы следующая запись начиналась с новой строки
            if let Err(truncate_err) = file.set_len(len_before).await {
                warn!(path = %self.path.display(), error = %truncate_err, "interaction log: failed to drop partial line");
            }
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::GenerationMode;

    fn record(prompt: &str) -> InteractionRecord {
        InteractionRecord::builder()
            .prompt(prompt)
            .response("r")
            .source(GenerationMode::Stub)
            .build()
    }

    #[tokio::test]
    async fn failed_write_keeps_following_lines_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let log = JsonlInteractionLog::open(&path).await.unwrap();
        log.append(&record("kept")).await.unwrap();
        let len = std::fs::metadata(&path).unwrap().len();

        // Подменяем файл на дескриптор только для чтения: запись гарантированно падает
        let read_only = File::open(&path).await.unwrap();
        let writable = log.file.lock().await.replace(read_only);
        assert!(matches!(log.append(&record("lost")).await, Err(LogWriteError::Io(_))));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), len);

        *log.file.lock().await = writable;
        log.append(&record("after")).await.unwrap();
        log.close().await.unwrap();

        let prompts: Vec<String> = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str::<InteractionRecord>(l).unwrap().prompt)
            .collect();
        assert_eq!(prompts, vec!["kept".to_string(), "after".to_string()]);
    }
}
