use crate::config::toml_config::PrintConfig;
use crate::domain::model::{Blob, ObjectUrl, XLSX_MIME};
use crate::domain::ports::{PrintHost, PrintWindow};
use crate::utils::error::{ClientError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use url::Url;

/// Print host backed by the local filesystem. Object URLs point at files in
/// `output_dir`; printing hands the file to an external command such as `lp`.
#[derive(Debug)]
pub struct FsPrintHost {
    output_dir: PathBuf,
    command: Vec<String>,
    counter: AtomicU64,
}

impl FsPrintHost {
    pub fn new(output_dir: impl Into<PathBuf>, command: Vec<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            command,
            counter: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &PrintConfig) -> Self {
        Self::new(&config.output_dir, config.command.clone())
    }

    fn extension_for(mime: &str) -> &'static str {
        if mime == XLSX_MIME {
            "xlsx"
        } else {
            "bin"
        }
    }

    fn path_for(url: &ObjectUrl) -> Result<PathBuf> {
        url.0.to_file_path().map_err(|_| ClientError::PrintError {
            message: format!("Not a file URL: {}", url),
        })
    }
}

#[async_trait]
impl PrintHost for FsPrintHost {
    async fn create_object_url(&self, blob: Blob) -> Result<ObjectUrl> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let seq = self.counter.fetch_add(1, Ordering::SeqCst);
        let filename = format!(
            "blob-{}-{}-{}.{}",
            chrono::Utc::now().format("%Y%m%d%H%M%S"),
            std::process::id(),
            seq,
            Self::extension_for(blob.mime)
        );
        let path = std::path::absolute(self.output_dir.join(filename))?;
        tokio::fs::write(&path, &blob.bytes).await?;

        let url = Url::from_file_path(&path).map_err(|_| ClientError::PrintError {
            message: format!("Cannot build file URL for {}", path.display()),
        })?;
        tracing::debug!("Wrote blob to {}", path.display());
        Ok(ObjectUrl(url))
    }

    async fn open_window(&self, url: &ObjectUrl) -> Result<Box<dyn PrintWindow>> {
        let path = Self::path_for(url)?;
        Ok(Box::new(FsPrintWindow {
            path,
            command: self.command.clone(),
        }))
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        let Ok(path) = Self::path_for(url) else {
            return;
        };
        // 由 Drop 呼叫，必須同步刪除：返回時檔案已經不存在
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}

pub struct FsPrintWindow {
    path: PathBuf,
    command: Vec<String>,
}

#[async_trait]
impl PrintWindow for FsPrintWindow {
    async fn wait_loaded(&mut self) -> Result<()> {
        let metadata = tokio::fs::metadata(&self.path).await?;
        if !metadata.is_file() {
            return Err(ClientError::PrintError {
                message: format!("{} is not a file", self.path.display()),
            });
        }
        Ok(())
    }

    async fn print(&mut self) -> Result<()> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(ClientError::PrintError {
                message: "no print command configured".to_string(),
            });
        };

        tracing::debug!("Running print command: {} {:?} {}", program, args, self.path.display());
        let status = tokio::process::Command::new(program)
            .args(args)
            .arg(&self.path)
            .status()
            .await?;

        if !status.success() {
            return Err(ClientError::PrintError {
                message: format!("'{}' exited with {}", program, status),
            });
        }
        Ok(())
    }
}
