use crate::core::{Exporter, PrintHost};
use crate::domain::model::{Blob, ObjectUrl, PrintOutcome};
use crate::utils::error::Result;
use std::sync::Arc;

/// Revokes the object URL when dropped, whichever way the print call ends.
struct ObjectUrlGuard<'a> {
    host: &'a dyn PrintHost,
    url: ObjectUrl,
}

impl Drop for ObjectUrlGuard<'_> {
    fn drop(&mut self) {
        tracing::debug!("Revoking object URL {}", self.url);
        self.host.revoke_object_url(&self.url);
    }
}

pub struct PrintAdapter {
    host: Arc<dyn PrintHost>,
}

impl PrintAdapter {
    pub fn new(host: Arc<dyn PrintHost>) -> Self {
        Self { host }
    }

    /// Exports, opens the result in a new window and prints it.
    ///
    /// Errors never propagate: they are logged and reported as
    /// [`PrintOutcome::Failed`]. A missing exporter is a no-op.
    pub async fn print(&self, exporter: Option<&dyn Exporter>) -> PrintOutcome {
        let Some(exporter) = exporter else {
            tracing::debug!("No exporter attached, nothing to print");
            return PrintOutcome::Skipped;
        };

        match self.export_and_print(exporter).await {
            Ok(()) => {
                tracing::info!("🖨️ Print job submitted");
                PrintOutcome::Printed
            }
            Err(e) => {
                tracing::error!("❌ Error printing export: {}", e);
                PrintOutcome::Failed(e.to_string())
            }
        }
    }

    async fn export_and_print(&self, exporter: &dyn Exporter) -> Result<()> {
        let buffer = exporter.export().await?;
        let blob = Blob::spreadsheet(buffer);
        tracing::debug!("Created {} blob ({} bytes)", blob.mime, blob.bytes.len());

        let url = self.host.create_object_url(blob).await?;
        let guard = ObjectUrlGuard {
            host: self.host.as_ref(),
            url,
        };

        let mut window = self.host.open_window(&guard.url).await?;
        window.wait_loaded().await?;
        window.print().await?;

        Ok(())
    }
}
