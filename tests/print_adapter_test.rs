use anyhow::Result;
use async_trait::async_trait;
use gradebook_client::core::{Exporter, MissingScorePolicy, PeriodScores, PrintHost, PrintOutcome, PrintWindow};
use gradebook_client::domain::model::{Blob, ObjectUrl, XLSX_MIME};
use gradebook_client::{ClientError, FsPrintHost, GradeSheet, GradeSheetExporter, PrintAdapter};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FailAt {
    Nowhere,
    Open,
    Print,
}

/// 模擬瀏覽器：記錄每一步呼叫
struct RecordingHost {
    steps: Arc<Mutex<Vec<String>>>,
    fail_at: FailAt,
}

impl RecordingHost {
    fn new(fail_at: FailAt) -> Self {
        Self {
            steps: Arc::new(Mutex::new(Vec::new())),
            fail_at,
        }
    }

    fn steps(&self) -> Vec<String> {
        self.steps.lock().unwrap().clone()
    }
}

struct RecordingWindow {
    steps: Arc<Mutex<Vec<String>>>,
    fail_print: bool,
}

#[async_trait]
impl PrintWindow for RecordingWindow {
    async fn wait_loaded(&mut self) -> gradebook_client::Result<()> {
        self.steps.lock().unwrap().push("loaded".to_string());
        Ok(())
    }

    async fn print(&mut self) -> gradebook_client::Result<()> {
        if self.fail_print {
            return Err(ClientError::PrintError {
                message: "printer offline".to_string(),
            });
        }
        self.steps.lock().unwrap().push("print".to_string());
        Ok(())
    }
}

#[async_trait]
impl PrintHost for RecordingHost {
    async fn create_object_url(&self, blob: Blob) -> gradebook_client::Result<ObjectUrl> {
        self.steps
            .lock()
            .unwrap()
            .push(format!("blob:{}:{}", blob.mime, blob.bytes.len()));
        Ok(ObjectUrl(url::Url::parse("blob:http://localhost/1234").unwrap()))
    }

    async fn open_window(&self, url: &ObjectUrl) -> gradebook_client::Result<Box<dyn PrintWindow>> {
        if self.fail_at == FailAt::Open {
            return Err(ClientError::PrintError {
                message: "popup blocked".to_string(),
            });
        }
        self.steps.lock().unwrap().push(format!("open:{}", url));
        Ok(Box::new(RecordingWindow {
            steps: self.steps.clone(),
            fail_print: self.fail_at == FailAt::Print,
        }))
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        self.steps.lock().unwrap().push(format!("revoke:{}", url));
    }
}

struct StaticExporter(Vec<u8>);

#[async_trait]
impl Exporter for StaticExporter {
    async fn export(&self) -> gradebook_client::Result<Vec<u8>> {
        Ok(self.0.clone())
    }
}

struct FailingExporter;

#[async_trait]
impl Exporter for FailingExporter {
    async fn export(&self) -> gradebook_client::Result<Vec<u8>> {
        Err(ClientError::ExportError {
            message: "sheet not ready".to_string(),
        })
    }
}

#[tokio::test]
async fn test_print_runs_steps_in_order_and_revokes() {
    let host = Arc::new(RecordingHost::new(FailAt::Nowhere));
    let adapter = PrintAdapter::new(host.clone());
    let exporter = StaticExporter(vec![1, 2, 3]);

    let outcome = adapter.print(Some(&exporter)).await;

    assert_eq!(outcome, PrintOutcome::Printed);
    assert_eq!(
        host.steps(),
        vec![
            format!("blob:{}:3", XLSX_MIME),
            "open:blob:http://localhost/1234".to_string(),
            "loaded".to_string(),
            "print".to_string(),
            "revoke:blob:http://localhost/1234".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_missing_exporter_is_skipped() {
    let host = Arc::new(RecordingHost::new(FailAt::Nowhere));
    let adapter = PrintAdapter::new(host.clone());

    assert_eq!(adapter.print(None).await, PrintOutcome::Skipped);
    assert!(host.steps().is_empty());
}

#[tokio::test]
async fn test_export_failure_is_caught() {
    let host = Arc::new(RecordingHost::new(FailAt::Nowhere));
    let adapter = PrintAdapter::new(host.clone());

    let outcome = adapter.print(Some(&FailingExporter)).await;

    assert!(matches!(outcome, PrintOutcome::Failed(ref m) if m.contains("sheet not ready")));
    assert!(host.steps().is_empty());
}

/// 彈出視窗被擋時仍要釋放 object URL
#[tokio::test]
async fn test_blocked_popup_still_revokes_url() {
    let host = Arc::new(RecordingHost::new(FailAt::Open));
    let adapter = PrintAdapter::new(host.clone());

    let outcome = adapter.print(Some(&StaticExporter(vec![0]))).await;

    assert!(matches!(outcome, PrintOutcome::Failed(ref m) if m.contains("popup blocked")));
    let steps = host.steps();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[1], "revoke:blob:http://localhost/1234");
}

#[tokio::test]
async fn test_print_failure_still_revokes_url() {
    let host = Arc::new(RecordingHost::new(FailAt::Print));
    let adapter = PrintAdapter::new(host.clone());

    let outcome = adapter.print(Some(&StaticExporter(vec![0]))).await;

    assert!(matches!(outcome, PrintOutcome::Failed(ref m) if m.contains("printer offline")));
    assert_eq!(
        host.steps().last().map(String::as_str),
        Some("revoke:blob:http://localhost/1234")
    );
}

/// 實際匯出成績表並交給檔案系統列印主機
#[cfg(unix)]
#[tokio::test]
async fn test_grade_sheet_printed_through_fs_host() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let host = Arc::new(FsPrintHost::new(temp_dir.path(), vec!["true".to_string()]));
    let adapter = PrintAdapter::new(host);

    let mut sheet = GradeSheet::new("BSCS 2A");
    sheet.push("Ana Cruz", PeriodScores::parse("80", "90", "70"));
    sheet.push("Ben Reyes", PeriodScores::parse("", "90", "70"));
    let exporter = GradeSheetExporter::new(sheet, MissingScorePolicy::CountAsZero);

    let outcome = adapter.print(Some(&exporter)).await;
    assert_eq!(outcome, PrintOutcome::Printed);

    // object URL 已釋放，暫存檔不應留下
    let leftover = std::fs::read_dir(temp_dir.path())?.count();
    assert_eq!(leftover, 0);

    Ok(())
}

#[tokio::test]
async fn test_fs_host_without_command_fails_and_cleans_up() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let host = Arc::new(FsPrintHost::new(temp_dir.path(), vec![]));
    let adapter = PrintAdapter::new(host);

    let outcome = adapter.print(Some(&StaticExporter(b"PK".to_vec()))).await;
    assert!(matches!(outcome, PrintOutcome::Failed(_)));
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 0);

    Ok(())
}
