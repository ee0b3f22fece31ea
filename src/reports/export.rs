// src/reports/export.rs
//! Hands rendered documents to an output sink

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::path::{Path, PathBuf};
use strum::{AsRefStr, Display, EnumString};

use super::document::TabularDocument;
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Csv,
    Html,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Csv => "csv",
            DocumentFormat::Html => "html",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentFormat::Csv => "text/csv; charset=utf-8",
            DocumentFormat::Html => "text/html; charset=utf-8",
        }
    }

    pub fn render(&self, document: &TabularDocument) -> ClientResult<Vec<u8>> {
        match self {
            DocumentFormat::Csv => document.to_csv(),
            DocumentFormat::Html => Ok(document.to_html().into_bytes()),
        }
    }
}

/// Dated file name, e.g. `admin_report_2024-05-03.csv`.
pub fn export_file_name(stem: &str, date: NaiveDate, format: DocumentFormat) -> String {
    format!("{}_{}.{}", stem, date.format("%Y-%m-%d"), format.extension())
}

/// Destination of exported documents: a directory, a share dialog, a print service.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn write(&self, file_name: &str, content_type: &str, contents: Vec<u8>) -> ClientResult<PathBuf>;
}

/// Writes documents into a directory, creating it when needed.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DocumentSink for FileSink {
    async fn write(&self, file_name: &str, _content_type: &str, contents: Vec<u8>) -> ClientResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub format: DocumentFormat,
    pub bytes: usize,
}

/// Renders `document` and hands it to `sink`. Failures are logged and returned.
pub async fn export_document<S>(
    sink: &S,
    document: &TabularDocument,
    format: DocumentFormat,
    stem: &str,
) -> ClientResult<ExportedFile>
where
    S: DocumentSink + ?Sized,
{
    if document.is_empty() {
        tracing::warn!(title = %document.title, "exporting a document with no sections");
    }

    let contents = format.render(document)?;
    let bytes = contents.len();
    let file_name = export_file_name(stem, Local::now().date_naive(), format);

    match sink.write(&file_name, format.content_type(), contents).await {
        Ok(path) => {
            tracing::info!(path = %path.display(), bytes, %format, "report exported");
            Ok(ExportedFile { path, format, bytes })
        }
        Err(err) => {
            tracing::error!(file = %file_name, error = %err, "report export failed");
            Err(match err {
                ClientError::Io(io) => ClientError::Export(format!("Could not write {}: {}", file_name, io)),
                other => other,
            })
        }
    }
}
