//! CSV export - render records and hand them to a download sink

pub mod download;
pub mod render;

use chrono::NaiveDate;
use serde::Serialize;

use crate::constants::CSV_MIME_TYPE;
use crate::date_range::local_today;
use crate::error::ExportError;

pub use self::download::{Blob, DownloadSink, FileDownloads};
pub use self::render::{export_filename, render_mapped, render_rows, Record};

/// Exports records as `{base}-{YYYY-MM-DD}.csv` through a sink.
///
/// Empty input is not an error: a warning is logged, nothing is
/// downloaded and the call returns `Ok(None)`.
pub struct CsvExporter<S: DownloadSink> {
    sink: S,
    clock: fn() -> NaiveDate,
}

impl<S: DownloadSink> CsvExporter<S> {
    pub fn new(sink: S) -> Self {
        Self::with_clock(sink, local_today)
    }

    pub fn with_clock(sink: S, clock: fn() -> NaiveDate) -> Self {
        CsvExporter { sink, clock }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// One column per header; see [`render_rows`] for cell lookup.
    /// Returns the filename that was downloaded.
    pub fn export_rows<T: Serialize>(
        &self,
        rows: &[T],
        headers: &[&str],
        filename_base: &str,
    ) -> Result<Option<String>, ExportError> {
        match render_rows(rows, headers)? {
            Some(body) => self.deliver(body, filename_base).map(Some),
            None => {
                tracing::warn!(filename_base, "No data to export");
                Ok(None)
            }
        }
    }

    /// Map rows first, columns from the first mapped row
    pub fn export_mapped<T, F>(
        &self,
        rows: &[T],
        mapper: F,
        filename_base: &str,
    ) -> Result<Option<String>, ExportError>
    where
        F: Fn(&T) -> Record,
    {
        match render_mapped(rows, mapper)? {
            Some(body) => self.deliver(body, filename_base).map(Some),
            None => {
                tracing::warn!(filename_base, "No data to export");
                Ok(None)
            }
        }
    }

    fn deliver(&self, body: String, filename_base: &str) -> Result<String, ExportError> {
        let filename = export_filename(filename_base, (self.clock)());

        let handle = self
            .sink
            .create_downloadable(body.into_bytes(), CSV_MIME_TYPE)?;
        let triggered = self.sink.trigger_download(&handle, &filename);
        self.sink.release_downloadable(handle);
        triggered?;

        tracing::info!(%filename, "Exported CSV");
        Ok(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::io;

    #[derive(Default)]
    struct RecordingSink {
        created: RefCell<Vec<(String, String)>>,
        downloads: RefCell<Vec<String>>,
        released: RefCell<usize>,
        fail_trigger: bool,
    }

    impl DownloadSink for RecordingSink {
        type Handle = usize;

        fn create_downloadable(&self, bytes: Vec<u8>, mime_type: &str) -> io::Result<usize> {
            let mut created = self.created.borrow_mut();
            created.push((String::from_utf8(bytes).unwrap(), mime_type.to_string()));
            Ok(created.len() - 1)
        }

        fn trigger_download(&self, _handle: &usize, filename: &str) -> io::Result<()> {
            if self.fail_trigger {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "blocked"));
            }
            self.downloads.borrow_mut().push(filename.to_string());
            Ok(())
        }

        fn release_downloadable(&self, _handle: usize) {
            *self.released.borrow_mut() += 1;
        }
    }

    fn mid_may() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    #[test]
    fn test_export_rows_downloads_dated_file() {
        let exporter = CsvExporter::with_clock(RecordingSink::default(), mid_may);
        let rows = vec![json!({"a": "1,2", "b": "x"})];

        let filename = exporter.export_rows(&rows, &["a", "b"], "f").unwrap();
        assert_eq!(filename.as_deref(), Some("f-2024-05-15.csv"));

        let sink = exporter.sink();
        assert_eq!(
            sink.created.borrow()[0],
            ("a,b\n\"1,2\",x".to_string(), CSV_MIME_TYPE.to_string())
        );
        assert_eq!(*sink.downloads.borrow(), vec!["f-2024-05-15.csv".to_string()]);
        assert_eq!(*sink.released.borrow(), 1);
    }

    #[test]
    fn test_empty_export_is_a_no_op() {
        let exporter = CsvExporter::with_clock(RecordingSink::default(), mid_may);
        let rows: Vec<serde_json::Value> = Vec::new();

        assert_eq!(exporter.export_rows(&rows, &["a"], "f").unwrap(), None);
        assert_eq!(
            exporter.export_mapped(&rows, |_| Record::new(), "f").unwrap(),
            None
        );
        assert!(exporter.sink().created.borrow().is_empty());
        assert!(exporter.sink().downloads.borrow().is_empty());
    }

    #[test]
    fn test_failed_trigger_still_releases() {
        let sink = RecordingSink {
            fail_trigger: true,
            ..Default::default()
        };
        let exporter = CsvExporter::with_clock(sink, mid_may);
        let rows = vec![json!({"a": 1})];

        assert!(exporter.export_rows(&rows, &["a"], "f").is_err());
        assert_eq!(*exporter.sink().released.borrow(), 1);
    }

    #[test]
    fn test_file_downloads_writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let exporter = CsvExporter::with_clock(FileDownloads::new(&target), mid_may);
        let rows = vec![("Acme", 3)];

        let filename = exporter
            .export_mapped(
                &rows,
                |(name, count)| {
                    let mut record = Record::new();
                    record.insert("Supplier".into(), json!(name));
                    record.insert("Orders".into(), json!(count));
                    record
                },
                "suppliers",
            )
            .unwrap()
            .unwrap();

        let written = std::fs::read_to_string(target.join(&filename)).unwrap();
        assert_eq!(filename, "suppliers-2024-05-15.csv");
        assert_eq!(written, "Supplier,Orders\nAcme,3");
    }
}
