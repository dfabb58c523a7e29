//! Download port - the only place an export touches the host environment

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Narrow boundary for handing bytes to the user as a file.
///
/// Callers create a downloadable, trigger it under a filename, and always
/// release it afterwards, whether or not the trigger succeeded.
pub trait DownloadSink {
    type Handle;

    fn create_downloadable(&self, bytes: Vec<u8>, mime_type: &str) -> io::Result<Self::Handle>;

    fn trigger_download(&self, handle: &Self::Handle, filename: &str) -> io::Result<()>;

    fn release_downloadable(&self, handle: Self::Handle);
}

/// In-memory content waiting to be saved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Saves downloads as files in a directory
#[derive(Clone, Debug)]
pub struct FileDownloads {
    dir: PathBuf,
}

impl FileDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileDownloads { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for FileDownloads {
    type Handle = Blob;

    fn create_downloadable(&self, bytes: Vec<u8>, mime_type: &str) -> io::Result<Blob> {
        Ok(Blob {
            bytes,
            mime_type: mime_type.to_string(),
        })
    }

    fn trigger_download(&self, handle: &Blob, filename: &str) -> io::Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let path = self.dir.join(filename);
        fs::write(&path, &handle.bytes)?;
        tracing::info!(path = %path.display(), bytes = handle.bytes.len(), "Saved download");
        Ok(())
    }

    fn release_downloadable(&self, handle: Blob) {
        tracing::debug!(mime_type = %handle.mime_type, "Released downloadable");
    }
}
