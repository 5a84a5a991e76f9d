use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(PathBuf),
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("file download is not supported here")]
    Unsupported,
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Host mechanism that hands generated file contents to the user.
pub trait FileDownloader {
    fn is_available(&self) -> bool;
    fn download(&self, file_name: &str, contents: &[u8]) -> Result<DownloadOutcome, DownloadError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// User-visible transient notice.
pub trait Notifier {
    fn notify(&self, level: NoticeLevel, message: &str);
}
