use std::fs;

use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use tracing::debug;

use crate::usecase::ports::download::{
    DownloadError, DownloadOutcome, FileDownloader, NoticeLevel, Notifier,
};

/// Saves generated files through the native save dialog.
#[derive(Debug, Default, Clone, Copy)]
pub struct RfdDownloader;

impl FileDownloader for RfdDownloader {
    fn is_available(&self) -> bool {
        if cfg!(target_os = "linux") {
            std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
        } else {
            true
        }
    }

    fn download(&self, file_name: &str, contents: &[u8]) -> Result<DownloadOutcome, DownloadError> {
        if !self.is_available() {
            return Err(DownloadError::Unsupported);
        }
        let Some(path) = FileDialog::new()
            .set_file_name(file_name)
            .add_filter("CSV", &["csv"])
            .save_file()
        else {
            return Ok(DownloadOutcome::Cancelled);
        };
        fs::write(&path, contents).map_err(|source| DownloadError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = contents.len(), "file written");
        Ok(DownloadOutcome::Saved(path))
    }
}

/// Shows notices as native message boxes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RfdNotifier;

impl Notifier for RfdNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        let (level, title) = match level {
            NoticeLevel::Warning => (MessageLevel::Warning, "Warning"),
            NoticeLevel::Error => (MessageLevel::Error, "Error"),
        };
        MessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}
