use std::fmt;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::domain::entities::entity::Entity;
use crate::domain::entities::schema::{EntityKind, EntitySchema};
use crate::infra::export::csv::render_csv;
use crate::usecase::ports::download::{DownloadOutcome, FileDownloader, NoticeLevel, Notifier};

#[derive(Clone)]
pub enum Accessor {
    /// Dotted field path.
    Field(String),
    Computed(fn(&Entity) -> String),
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(path) => f.debug_tuple("Field").field(path).finish(),
            Accessor::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportColumn {
    pub header: String,
    pub accessor: Accessor,
}

impl ExportColumn {
    pub fn field(header: &str, path: &str) -> Self {
        Self {
            header: header.to_string(),
            accessor: Accessor::Field(path.to_string()),
        }
    }

    pub fn computed(header: &str, accessor: fn(&Entity) -> String) -> Self {
        Self {
            header: header.to_string(),
            accessor: Accessor::Computed(accessor),
        }
    }

    pub fn cell(&self, row: &Entity) -> String {
        match &self.accessor {
            Accessor::Field(path) => row.lookup(path).map(|v| v.display_text()).unwrap_or_default(),
            Accessor::Computed(accessor) => accessor(row),
        }
    }
}

pub fn columns_for(schema: &EntitySchema) -> Vec<ExportColumn> {
    schema
        .columns
        .iter()
        .map(|column| ExportColumn::field(column.header, column.field))
        .collect()
}

pub fn default_file_name(kind: EntityKind) -> String {
    format!("{}-{}.csv", kind.slug(), Local::now().format("%Y%m%d-%H%M%S"))
}

/// Serializes `rows` and hands the file to `downloader`. Returns `false`
/// when nothing was saved; failures other than a user cancel are reported
/// through `notifier`.
pub fn export_to_csv(
    rows: &[Entity],
    columns: &[ExportColumn],
    file_name: &str,
    downloader: &dyn FileDownloader,
    notifier: &dyn Notifier,
) -> bool {
    if rows.is_empty() {
        notifier.notify(NoticeLevel::Warning, "There is no data to export.");
        return false;
    }
    if !downloader.is_available() {
        notifier.notify(
            NoticeLevel::Warning,
            "File download is not supported in this environment.",
        );
        return false;
    }

    let contents = match render_csv(rows, columns) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "csv rendering failed");
            notifier.notify(NoticeLevel::Error, &format!("Export failed: {err}"));
            return false;
        }
    };

    match downloader.download(file_name, contents.as_bytes()) {
        Ok(DownloadOutcome::Saved(path)) => {
            info!(rows = rows.len(), path = %path.display(), "exported csv");
            true
        }
        Ok(DownloadOutcome::Cancelled) => {
            debug!(file_name, "csv export cancelled");
            false
        }
        Err(err) => {
            warn!(error = %err, "csv download failed");
            notifier.notify(NoticeLevel::Error, &format!("Export failed: {err}"));
            false
        }
    }
}
