use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use crate::domain::entities::entity::EntityId;
use crate::domain::entities::schema::EntityKind;
use crate::infra::import::csv::read_csv_rows;
use crate::infra::import::xlsx::read_xlsx_rows;
use crate::infra::sqlite::queries::insert_entities;
use crate::usecase::ports::repo::Fields;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub kind: EntityKind,
    pub ids: Vec<EntityId>,
}

impl ImportResult {
    pub fn row_count(&self) -> usize {
        self.ids.len()
    }
}

pub struct ImportService {
    db_path: PathBuf,
}

impl ImportService {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    pub fn import_csv(&self, kind: EntityKind, path: &Path) -> Result<ImportResult> {
        self.store(kind, path, read_csv_rows(path)?)
    }

    pub fn import_xlsx(&self, kind: EntityKind, path: &Path) -> Result<ImportResult> {
        self.store(kind, path, read_xlsx_rows(path)?)
    }

    /// Picks the reader from the file extension; anything but `.xlsx` is
    /// read as CSV.
    pub fn import_file(&self, kind: EntityKind, path: &Path) -> Result<ImportResult> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();
        if ext == "xlsx" {
            self.import_xlsx(kind, path)
        } else {
            self.import_csv(kind, path)
        }
    }

    fn store(&self, kind: EntityKind, path: &Path, rows: Vec<Fields>) -> Result<ImportResult> {
        let schema = kind.schema();
        let rows = rows.into_iter().map(|fields| schema.normalize(fields)).collect();
        let ids = insert_entities(&self.db_path, kind, rows)?;
        info!(kind = kind.slug(), rows = ids.len(), source = %path.display(), "imported entities");
        Ok(ImportResult { kind, ids })
    }
}
