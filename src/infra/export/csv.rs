use anyhow::{anyhow, Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::domain::entities::entity::Entity;
use crate::usecase::services::export_service::ExportColumn;

/// Header line plus one line per row, CRLF-terminated. Cells are quoted
/// only when they contain a comma, quote, CR or LF; quotes are doubled.
/// Missing and null cells are written empty, except in a single-column
/// export where an empty cell is written as `""` so the record does not
/// read back as a blank line.
pub fn render_csv(rows: &[Entity], columns: &[ExportColumn]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer
        .write_record(columns.iter().map(|column| column.header.as_str()))
        .context("failed to write csv header")?;
    for (row_idx, row) in rows.iter().enumerate() {
        writer
            .write_record(columns.iter().map(|column| column.cell(row)))
            .with_context(|| format!("failed to write csv row {}", row_idx + 1))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow!("failed to flush csv writer: {}", err.error()))?;
    String::from_utf8(bytes).context("csv output is not valid utf-8")
}
