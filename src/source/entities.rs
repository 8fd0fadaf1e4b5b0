//! Rows of the sensitive-entity sheet

use serde::Serialize;

use super::sheet::Sheet;
use crate::config::EntityColumns;
use crate::error::LoaderResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityRow {
    pub name: Option<String>,
    pub score: Option<String>,
    /// Bracketed, quoted, comma-separated paper titles
    pub related_papers: Option<String>,
}

/// Extract entity rows from `sheet`. Only the name column is required.
pub fn entity_rows(sheet: &Sheet, columns: &EntityColumns) -> LoaderResult<Vec<EntityRow>> {
    let name = Some(sheet.require_column(&columns.name)?);
    let score = sheet.column(&columns.score);
    let related_papers = sheet.column(&columns.related_papers);

    Ok((0..sheet.len())
        .map(|row| EntityRow {
            name: sheet.cell(row, name).map(str::to_string),
            score: sheet.cell(row, score).map(str::to_string),
            related_papers: sheet.cell(row, related_papers).map(str::to_string),
        })
        .collect())
}
