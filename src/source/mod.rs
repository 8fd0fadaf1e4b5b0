//! Input sources
//!
//! - [`Sheet`]: exported spreadsheet (CSV or JSON array of objects)
//! - [`PaperRow`] / [`EntityRow`]: typed rows of the two sheets
//! - [`PaperDocument`]: nested per-paper record aligned with the paper sheet

pub mod documents;
pub mod entities;
pub mod papers;
pub mod sheet;

pub use documents::{
    read_documents, read_documents_file, AuthorEntry, FundEntry, PaperDocument, ReferenceEntry,
};
pub use entities::{entity_rows, EntityRow};
pub use papers::{paper_rows, PaperRow};
pub use sheet::{Sheet, SheetFormat};

use tracing::warn;

/// Pair sheet rows with documents in order. On a length mismatch the
/// shorter side wins and the surplus is dropped.
pub fn join_rows<'a>(
    rows: &'a [PaperRow],
    documents: &'a [PaperDocument],
) -> impl Iterator<Item = (&'a PaperRow, &'a PaperDocument)> {
    if rows.len() != documents.len() {
        warn!(
            "Paper sheet has {} rows but {} documents; loading the first {}",
            rows.len(),
            documents.len(),
            rows.len().min(documents.len())
        );
    }
    rows.iter().zip(documents.iter())
}
