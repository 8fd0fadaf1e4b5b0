//! Rows of the paper sheet

use serde::Serialize;

use super::sheet::Sheet;
use crate::config::PaperColumns;
use crate::error::LoaderResult;

/// One row of the paper sheet, cells as read. Normalization happens when
/// statements are built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaperRow {
    pub title: Option<String>,
    pub journal: Option<String>,
    pub abstract_text: Option<String>,
    pub keywords: Option<String>,
    pub publish_time: Option<String>,
    pub albums: Option<String>,
    pub topics: Option<String>,
    pub classifications: Option<String>,
    pub downloads: Option<String>,
    pub pages: Option<String>,
    pub citations: Option<String>,
}

impl PaperRow {
    /// Row with only a title, for callers assembling rows by hand.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Extract paper rows from `sheet`. Only the title column is required.
pub fn paper_rows(sheet: &Sheet, columns: &PaperColumns) -> LoaderResult<Vec<PaperRow>> {
    let title = Some(sheet.require_column(&columns.title)?);
    let journal = sheet.column(&columns.journal);
    let abstract_text = sheet.column(&columns.abstract_text);
    let keywords = sheet.column(&columns.keywords);
    let publish_time = sheet.column(&columns.publish_time);
    let albums = sheet.column(&columns.albums);
    let topics = sheet.column(&columns.topics);
    let classifications = sheet.column(&columns.classifications);
    let downloads = sheet.column(&columns.downloads);
    let pages = sheet.column(&columns.pages);
    let citations = sheet.column(&columns.citations);

    let cell = |row: usize, column: Option<usize>| sheet.cell(row, column).map(str::to_string);

    Ok((0..sheet.len())
        .map(|row| PaperRow {
            title: cell(row, title),
            journal: cell(row, journal),
            abstract_text: cell(row, abstract_text),
            keywords: cell(row, keywords),
            publish_time: cell(row, publish_time),
            albums: cell(row, albums),
            topics: cell(row, topics),
            classifications: cell(row, classifications),
            downloads: cell(row, downloads),
            pages: cell(row, pages),
            citations: cell(row, citations),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoaderError;

    #[test]
    fn test_paper_rows_from_csv() {
        let data = "论文标题,期刊名称,关键词,页数,引用量\n\
                    图数据库综述,计算机学报,图;数据库,pp. 12-20,3\n\
                    无期刊,,,,\n";
        let sheet = Sheet::read_csv(data.as_bytes()).unwrap();
        let rows = paper_rows(&sheet, &PaperColumns::default()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title.as_deref(), Some("图数据库综述"));
        assert_eq!(rows[0].journal.as_deref(), Some("计算机学报"));
        assert_eq!(rows[0].keywords.as_deref(), Some("图;数据库"));
        assert_eq!(rows[0].pages.as_deref(), Some("pp. 12-20"));
        assert_eq!(rows[0].abstract_text, None);
        assert_eq!(rows[1].journal, None);
    }

    #[test]
    fn test_missing_title_column() {
        let sheet = Sheet::read_csv("期刊名称\nX\n".as_bytes()).unwrap();
        let err = paper_rows(&sheet, &PaperColumns::default()).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(name) if name == "论文标题"));
    }
}
