//! Nested paper documents
//!
//! The document export is a JSON array aligned with the paper sheet, one
//! record per row. Keys come in the exported (Chinese) form or as English
//! aliases:
//!
//! ```json
//! {"题目": "...", "作者": [{"姓名": "...", "单位": ["..."]}],
//!  "基金资助": [{"项目名称": "...", "项目号": "..."}],
//!  "参考文献": [{"题目": "..."}]}
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{LoaderError, LoaderResult};
use crate::normalize::split_list;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperDocument {
    #[serde(rename = "题目", alias = "title", default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(rename = "作者", alias = "authors", default, deserialize_with = "null_as_empty")]
    pub authors: Vec<AuthorEntry>,
    #[serde(rename = "基金资助", alias = "funds", default, deserialize_with = "null_as_empty")]
    pub funds: Vec<FundEntry>,
    #[serde(rename = "参考文献", alias = "references", default, deserialize_with = "null_as_empty")]
    pub references: Vec<ReferenceEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorEntry {
    #[serde(rename = "姓名", alias = "name", default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// A list, or one string with delimited names
    #[serde(rename = "单位", alias = "affiliations", default, deserialize_with = "one_or_many")]
    pub affiliations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundEntry {
    #[serde(rename = "项目名称", alias = "name", default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "项目号", alias = "number", default, deserialize_with = "lenient_string")]
    pub number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    #[serde(rename = "题目", alias = "title", default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
}

impl PaperDocument {
    /// Reference titles in document order, missing ones dropped.
    pub fn reference_titles(&self) -> impl Iterator<Item = &str> {
        self.references.iter().filter_map(|r| r.title.as_deref())
    }
}

/// Read the document export from a file.
pub fn read_documents_file(path: impl AsRef<Path>) -> LoaderResult<Vec<PaperDocument>> {
    let path = path.as_ref();
    info!("Reading paper documents from {:?}", path);
    let documents = read_documents(BufReader::new(File::open(path)?))?;
    info!("Read {} paper documents", documents.len());
    Ok(documents)
}

/// Read the document export. A record that does not deserialize becomes an
/// empty document so the remaining records keep their row alignment.
pub fn read_documents<R: Read>(reader: R) -> LoaderResult<Vec<PaperDocument>> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    let records = match value {
        serde_json::Value::Array(records) => records,
        _ => {
            return Err(LoaderError::Source(
                "paper documents must be a JSON array".to_string(),
            ))
        }
    };

    Ok(records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            serde_json::from_value(record).unwrap_or_else(|e| {
                warn!("Paper document {} is malformed, using an empty one: {}", idx, e);
                PaperDocument::default()
            })
        })
        .collect())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Option<String>>),
    One(String),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => split_list(Some(&s)),
        Some(OneOrMany::Many(items)) => items.into_iter().flatten().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chinese_keys() {
        let data = r#"[{
            "题目": "图数据库综述",
            "作者": [{"姓名": "张三", "单位": ["清华大学", "北京大学"]}],
            "基金资助": [{"项目名称": "国家自然科学基金", "项目号": 61772}],
            "参考文献": [{"题目": "知识图谱"}, {"作者": "无题目"}]
        }]"#;
        let docs = read_documents(data.as_bytes()).unwrap();
        assert_eq!(docs.len(), 1);
        let doc = &docs[0];
        assert_eq!(doc.title.as_deref(), Some("图数据库综述"));
        assert_eq!(doc.authors[0].name.as_deref(), Some("张三"));
        assert_eq!(doc.authors[0].affiliations, vec!["清华大学", "北京大学"]);
        assert_eq!(doc.funds[0].number.as_deref(), Some("61772"));
        assert_eq!(doc.reference_titles().collect::<Vec<_>>(), vec!["知识图谱"]);
    }

    #[test]
    fn test_english_aliases_and_string_affiliations() {
        let data = r#"[{
            "title": "Graphs",
            "authors": [{"name": "Li", "affiliations": "MIT；Stanford"}],
            "funds": null
        }]"#;
        let docs = read_documents(data.as_bytes()).unwrap();
        assert_eq!(docs[0].title.as_deref(), Some("Graphs"));
        assert_eq!(docs[0].authors[0].affiliations, vec!["MIT", "Stanford"]);
        assert!(docs[0].funds.is_empty());
        assert!(docs[0].references.is_empty());
    }

    #[test]
    fn test_malformed_record_keeps_alignment() {
        let data = r#"[{"题目": "A"}, {"作者": 42}, {"题目": "C"}]"#;
        let docs = read_documents(data.as_bytes()).unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[1], PaperDocument::default());
        assert_eq!(docs[2].title.as_deref(), Some("C"));
    }

    #[test]
    fn test_read_documents_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.json");
        std::fs::write(&path, r#"[{"题目": "A"}]"#).unwrap();
        let docs = read_documents_file(&path).unwrap();
        assert_eq!(docs[0].title.as_deref(), Some("A"));
    }
}
