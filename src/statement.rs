//! Structured graph statements
//!
//! The loaders never build query text. They produce [`Statement`] values and
//! a session renders them for its store:
//!
//! - [`Dialect::Cypher`] renders statement text with `$name` placeholders and a
//!   bound parameter map, so values never reach the query text.
//! - [`Dialect::Ngql`] renders inline literals for stores that only accept a
//!   bare statement string. String literals go through
//!   [`sanitize_scalar`](crate::normalize::sanitize_scalar), free text through
//!   [`sanitize_text`](crate::normalize::sanitize_text).
//!
//! Vertex and edge statements are insert-if-absent in both dialects.

use crate::model::{EntityKind, PropertyMap, PropertyValue, RelationKind, VertexId};
use crate::normalize::{sanitize_scalar, sanitize_text};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the vertex attribute holding the generated identifier, and of the
/// column lookups yield.
pub const VID_FIELD: &str = "vid";

/// Graph statement vocabulary of the loaders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Insert a vertex unless one with the same identifier exists.
    UpsertVertex {
        kind: EntityKind,
        id: VertexId,
        properties: PropertyMap,
    },
    /// Insert a directed edge unless it exists.
    UpsertEdge {
        relation: RelationKind,
        src: VertexId,
        dst: VertexId,
    },
    /// Find vertices of `kind` whose `field` equals `value`.
    Lookup {
        kind: EntityKind,
        field: String,
        value: String,
    },
}

impl Statement {
    pub fn vertex(kind: EntityKind, id: VertexId, properties: PropertyMap) -> Self {
        Statement::UpsertVertex { kind, id, properties }
    }

    pub fn edge(relation: RelationKind, src: VertexId, dst: VertexId) -> Self {
        Statement::UpsertEdge { relation, src, dst }
    }

    /// Lookup by the kind's natural-key attribute.
    pub fn lookup(kind: EntityKind, value: impl Into<String>) -> Self {
        Statement::Lookup {
            kind,
            field: kind.key_field().to_string(),
            value: value.into(),
        }
    }

    pub fn is_vertex(&self) -> bool {
        matches!(self, Statement::UpsertVertex { .. })
    }

    pub fn is_edge(&self) -> bool {
        matches!(self, Statement::UpsertEdge { .. })
    }

    /// Identifiers this statement names, vertex id or edge endpoints.
    pub fn vertex_ids(&self) -> Vec<&VertexId> {
        match self {
            Statement::UpsertVertex { id, .. } => vec![id],
            Statement::UpsertEdge { src, dst, .. } => vec![src, dst],
            Statement::Lookup { .. } => Vec::new(),
        }
    }

    pub fn render(&self, dialect: Dialect) -> RenderedStatement {
        match dialect {
            Dialect::Cypher => self.render_cypher(),
            Dialect::Ngql => self.render_ngql(),
        }
    }

    fn render_cypher(&self) -> RenderedStatement {
        let mut params = serde_json::Map::new();
        let text = match self {
            Statement::UpsertVertex { kind, id, properties } => {
                params.insert(VID_FIELD.to_string(), id.as_str().into());
                let mut text =
                    format!("MERGE (v:{} {{{}: ${}}})", kind.tag(), VID_FIELD, VID_FIELD);
                if !properties.is_empty() {
                    let assignments: Vec<String> = properties
                        .keys()
                        .map(|name| format!("v.{} = ${}", name, name))
                        .collect();
                    text.push_str(" ON CREATE SET ");
                    text.push_str(&assignments.join(", "));
                }
                for (name, value) in properties {
                    params.insert(name.clone(), value.to_json());
                }
                text
            }
            Statement::UpsertEdge { relation, src, dst } => {
                let (src_kind, dst_kind) = relation.endpoints();
                params.insert("src".to_string(), src.as_str().into());
                params.insert("dst".to_string(), dst.as_str().into());
                format!(
                    "MATCH (s:{} {{{vid}: $src}}), (d:{} {{{vid}: $dst}}) MERGE (s)-[:{}]->(d)",
                    src_kind.tag(),
                    dst_kind.tag(),
                    relation.edge_type(),
                    vid = VID_FIELD,
                )
            }
            Statement::Lookup { kind, field, value } => {
                params.insert("value".to_string(), value.as_str().into());
                format!(
                    "MATCH (v:{}) WHERE v.{} = $value RETURN v.{vid} AS {vid}",
                    kind.tag(),
                    field,
                    vid = VID_FIELD,
                )
            }
        };
        RenderedStatement { text, params }
    }

    fn render_ngql(&self) -> RenderedStatement {
        let text = match self {
            Statement::UpsertVertex { kind, id, properties } => {
                let columns: Vec<&str> = properties.keys().map(|k| k.as_str()).collect();
                let values: Vec<String> = properties.values().map(ngql_literal).collect();
                format!(
                    "INSERT VERTEX IF NOT EXISTS {}({}) VALUES \"{}\":({})",
                    kind.tag(),
                    columns.join(", "),
                    id,
                    values.join(", ")
                )
            }
            Statement::UpsertEdge { relation, src, dst } => format!(
                "INSERT EDGE IF NOT EXISTS {}() VALUES \"{}\"->\"{}\":()",
                relation.edge_type(),
                src,
                dst
            ),
            Statement::Lookup { kind, field, value } => format!(
                "LOOKUP ON {tag} WHERE {tag}.{} == '{}' YIELD id(VERTEX) AS {}",
                field,
                sanitize_scalar(Some(value)),
                VID_FIELD,
                tag = kind.tag(),
            ),
        };
        RenderedStatement {
            text,
            params: serde_json::Map::new(),
        }
    }
}

fn ngql_literal(value: &PropertyValue) -> String {
    match value {
        PropertyValue::String(s) => format!("'{}'", sanitize_scalar(Some(s))),
        PropertyValue::Text(s) => format!("'{}'", sanitize_text(Some(s))),
        PropertyValue::Integer(i) => i.to_string(),
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::UpsertVertex { kind, id, .. } => write!(f, "UPSERT_VERTEX {}({})", kind, id),
            Statement::UpsertEdge { relation, src, dst } => {
                write!(f, "UPSERT_EDGE {}({} -> {})", relation, src, dst)
            }
            Statement::Lookup { kind, field, value } => {
                write!(f, "LOOKUP {}.{} == {:?}", kind, field, value)
            }
        }
    }
}

/// Query language a session speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Cypher,
    Ngql,
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cypher" => Ok(Dialect::Cypher),
            "ngql" => Ok(Dialect::Ngql),
            other => Err(format!("unknown dialect '{}', expected cypher or ngql", other)),
        }
    }
}

/// Statement text plus bound parameters (empty for inline dialects).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedStatement {
    pub text: String,
    pub params: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper_statement() -> Statement {
        let mut props = PropertyMap::new();
        props.insert("title".into(), "O'Brien's Paper".into());
        props.insert("abstract".into(), PropertyValue::Text("a \"quoted\" word".into()));
        props.insert("page".into(), 12i64.into());
        Statement::vertex(EntityKind::Paper, "paper01".into(), props)
    }

    #[test]
    fn test_cypher_vertex_binds_values() {
        let rendered = paper_statement().render(Dialect::Cypher);
        assert_eq!(
            rendered.text,
            "MERGE (v:paper {vid: $vid}) ON CREATE SET \
             v.title = $title, v.abstract = $abstract, v.page = $page"
        );
        assert_eq!(rendered.params["vid"], serde_json::json!("paper01"));
        assert_eq!(rendered.params["title"], serde_json::json!("O'Brien's Paper"));
        assert_eq!(rendered.params["page"], serde_json::json!(12));
        assert!(!rendered.text.contains("O'Brien"));
    }

    #[test]
    fn test_cypher_edge_and_lookup() {
        let edge =
            Statement::edge(RelationKind::PaperKeyword, "paper01".into(), "key_word02".into());
        let rendered = edge.render(Dialect::Cypher);
        assert_eq!(
            rendered.text,
            "MATCH (s:paper {vid: $src}), (d:key_word {vid: $dst}) MERGE (s)-[:which_key_word]->(d)"
        );
        assert_eq!(rendered.params["dst"], serde_json::json!("key_word02"));

        let lookup = Statement::lookup(EntityKind::Paper, "A");
        let rendered = lookup.render(Dialect::Cypher);
        assert_eq!(rendered.text, "MATCH (v:paper) WHERE v.title = $value RETURN v.vid AS vid");
        assert_eq!(rendered.params["value"], serde_json::json!("A"));
    }

    #[test]
    fn test_ngql_vertex_escapes_literals() {
        let rendered = paper_statement().render(Dialect::Ngql);
        assert_eq!(
            rendered.text,
            "INSERT VERTEX IF NOT EXISTS paper(title, abstract, page) VALUES \
             \"paper01\":('O''Brien''s Paper', 'a \\\"quoted\\\" word', 12)"
        );
        assert!(rendered.params.is_empty());
    }

    #[test]
    fn test_ngql_edge_and_lookup() {
        let edge = Statement::edge(
            RelationKind::TakingOffice,
            "author01".into(),
            "organization03".into(),
        );
        assert_eq!(
            edge.render(Dialect::Ngql).text,
            "INSERT EDGE IF NOT EXISTS taking_office() VALUES \"author01\"->\"organization03\":()"
        );
        let lookup = Statement::lookup(EntityKind::SensitiveEntity, "x'y");
        assert_eq!(
            lookup.render(Dialect::Ngql).text,
            "LOOKUP ON sensitive_entity WHERE sensitive_entity.entity_name == 'x''y' \
             YIELD id(VERTEX) AS vid"
        );
    }

    #[test]
    fn test_display_and_ids() {
        let edge = Statement::edge(RelationKind::Reference, "paper01".into(), "paper02".into());
        assert_eq!(format!("{}", edge), "UPSERT_EDGE which_reference(paper01 -> paper02)");
        assert_eq!(edge.vertex_ids().len(), 2);
        assert!(edge.is_edge());
        assert!(paper_statement().is_vertex());
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("NGQL".parse::<Dialect>(), Ok(Dialect::Ngql));
        assert_eq!("cypher".parse::<Dialect>(), Ok(Dialect::Cypher));
        assert!("sql".parse::<Dialect>().is_err());
    }
}
