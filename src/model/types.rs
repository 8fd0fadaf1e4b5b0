//! Core type definitions for the paper graph
//!
//! Vertex kinds, relation kinds and the generated vertex identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of entity materialized as a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Paper,
    Journal,
    Author,
    Organization,
    Keyword,
    Classification,
    Topic,
    Album,
    Fund,
    SensitiveEntity,
}

impl EntityKind {
    /// Every kind, in the order vertices are reported.
    pub const ALL: [EntityKind; 10] = [
        EntityKind::Paper,
        EntityKind::Journal,
        EntityKind::Author,
        EntityKind::Organization,
        EntityKind::Keyword,
        EntityKind::Classification,
        EntityKind::Topic,
        EntityKind::Album,
        EntityKind::Fund,
        EntityKind::SensitiveEntity,
    ];

    /// Prefix of generated identifiers (`paper01`, `key_word07`).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::Paper => "paper",
            EntityKind::Journal => "journal",
            EntityKind::Author => "author",
            EntityKind::Organization => "organization",
            EntityKind::Keyword => "key_word",
            EntityKind::Classification => "classification",
            EntityKind::Topic => "topic",
            EntityKind::Album => "album",
            EntityKind::Fund => "fund",
            EntityKind::SensitiveEntity => "sensitive_entity",
        }
    }

    /// Tag (vertex label) in the store.
    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::Classification => "classification_number",
            other => other.id_prefix(),
        }
    }

    /// Attribute holding the natural key, used for lookups.
    pub fn key_field(&self) -> &'static str {
        match self {
            EntityKind::Paper => "title",
            EntityKind::SensitiveEntity => "entity_name",
            _ => "name",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Directed relation between two vertex kinds. Relations carry no attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    PaperJournal,
    PaperAuthor,
    /// author -> organization ("holds position")
    TakingOffice,
    PaperOrganization,
    PaperKeyword,
    PaperClassification,
    PaperTopic,
    PaperAlbum,
    PaperFund,
    /// paper -> paper citation
    Reference,
    /// sensitive entity -> paper
    RelatedToPaper,
}

impl RelationKind {
    /// Edge type name in the store.
    pub fn edge_type(&self) -> &'static str {
        match self {
            RelationKind::PaperJournal => "which_journal",
            RelationKind::PaperAuthor => "which_author",
            RelationKind::TakingOffice => "taking_office",
            RelationKind::PaperOrganization => "which_organization",
            RelationKind::PaperKeyword => "which_key_word",
            RelationKind::PaperClassification => "which_classification_number",
            RelationKind::PaperTopic => "which_topic",
            RelationKind::PaperAlbum => "which_album",
            RelationKind::PaperFund => "which_fund",
            RelationKind::Reference => "which_reference",
            RelationKind::RelatedToPaper => "related_to_paper",
        }
    }

    /// (source kind, target kind)
    pub fn endpoints(&self) -> (EntityKind, EntityKind) {
        match self {
            RelationKind::PaperJournal => (EntityKind::Paper, EntityKind::Journal),
            RelationKind::PaperAuthor => (EntityKind::Paper, EntityKind::Author),
            RelationKind::TakingOffice => (EntityKind::Author, EntityKind::Organization),
            RelationKind::PaperOrganization => (EntityKind::Paper, EntityKind::Organization),
            RelationKind::PaperKeyword => (EntityKind::Paper, EntityKind::Keyword),
            RelationKind::PaperClassification => (EntityKind::Paper, EntityKind::Classification),
            RelationKind::PaperTopic => (EntityKind::Paper, EntityKind::Topic),
            RelationKind::PaperAlbum => (EntityKind::Paper, EntityKind::Album),
            RelationKind::PaperFund => (EntityKind::Paper, EntityKind::Fund),
            RelationKind::Reference => (EntityKind::Paper, EntityKind::Paper),
            RelationKind::RelatedToPaper => (EntityKind::SensitiveEntity, EntityKind::Paper),
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.edge_type())
    }
}

/// Generated vertex identifier, `{prefix}{sequence:02}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct VertexId(String);

impl VertexId {
    pub fn new(id: impl Into<String>) -> Self {
        VertexId(id.into())
    }

    /// Build the identifier for the `sequence`-th entity of `kind`.
    pub fn sequenced(kind: EntityKind, sequence: u64) -> Self {
        VertexId(format!("{}{:02}", kind.id_prefix(), sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VertexId {
    fn from(s: String) -> Self {
        VertexId(s)
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        VertexId(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequenced_vertex_id() {
        assert_eq!(VertexId::sequenced(EntityKind::Paper, 1).as_str(), "paper01");
        assert_eq!(VertexId::sequenced(EntityKind::Author, 7).as_str(), "author07");
        assert_eq!(VertexId::sequenced(EntityKind::Keyword, 12).as_str(), "key_word12");
        assert_eq!(VertexId::sequenced(EntityKind::Paper, 100).as_str(), "paper100");
    }

    #[test]
    fn test_classification_tag_differs_from_prefix() {
        let kind = EntityKind::Classification;
        assert_eq!(kind.id_prefix(), "classification");
        assert_eq!(kind.tag(), "classification_number");
        assert_eq!(format!("{}", kind), "classification_number");
    }

    #[test]
    fn test_key_fields() {
        assert_eq!(EntityKind::Paper.key_field(), "title");
        assert_eq!(EntityKind::SensitiveEntity.key_field(), "entity_name");
        assert_eq!(EntityKind::Fund.key_field(), "name");
    }

    #[test]
    fn test_relation_endpoints() {
        assert_eq!(
            RelationKind::TakingOffice.endpoints(),
            (EntityKind::Author, EntityKind::Organization)
        );
        assert_eq!(
            RelationKind::RelatedToPaper.endpoints(),
            (EntityKind::SensitiveEntity, EntityKind::Paper)
        );
        assert_eq!(RelationKind::Reference.edge_type(), "which_reference");
    }

    #[test]
    fn test_vertex_id_conversions() {
        let id: VertexId = "journal03".into();
        assert_eq!(format!("{}", id), "journal03");
        let id2: VertexId = String::from("fund01").into();
        assert!(id2 < id);
    }
}
