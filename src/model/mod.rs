//! Entity model: identity, merge, and row contracts for graph components
//!
//! Domain layers implement [`GraphNode`] and [`GraphRelationship`] for their
//! own node and relationship kinds (heterogeneous node kinds are expressed
//! as a closed enum implementing [`GraphNode`]), and [`GraphMapper`] to
//! convert raw input records into candidate entities.

pub mod sanitize;

use crate::error::ImportResult;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A single cell of an output row.
///
/// `Id` is an identity-bearing string cell: the writer strips embedded
/// whitespace from it entirely, because the bulk loader treats whitespace
/// in identifiers unpredictably. Everything else renders via its natural
/// form, with list cells joined by `;`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Id(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    StrList(Vec<String>),
}

/// Failure combining two records that share an identity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// Both records carry a value for a single-valued attribute and the
    /// values differ.
    #[error("conflicting values for attribute '{attribute}' on {entity_type}: {left} vs {right}")]
    Conflict {
        entity_type: String,
        attribute: String,
        left: String,
        right: String,
    },

    /// Two records with unequal identities were handed to `merge`. The
    /// engine keys merges by identity, so this is an invariant violation,
    /// not a reachable user error.
    #[error("identity mismatch merging {entity_type} records: {left} vs {right}")]
    IdentityMismatch {
        entity_type: String,
        left: String,
        right: String,
    },
}

/// A merged entity is missing an attribute its type declares as required
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{node_type} '{node_id}' is missing required attribute '{attribute}'")]
pub struct ValidationError {
    pub node_type: String,
    pub node_id: String,
    pub attribute: String,
}

/// Merge one optional attribute from two records being combined.
///
/// Equal values keep either; exactly one present keeps it; both present
/// and unequal is a conflict naming the type, attribute, and both values.
pub fn merge_attribute<T>(
    entity_type: &str,
    attribute: &str,
    left: Option<T>,
    right: Option<T>,
) -> Result<Option<T>, MergeError>
where
    T: PartialEq + fmt::Debug,
{
    match (left, right) {
        (Some(a), Some(b)) if a == b => Ok(Some(a)),
        (Some(a), Some(b)) => Err(MergeError::Conflict {
            entity_type: entity_type.to_string(),
            attribute: attribute.to_string(),
            left: format!("{:?}", a),
            right: format!("{:?}", b),
        }),
        (Some(a), None) => Ok(Some(a)),
        (None, Some(b)) => Ok(Some(b)),
        (None, None) => Ok(None),
    }
}

/// Merge an always-present single-valued attribute: the values must agree.
pub fn merge_equal<T>(entity_type: &str, attribute: &str, left: T, right: T) -> Result<T, MergeError>
where
    T: PartialEq + fmt::Debug,
{
    if left == right {
        Ok(left)
    } else {
        Err(MergeError::Conflict {
            entity_type: entity_type.to_string(),
            attribute: attribute.to_string(),
            left: format!("{:?}", left),
            right: format!("{:?}", right),
        })
    }
}

/// A typed node in the graph being imported.
///
/// `(node_type, node_id)` is the identity: two nodes with an equal pair
/// denote the same logical entity and must be merge-compatible. The id
/// only needs to be unique within its node type.
pub trait GraphNode {
    /// Label fixed per concrete node kind (e.g. "Paper")
    fn node_type(&self) -> &str;

    /// Identity within the node type
    fn node_id(&self) -> &str;

    /// Combine with another record of the same identity
    fn merge(&self, other: &Self) -> Result<Self, MergeError>
    where
        Self: Sized;

    /// One output row, one cell per column of the type's header
    fn to_row(&self) -> Vec<CellValue>;

    /// Attributes that must be present and non-empty after merging
    fn required_attributes(&self) -> &'static [&'static str] {
        &[]
    }

    /// Look up an attribute by name, for validation
    fn attribute(&self, _name: &str) -> Option<CellValue> {
        None
    }
}

/// Identity of a relationship.
///
/// At most one relationship instance exists per distinct `RelId` within a
/// run; duplicates collapse via merge. Field order gives the natural sort
/// order used by deterministic mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RelId {
    pub source_type: String,
    pub source_id: String,
    pub rel_type: String,
    pub dest_type: String,
    pub dest_id: String,
}

impl fmt::Display for RelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}:{})-[{}]->({}:{})",
            self.source_type, self.source_id, self.rel_type, self.dest_type, self.dest_id
        )
    }
}

/// A typed directed edge.
///
/// `to_row()` must lead with the identity columns `(source_id, dest_id,
/// rel_type)`; relationship kinds with extra attributes append them after.
pub trait GraphRelationship {
    fn rel_id(&self) -> &RelId;

    /// Combine with another record of the same identity
    fn merge(&self, other: &Self) -> Result<Self, MergeError>
    where
        Self: Sized;

    fn to_row(&self) -> Vec<CellValue>;
}

/// A relationship whose entire payload is its identity tuple.
///
/// Use this for relationships that carry no attributes beyond their type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleRelationship {
    id: RelId,
}

impl SimpleRelationship {
    pub fn new(
        source_type: impl Into<String>,
        source_id: impl Into<String>,
        rel_type: impl Into<String>,
        dest_type: impl Into<String>,
        dest_id: impl Into<String>,
    ) -> Self {
        Self {
            id: RelId {
                source_type: source_type.into(),
                source_id: source_id.into(),
                rel_type: rel_type.into(),
                dest_type: dest_type.into(),
                dest_id: dest_id.into(),
            },
        }
    }

    /// Default header for attribute-free relationships, usable from
    /// [`GraphMapper::relationship_header`].
    pub fn header_row(_rel_type: &str, source_type: &str, dest_type: &str) -> Vec<String> {
        vec![
            format!(":START_ID({})", source_type),
            format!(":END_ID({})", dest_type),
            ":TYPE".to_string(),
        ]
    }
}

impl GraphRelationship for SimpleRelationship {
    fn rel_id(&self) -> &RelId {
        &self.id
    }

    fn merge(&self, other: &Self) -> Result<Self, MergeError> {
        if self.id != other.id {
            return Err(MergeError::IdentityMismatch {
                entity_type: "SimpleRelationship".to_string(),
                left: self.id.to_string(),
                right: other.id.to_string(),
            });
        }
        Ok(self.clone())
    }

    fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::Id(self.id.source_id.clone()),
            CellValue::Id(self.id.dest_id.clone()),
            CellValue::Str(self.id.rel_type.clone()),
        ]
    }
}

/// Domain-specific collaborator supplying the map step and output headers.
///
/// One implementation per input domain, threaded through the merge engine
/// and the partitioned writer. Configuration belongs in fields on the
/// implementing struct, never in global state.
pub trait GraphMapper {
    /// One unit of raw input (a parsed line, a parsed sub-graph, ...)
    type Record;
    type Node: GraphNode;
    type Rel: GraphRelationship;

    /// Convert one raw record into candidate nodes and relationships
    fn map_record(&self, record: Self::Record) -> ImportResult<(Vec<Self::Node>, Vec<Self::Rel>)>;

    /// Header row for the given node type's output file
    fn node_header(&self, node_type: &str) -> Vec<String>;

    /// Header row for the given relationship type-triple's output file
    fn relationship_header(
        &self,
        rel_type: &str,
        source_type: &str,
        dest_type: &str,
    ) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_attribute_equal_keeps_either() {
        let merged = merge_attribute("Thing", "x", Some(5), Some(5)).unwrap();
        assert_eq!(merged, Some(5));
    }

    #[test]
    fn test_merge_attribute_one_absent_keeps_present() {
        assert_eq!(merge_attribute("Thing", "x", Some(5), None).unwrap(), Some(5));
        assert_eq!(merge_attribute("Thing", "x", None, Some(7)).unwrap(), Some(7));
        assert_eq!(merge_attribute::<i64>("Thing", "x", None, None).unwrap(), None);
    }

    #[test]
    fn test_merge_attribute_conflict_names_attribute() {
        let err = merge_attribute("Thing", "x", Some(5), Some(7)).unwrap_err();
        match err {
            MergeError::Conflict {
                entity_type,
                attribute,
                left,
                right,
            } => {
                assert_eq!(entity_type, "Thing");
                assert_eq!(attribute, "x");
                assert_eq!(left, "5");
                assert_eq!(right, "7");
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_equal_rejects_disagreement() {
        assert_eq!(merge_equal("Thing", "x", "a", "a").unwrap(), "a");
        assert!(merge_equal("Thing", "x", "a", "b").is_err());
    }

    #[test]
    fn test_simple_relationship_merge_is_idempotent() {
        let rel = SimpleRelationship::new("Node", "n1", "knows", "Node", "n2");
        let merged = rel.merge(&rel.clone()).unwrap();
        assert_eq!(merged, rel);
    }

    #[test]
    fn test_simple_relationship_merge_rejects_different_identity() {
        let a = SimpleRelationship::new("Node", "n1", "knows", "Node", "n2");
        let b = SimpleRelationship::new("Node", "n2", "knows", "Node", "n1");
        assert!(matches!(
            a.merge(&b),
            Err(MergeError::IdentityMismatch { .. })
        ));
    }

    #[test]
    fn test_simple_relationship_row_is_identity_triple() {
        let rel = SimpleRelationship::new("Node", "n1", "knows", "Node", "n2");
        assert_eq!(
            rel.to_row(),
            vec![
                CellValue::Id("n1".to_string()),
                CellValue::Id("n2".to_string()),
                CellValue::Str("knows".to_string()),
            ]
        );
    }

    #[test]
    fn test_rel_id_orders_by_tuple_fields() {
        let a = SimpleRelationship::new("A", "1", "r", "B", "2");
        let b = SimpleRelationship::new("A", "2", "r", "B", "1");
        assert!(a.rel_id() < b.rel_id());
    }

    #[test]
    fn test_simple_header_row() {
        assert_eq!(
            SimpleRelationship::header_row("knows", "Person", "Person"),
            vec![":START_ID(Person)", ":END_ID(Person)", ":TYPE"]
        );
    }
}
