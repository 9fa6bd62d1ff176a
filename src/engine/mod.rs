//! Map-reduce merge engine
//!
//! Consumes a stream of raw records, maps each into candidate nodes and
//! relationships through the domain's [`GraphMapper`], and reduces
//! duplicates by identity key: `(node_type, node_id)` for nodes, [`RelId`]
//! for relationships. First-seen insertion order is preserved; a merge
//! conflict anywhere aborts the whole run.

pub mod validate;

use crate::error::ImportResult;
use crate::model::{GraphMapper, GraphNode, GraphRelationship, RelId};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// Progress log cadence, in records
const PROGRESS_INTERVAL: usize = 10_000;

/// Counters accumulated over one map-reduce pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Raw input records processed
    pub records: usize,
    /// Node merge operations performed
    pub node_merges: usize,
    /// Relationship merge operations performed
    pub relationship_merges: usize,
}

/// Run the map-reduce pass over a record stream.
///
/// `records` yields `Result` items so input front-ends can surface format
/// errors in-stream; the first error aborts. Returns the deduplicated
/// nodes and relationships in first-seen order, plus the run's counters.
pub fn map_reduce<M, I>(
    mapper: &M,
    records: I,
) -> ImportResult<(Vec<M::Node>, Vec<M::Rel>, MergeStats)>
where
    M: GraphMapper,
    I: IntoIterator<Item = ImportResult<M::Record>>,
{
    let mut nodes: Vec<M::Node> = Vec::new();
    let mut node_index: HashMap<(String, String), usize> = HashMap::new();
    let mut relationships: Vec<M::Rel> = Vec::new();
    let mut rel_index: HashMap<RelId, usize> = HashMap::new();
    let mut stats = MergeStats::default();

    for record in records {
        let (new_nodes, new_rels) = mapper.map_record(record?)?;

        for node in new_nodes {
            let key = (node.node_type().to_string(), node.node_id().to_string());
            match node_index.get(&key) {
                Some(&idx) => {
                    // Already accumulated: replace with the merged record
                    let merged = nodes[idx].merge(&node)?;
                    nodes[idx] = merged;
                    stats.node_merges += 1;
                }
                None => {
                    node_index.insert(key, nodes.len());
                    nodes.push(node);
                }
            }
        }

        for rel in new_rels {
            match rel_index.get(rel.rel_id()) {
                Some(&idx) => {
                    let merged = relationships[idx].merge(&rel)?;
                    relationships[idx] = merged;
                    stats.relationship_merges += 1;
                }
                None => {
                    rel_index.insert(rel.rel_id().clone(), relationships.len());
                    relationships.push(rel);
                }
            }
        }

        stats.records += 1;
        if stats.records % PROGRESS_INTERVAL == 0 {
            info!(records = stats.records, "processed inputs");
        }
    }

    info!(
        nodes = nodes.len(),
        relationships = relationships.len(),
        node_merges = stats.node_merges,
        relationship_merges = stats.relationship_merges,
        "map-reduce complete"
    );
    Ok((nodes, relationships, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportError;
    use crate::model::{merge_attribute, CellValue, MergeError, SimpleRelationship};

    /// One node kind with an optional single-valued attribute, enough to
    /// exercise dedupe, attribute merging, and conflicts.
    #[derive(Debug, Clone, PartialEq)]
    struct CountedNode {
        name: String,
        count: Option<i64>,
    }

    impl GraphNode for CountedNode {
        fn node_type(&self) -> &str {
            "Counted"
        }
        fn node_id(&self) -> &str {
            &self.name
        }
        fn merge(&self, other: &Self) -> Result<Self, MergeError> {
            Ok(Self {
                name: self.name.clone(),
                count: merge_attribute(
                    "Counted",
                    "count",
                    self.count,
                    other.count,
                )?,
            })
        }
        fn to_row(&self) -> Vec<CellValue> {
            vec![
                CellValue::Id(self.name.clone()),
                CellValue::Int(self.count.unwrap_or(0)),
            ]
        }
    }

    /// Record: (source, dest, label, source count)
    struct EdgeMapper;

    impl GraphMapper for EdgeMapper {
        type Record = (String, String, String, Option<i64>);
        type Node = CountedNode;
        type Rel = SimpleRelationship;

        fn map_record(
            &self,
            (source, dest, label, count): Self::Record,
        ) -> ImportResult<(Vec<Self::Node>, Vec<Self::Rel>)> {
            Ok((
                vec![
                    CountedNode {
                        name: source.clone(),
                        count,
                    },
                    CountedNode {
                        name: dest.clone(),
                        count: None,
                    },
                ],
                vec![SimpleRelationship::new(
                    "Counted", source, label, "Counted", dest,
                )],
            ))
        }

        fn node_header(&self, _node_type: &str) -> Vec<String> {
            vec!["name:ID(Counted)".to_string(), "count:int".to_string()]
        }

        fn relationship_header(
            &self,
            rel_type: &str,
            source_type: &str,
            dest_type: &str,
        ) -> Vec<String> {
            SimpleRelationship::header_row(rel_type, source_type, dest_type)
        }
    }

    fn record(
        source: &str,
        dest: &str,
        label: &str,
        count: Option<i64>,
    ) -> ImportResult<(String, String, String, Option<i64>)> {
        Ok((
            source.to_string(),
            dest.to_string(),
            label.to_string(),
            count,
        ))
    }

    #[test]
    fn test_two_edges_yield_two_nodes_and_two_relationships() {
        let records = vec![
            record("n1", "n2", "knows", None),
            record("n2", "n1", "knows", None),
        ];
        let (nodes, rels, stats) = map_reduce(&EdgeMapper, records).unwrap();

        // Each edge implies both endpoints, so n1/n2 are each seen twice
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "n1");
        assert_eq!(nodes[1].name, "n2");
        // Distinct RelIds despite the shared label
        assert_eq!(rels.len(), 2);
        assert_eq!(stats.records, 2);
        assert_eq!(stats.node_merges, 2);
        assert_eq!(stats.relationship_merges, 0);
    }

    #[test]
    fn test_distinct_node_count_matches_distinct_identities() {
        let records = vec![
            record("a", "b", "r", None),
            record("a", "c", "r", None),
            record("b", "c", "r", None),
            record("a", "b", "r", None),
        ];
        let (nodes, rels, stats) = map_reduce(&EdgeMapper, records).unwrap();
        assert_eq!(nodes.len(), 3);
        // Duplicate (a, b, r) edge collapses
        assert_eq!(rels.len(), 3);
        assert_eq!(stats.relationship_merges, 1);
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let records = vec![
            record("z", "m", "r", None),
            record("a", "z", "r", None),
        ];
        let (nodes, _, _) = map_reduce(&EdgeMapper, records).unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["z", "m", "a"]);
    }

    #[test]
    fn test_equal_attribute_values_merge() {
        let records = vec![
            record("a", "b", "r", Some(5)),
            record("a", "c", "r", Some(5)),
        ];
        let (nodes, _, _) = map_reduce(&EdgeMapper, records).unwrap();
        assert_eq!(nodes[0].count, Some(5));
    }

    #[test]
    fn test_conflicting_attribute_values_abort() {
        let records = vec![
            record("a", "b", "r", Some(5)),
            record("a", "c", "r", Some(7)),
        ];
        let err = map_reduce(&EdgeMapper, records).unwrap_err();
        match err {
            ImportError::Merge(MergeError::Conflict { attribute, .. }) => {
                assert_eq!(attribute, "count");
            }
            other => panic!("expected merge conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_input_error_propagates() {
        let records = vec![
            record("a", "b", "r", None),
            Err(ImportError::input_format("test:2", "bad line")),
        ];
        assert!(matches!(
            map_reduce(&EdgeMapper, records),
            Err(ImportError::InputFormat { .. })
        ));
    }

    #[test]
    fn test_empty_stream() {
        let (nodes, rels, stats) = map_reduce(&EdgeMapper, Vec::new()).unwrap();
        assert!(nodes.is_empty());
        assert!(rels.is_empty());
        assert_eq!(stats, MergeStats::default());
    }
}
