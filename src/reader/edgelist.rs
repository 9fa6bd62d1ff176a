//! Simple edge-list front-end
//!
//! One edge per line, whitespace-separated: `source dest label`. Lines
//! starting with `#` are comments. Every edge implies its two endpoint
//! nodes, which all share the single node type `Node`.

use crate::error::{ImportError, ImportResult};
use crate::model::{CellValue, GraphMapper, GraphNode, MergeError, SimpleRelationship};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

/// One parsed edge-list line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord {
    pub source: String,
    pub dest: String,
    pub label: String,
}

/// Streaming reader over an edge-list file
pub struct EdgeListReader {
    lines: Lines<BufReader<File>>,
    path: String,
    lineno: usize,
}

impl EdgeListReader {
    pub fn open(path: impl AsRef<Path>) -> ImportResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            path: path.display().to_string(),
            lineno: 0,
        })
    }
}

impl Iterator for EdgeListReader {
    type Item = ImportResult<EdgeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(ImportError::Io(e))),
            };
            self.lineno += 1;
            if line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 3 {
                return Some(Err(ImportError::input_format(
                    format!("{}:{}", self.path, self.lineno),
                    "expected 'source dest label'",
                )));
            }
            return Some(Ok(EdgeRecord {
                source: fields[0].to_string(),
                dest: fields[1].to_string(),
                label: fields[2].to_string(),
            }));
        }
    }
}

/// The single node kind of the edge-list domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedNode {
    pub name: String,
}

impl GraphNode for NamedNode {
    fn node_type(&self) -> &str {
        "Node"
    }

    fn node_id(&self) -> &str {
        &self.name
    }

    fn merge(&self, other: &Self) -> Result<Self, MergeError> {
        if self.name != other.name {
            return Err(MergeError::IdentityMismatch {
                entity_type: "Node".to_string(),
                left: self.name.clone(),
                right: other.name.clone(),
            });
        }
        Ok(self.clone())
    }

    fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::Id(self.name.clone()),
            CellValue::Str("Node".to_string()),
        ]
    }
}

/// Mapper for edge-list records
pub struct EdgeListMapper;

impl GraphMapper for EdgeListMapper {
    type Record = EdgeRecord;
    type Node = NamedNode;
    type Rel = SimpleRelationship;

    fn map_record(
        &self,
        record: EdgeRecord,
    ) -> ImportResult<(Vec<NamedNode>, Vec<SimpleRelationship>)> {
        Ok((
            vec![
                NamedNode {
                    name: record.source.clone(),
                },
                NamedNode {
                    name: record.dest.clone(),
                },
            ],
            vec![SimpleRelationship::new(
                "Node",
                record.source,
                record.label,
                "Node",
                record.dest,
            )],
        ))
    }

    fn node_header(&self, _node_type: &str) -> Vec<String> {
        vec!["name:ID(Node)".to_string(), ":LABEL".to_string()]
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GraphRelationship;
    use std::io::Write;

    fn write_input(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_reads_edges_and_skips_comments() {
        let file = write_input("# a comment\nn1 n2 knows\nn2 n3 likes\n");
        let records: Vec<EdgeRecord> = EdgeListReader::open(file.path())
            .unwrap()
            .collect::<ImportResult<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, "n1");
        assert_eq!(records[0].dest, "n2");
        assert_eq!(records[0].label, "knows");
    }

    #[test]
    fn test_wrong_field_count_reports_line() {
        let file = write_input("n1 n2 knows\nn1 n2\n");
        let results: Vec<ImportResult<EdgeRecord>> =
            EdgeListReader::open(file.path()).unwrap().collect();
        assert!(results[0].is_ok());
        match &results[1] {
            Err(ImportError::InputFormat { location, .. }) => {
                assert!(location.ends_with(":2"), "location was {}", location);
            }
            other => panic!("expected input format error, got {:?}", other),
        }
    }

    #[test]
    fn test_map_record_yields_endpoints_and_edge() {
        let (nodes, rels) = EdgeListMapper
            .map_record(EdgeRecord {
                source: "n1".to_string(),
                dest: "n2".to_string(),
                label: "knows".to_string(),
            })
            .unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].rel_id().rel_type, "knows");
    }
}
