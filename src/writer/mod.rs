//! Partitioned CSV writer
//!
//! Groups merged entities by type (nodes) or type-triple (relationships),
//! lazily opens one output stream per partition on first encounter, writes
//! a header row from the domain's [`GraphMapper`], then appends sanitized
//! data rows. Every opened stream is flushed and closed exactly once, on
//! every exit path.

use crate::error::{ImportError, ImportResult};
use crate::model::sanitize::{clean_id, clean_text};
use crate::model::{CellValue, GraphMapper, GraphNode, GraphRelationship};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::hash::Hash;
use std::path::PathBuf;
use tracing::info;

/// Substring of a node path template replaced by the node type label
pub const NODE_LABEL_PLACEHOLDER: &str = "NODE_LABEL";

/// Substring of a relationship path template replaced by the composite
/// `{rel_type}_{source_type}_to_{dest_type}` label
pub const EDGE_LABEL_PLACEHOLDER: &str = "EDGE_LABEL";

/// Where one partition was written and how many data rows it holds
/// (the header row is not counted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionReport {
    pub path: PathBuf,
    pub rows: usize,
}

/// One open output stream
struct OutputPartition {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl OutputPartition {
    fn create(path: PathBuf, header: &[String]) -> ImportResult<Self> {
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(header)?;
        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    fn write_row(&mut self, row: &[CellValue]) -> ImportResult<()> {
        let rendered: Vec<String> = row.iter().map(render_cell).collect();
        self.writer.write_record(&rendered)?;
        self.rows += 1;
        Ok(())
    }

    fn finish(mut self) -> ImportResult<PartitionReport> {
        self.writer.flush()?;
        info!(path = %self.path.display(), rows = self.rows, "wrote partition");
        Ok(PartitionReport {
            path: self.path,
            rows: self.rows,
        })
    }
}

/// Render one cell as output text.
///
/// Booleans render as the literal words `true`/`false`; list cells clean
/// each element, then join with `;`; identifier cells go through the
/// stricter whitespace-removing cleanup.
fn render_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::Id(s) => clean_id(s),
        CellValue::Str(s) => clean_text(s),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) => f.to_string(),
        CellValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        CellValue::StrList(items) => items
            .iter()
            .map(|item| clean_text(item))
            .collect::<Vec<_>>()
            .join(";"),
    }
}

/// Write one CSV file per node type.
///
/// `template` must contain [`NODE_LABEL_PLACEHOLDER`]; each node type's
/// file is created on first encounter with the mapper's header row. Types
/// with no nodes simply never open a stream.
pub fn write_nodes<M: GraphMapper>(
    mapper: &M,
    nodes: &[M::Node],
    template: &str,
) -> ImportResult<Vec<PartitionReport>> {
    if !template.contains(NODE_LABEL_PLACEHOLDER) {
        return Err(ImportError::Config(format!(
            "node file template '{}' does not contain {}",
            template, NODE_LABEL_PLACEHOLDER
        )));
    }
    let mut partitions: HashMap<String, OutputPartition> = HashMap::new();
    let outcome = write_node_rows(mapper, nodes, template, &mut partitions);
    finish_all(partitions, outcome)
}

fn write_node_rows<M: GraphMapper>(
    mapper: &M,
    nodes: &[M::Node],
    template: &str,
    partitions: &mut HashMap<String, OutputPartition>,
) -> ImportResult<()> {
    for node in nodes {
        let node_type = node.node_type();
        let partition = match partitions.entry(node_type.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = PathBuf::from(template.replace(NODE_LABEL_PLACEHOLDER, node_type));
                entry.insert(OutputPartition::create(
                    path,
                    &mapper.node_header(node_type),
                )?)
            }
        };
        partition.write_row(&node.to_row())?;
    }
    Ok(())
}

/// Write one CSV file per `(rel_type, source_type, dest_type)` triple.
///
/// `template` must contain [`EDGE_LABEL_PLACEHOLDER`], which is replaced
/// with `{rel_type}_{source_type}_to_{dest_type}`.
pub fn write_relationships<M: GraphMapper>(
    mapper: &M,
    relationships: &[M::Rel],
    template: &str,
) -> ImportResult<Vec<PartitionReport>> {
    if !template.contains(EDGE_LABEL_PLACEHOLDER) {
        return Err(ImportError::Config(format!(
            "relationship file template '{}' does not contain {}",
            template, EDGE_LABEL_PLACEHOLDER
        )));
    }
    let mut partitions: HashMap<(String, String, String), OutputPartition> = HashMap::new();
    let outcome = write_relationship_rows(mapper, relationships, template, &mut partitions);
    finish_all(partitions, outcome)
}

fn write_relationship_rows<M: GraphMapper>(
    mapper: &M,
    relationships: &[M::Rel],
    template: &str,
    partitions: &mut HashMap<(String, String, String), OutputPartition>,
) -> ImportResult<()> {
    for rel in relationships {
        let id = rel.rel_id();
        let key = (
            id.rel_type.clone(),
            id.source_type.clone(),
            id.dest_type.clone(),
        );
        let partition = match partitions.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let label = format!("{}_{}_to_{}", id.rel_type, id.source_type, id.dest_type);
                let path = PathBuf::from(template.replace(EDGE_LABEL_PLACEHOLDER, &label));
                let header =
                    mapper.relationship_header(&id.rel_type, &id.source_type, &id.dest_type);
                entry.insert(OutputPartition::create(path, &header)?)
            }
        };
        partition.write_row(&rel.to_row())?;
    }
    Ok(())
}

/// Flush and close every opened partition, regardless of how the write
/// loop ended, then surface the write error (if any) first.
fn finish_all<K: Eq + Hash>(
    partitions: HashMap<K, OutputPartition>,
    outcome: ImportResult<()>,
) -> ImportResult<Vec<PartitionReport>> {
    let mut reports = Vec::with_capacity(partitions.len());
    let mut close_error: Option<ImportError> = None;
    for (_, partition) in partitions {
        match partition.finish() {
            Ok(report) => reports.push(report),
            Err(e) => close_error = close_error.or(Some(e)),
        }
    }
    outcome?;
    if let Some(e) = close_error {
        return Err(e);
    }
    reports.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(reports)
}
