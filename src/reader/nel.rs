//! NEL (node-edge-label) front-end
//!
//! Parses multi-graph NEL files of the kind published in the SNAP DBLP
//! dataset: blocks of `n <local> <global>`, `e <src> <dest> <label>`,
//! `g <name> <id>`, and `x <target>` lines separated by blank lines, one
//! block per sub-graph. Vertices with a numeric global name become
//! `Paper` nodes, the rest become `Keyword` nodes.
//!
//! Whether vertex ids are global or local to their sub-graph is a field
//! on [`NelMapper`], not ambient state.

use crate::error::{ImportError, ImportResult};
use crate::model::{
    merge_equal, CellValue, GraphMapper, GraphNode, MergeError, SimpleRelationship,
};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// One vertex of a NEL sub-graph, keyed by its numeric global name kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NelVertex {
    Paper(i64),
    Keyword(String),
}

/// One labelled edge between local vertex names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NelEdge {
    pub source: u64,
    pub dest: u64,
    pub label: String,
}

/// One parsed sub-graph; the raw record unit of this front-end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NelGraph {
    pub graph_id: i64,
    pub vertices: BTreeMap<u64, NelVertex>,
    pub edges: Vec<NelEdge>,
}

#[derive(Default)]
struct PendingGraph {
    graph_id: Option<i64>,
    vertices: BTreeMap<u64, NelVertex>,
    edges: Vec<NelEdge>,
}

impl PendingGraph {
    fn finish(self) -> Option<NelGraph> {
        self.graph_id.map(|graph_id| NelGraph {
            graph_id,
            vertices: self.vertices,
            edges: self.edges,
        })
    }
}

/// Parse a whole NEL file into its sub-graphs.
pub fn read_nel(path: impl AsRef<Path>) -> ImportResult<Vec<NelGraph>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let display = path.display().to_string();

    let mut graphs = Vec::new();
    let mut pending = PendingGraph::default();
    let mut lineno = 0usize;

    for line in BufReader::new(file).lines() {
        let line = line?;
        lineno += 1;
        let location = || format!("{}:{}", display, lineno);

        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            if let Some(graph) = std::mem::take(&mut pending).finish() {
                graphs.push(graph);
            }
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        match fields[0] {
            "n" => {
                if fields.len() != 3 {
                    return Err(ImportError::input_format(
                        location(),
                        "expected 'n <local> <global>'",
                    ));
                }
                let local = parse_num::<u64>(fields[1], "vertex name", &location)?;
                let vertex = match fields[2].parse::<i64>() {
                    Ok(paper_no) => NelVertex::Paper(paper_no),
                    Err(_) => NelVertex::Keyword(fields[2].to_string()),
                };
                pending.vertices.insert(local, vertex);
            }
            "e" => {
                if fields.len() != 4 {
                    return Err(ImportError::input_format(
                        location(),
                        "expected 'e <src> <dest> <label>'",
                    ));
                }
                pending.edges.push(NelEdge {
                    source: parse_num::<u64>(fields[1], "edge source", &location)?,
                    dest: parse_num::<u64>(fields[2], "edge dest", &location)?,
                    label: fields[3].to_string(),
                });
            }
            "g" => {
                if fields.len() != 3 {
                    return Err(ImportError::input_format(
                        location(),
                        "expected 'g <name> <id>'",
                    ));
                }
                pending.graph_id = Some(parse_num::<i64>(fields[2], "graph id", &location)?);
            }
            // Regression target value, irrelevant to the import
            "x" => {}
            other => warn!(line = lineno, tag = other, "skipping unknown NEL line"),
        }
    }

    // A file need not end with a blank line
    if let Some(graph) = pending.finish() {
        graphs.push(graph);
    }
    Ok(graphs)
}

fn parse_num<T: std::str::FromStr>(
    field: &str,
    what: &str,
    location: &dyn Fn() -> String,
) -> ImportResult<T> {
    field.parse::<T>().map_err(|_| {
        ImportError::input_format(location(), format!("invalid {}: '{}'", what, field))
    })
}

/// Node kinds of the DBLP domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DblpNode {
    Paper { id: String, paper_no: i64 },
    Keyword { id: String, word: String },
}

impl GraphNode for DblpNode {
    fn node_type(&self) -> &str {
        match self {
            DblpNode::Paper { .. } => "Paper",
            DblpNode::Keyword { .. } => "Keyword",
        }
    }

    fn node_id(&self) -> &str {
        match self {
            DblpNode::Paper { id, .. } | DblpNode::Keyword { id, .. } => id,
        }
    }

    fn merge(&self, other: &Self) -> Result<Self, MergeError> {
        match (self, other) {
            (
                DblpNode::Paper { id, paper_no },
                DblpNode::Paper {
                    paper_no: other_no, ..
                },
            ) => Ok(DblpNode::Paper {
                id: id.clone(),
                paper_no: merge_equal("Paper", "paper_no", *paper_no, *other_no)?,
            }),
            (
                DblpNode::Keyword { id, word },
                DblpNode::Keyword {
                    word: other_word, ..
                },
            ) => Ok(DblpNode::Keyword {
                id: id.clone(),
                word: merge_equal("Keyword", "word", word.clone(), other_word.clone())?,
            }),
            _ => Err(MergeError::IdentityMismatch {
                entity_type: self.node_type().to_string(),
                left: self.node_id().to_string(),
                right: other.node_id().to_string(),
            }),
        }
    }

    fn to_row(&self) -> Vec<CellValue> {
        match self {
            DblpNode::Paper { id, paper_no } => vec![
                CellValue::Id(id.clone()),
                CellValue::Int(*paper_no),
                CellValue::Str("Paper".to_string()),
            ],
            DblpNode::Keyword { id, word } => vec![
                CellValue::Id(id.clone()),
                CellValue::Str(word.clone()),
                CellValue::Str("Keyword".to_string()),
            ],
        }
    }

    fn required_attributes(&self) -> &'static [&'static str] {
        match self {
            DblpNode::Paper { .. } => &["paper_no"],
            DblpNode::Keyword { .. } => &["word"],
        }
    }

    fn attribute(&self, name: &str) -> Option<CellValue> {
        match (self, name) {
            (DblpNode::Paper { paper_no, .. }, "paper_no") => Some(CellValue::Int(*paper_no)),
            (DblpNode::Keyword { word, .. }, "word") => Some(CellValue::Str(word.clone())),
            _ => None,
        }
    }
}

/// Mapper for NEL sub-graphs.
#[derive(Debug, Clone, Default)]
pub struct NelMapper {
    /// Treat vertex ids as local to their sub-graph, prefixing them with
    /// the graph id. Defaults to global ids.
    pub local_ids: bool,
}

impl NelMapper {
    fn vertex_id(&self, graph: &NelGraph, local: u64, vertex: &NelVertex) -> String {
        if self.local_ids {
            format!("{}-{}", graph.graph_id, local)
        } else {
            match vertex {
                NelVertex::Paper(paper_no) => paper_no.to_string(),
                NelVertex::Keyword(word) => word.clone(),
            }
        }
    }
}

impl GraphMapper for NelMapper {
    type Record = NelGraph;
    type Node = DblpNode;
    type Rel = SimpleRelationship;

    fn map_record(
        &self,
        graph: NelGraph,
    ) -> ImportResult<(Vec<DblpNode>, Vec<SimpleRelationship>)> {
        let mut nodes = Vec::with_capacity(graph.vertices.len());
        let mut endpoints: HashMap<u64, (String, String)> = HashMap::new();

        for (&local, vertex) in &graph.vertices {
            let id = self.vertex_id(&graph, local, vertex);
            let node = match vertex {
                NelVertex::Paper(paper_no) => DblpNode::Paper {
                    id,
                    paper_no: *paper_no,
                },
                NelVertex::Keyword(word) => DblpNode::Keyword {
                    id,
                    word: word.clone(),
                },
            };
            endpoints.insert(local, (node.node_type().to_string(), node.node_id().to_string()));
            nodes.push(node);
        }

        let mut rels = Vec::with_capacity(graph.edges.len());
        for edge in &graph.edges {
            let unknown = |name: u64| {
                ImportError::input_format(
                    format!("graph {}", graph.graph_id),
                    format!("edge references unknown vertex {}", name),
                )
            };
            let (source_type, source_id) =
                endpoints.get(&edge.source).ok_or_else(|| unknown(edge.source))?;
            let (dest_type, dest_id) =
                endpoints.get(&edge.dest).ok_or_else(|| unknown(edge.dest))?;
            rels.push(SimpleRelationship::new(
                source_type.as_str(),
                source_id.as_str(),
                edge.label.as_str(),
                dest_type.as_str(),
                dest_id.as_str(),
            ));
        }

        Ok((nodes, rels))
    }

    fn node_header(&self, node_type: &str) -> Vec<String> {
        if node_type == "Paper" {
            vec![
                "node_id:ID(Paper)".to_string(),
                "paper_no:int".to_string(),
                ":LABEL".to_string(),
            ]
        } else {
            vec![
                "node_id:ID(Keyword)".to_string(),
                "word".to_string(),
                ":LABEL".to_string(),
            ]
        }
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
