//! Graphload: Map-Reduce Builder for Graph Bulk-Import Files
//!
//! A single-pass, in-memory batch engine that turns loosely structured
//! graph-description inputs into deduplicated, type-partitioned CSV files
//! suitable for a graph database's bulk import tool.
//!
//! # Core Concepts
//!
//! - **Entity model**: domain nodes and relationships with a key-based
//!   identity and merge contract ([`GraphNode`], [`GraphRelationship`])
//! - **Merge engine**: deduplicates records sharing an identity, failing
//!   fast on irreconcilable attribute conflicts ([`map_reduce`])
//! - **Partitioned writer**: one header-led CSV stream per node type or
//!   relationship type-triple ([`write_nodes`], [`write_relationships`])
//!
//! # Example
//!
//! ```no_run
//! use graphload::{run_import, ImportConfig};
//! use graphload::reader::edgelist::{EdgeListMapper, EdgeListReader};
//!
//! let reader = EdgeListReader::open("edges.txt")?;
//! let summary = run_import(&EdgeListMapper, reader, &ImportConfig::default())?;
//! println!("{} records in", summary.stats.records);
//! # Ok::<(), graphload::ImportError>(())
//! ```

pub mod engine;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reader;
pub mod writer;

pub use engine::{map_reduce, validate::validate_nodes, MergeStats};
pub use error::{ImportError, ImportResult};
pub use model::{
    merge_attribute, merge_equal, CellValue, GraphMapper, GraphNode, GraphRelationship,
    MergeError, RelId, SimpleRelationship, ValidationError,
};
pub use pipeline::{run_import, ImportConfig, ImportSummary};
pub use writer::{
    write_nodes, write_relationships, PartitionReport, EDGE_LABEL_PLACEHOLDER,
    NODE_LABEL_PLACEHOLDER,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
