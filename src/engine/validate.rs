//! Post-merge validation of required attributes
//!
//! Runs after the merge phase and before any output is written, so merged
//! entities are effectively immutable by the time the writer sees them.

use crate::model::{CellValue, GraphNode, ValidationError};

/// Check every node's required attributes, in current collection order.
///
/// An attribute counts as missing when the node does not report it at all
/// or reports an empty string, empty identifier, or empty list. The first
/// failing node aborts with its id, type, and offending attribute.
pub fn validate_nodes<N: GraphNode>(nodes: &[N]) -> Result<(), ValidationError> {
    for node in nodes {
        for &attribute in node.required_attributes() {
            if !attribute_present(node, attribute) {
                return Err(ValidationError {
                    node_type: node.node_type().to_string(),
                    node_id: node.node_id().to_string(),
                    attribute: attribute.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn attribute_present<N: GraphNode>(node: &N, attribute: &str) -> bool {
    match node.attribute(attribute) {
        None => false,
        Some(CellValue::Str(s)) | Some(CellValue::Id(s)) => !s.is_empty(),
        Some(CellValue::StrList(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MergeError;

    #[derive(Debug, Clone)]
    struct Titled {
        id: String,
        title: Option<String>,
    }

    impl GraphNode for Titled {
        fn node_type(&self) -> &str {
            "Titled"
        }
        fn node_id(&self) -> &str {
            &self.id
        }
        fn merge(&self, _other: &Self) -> Result<Self, MergeError> {
            Ok(self.clone())
        }
        fn to_row(&self) -> Vec<CellValue> {
            vec![CellValue::Id(self.id.clone())]
        }
        fn required_attributes(&self) -> &'static [&'static str] {
            &["title"]
        }
        fn attribute(&self, name: &str) -> Option<CellValue> {
            match name {
                "title" => self.title.clone().map(CellValue::Str),
                _ => None,
            }
        }
    }

    #[test]
    fn test_present_attribute_passes() {
        let nodes = vec![Titled {
            id: "a".to_string(),
            title: Some("A Title".to_string()),
        }];
        assert!(validate_nodes(&nodes).is_ok());
    }

    #[test]
    fn test_absent_attribute_fails_with_context() {
        let nodes = vec![
            Titled {
                id: "a".to_string(),
                title: Some("ok".to_string()),
            },
            Titled {
                id: "b".to_string(),
                title: None,
            },
        ];
        let err = validate_nodes(&nodes).unwrap_err();
        assert_eq!(err.node_type, "Titled");
        assert_eq!(err.node_id, "b");
        assert_eq!(err.attribute, "title");
    }

    #[test]
    fn test_empty_string_counts_as_missing() {
        let nodes = vec![Titled {
            id: "a".to_string(),
            title: Some(String::new()),
        }];
        assert!(validate_nodes(&nodes).is_err());
    }

    #[test]
    fn test_no_required_attributes_always_passes() {
        #[derive(Debug, Clone)]
        struct Bare(String);
        impl GraphNode for Bare {
            fn node_type(&self) -> &str {
                "Bare"
            }
            fn node_id(&self) -> &str {
                &self.0
            }
            fn merge(&self, _other: &Self) -> Result<Self, MergeError> {
                Ok(self.clone())
            }
            fn to_row(&self) -> Vec<CellValue> {
                vec![CellValue::Id(self.0.clone())]
            }
        }
        let nodes = vec![Bare("a".to_string())];
        assert!(validate_nodes(&nodes).is_ok());
    }
}
