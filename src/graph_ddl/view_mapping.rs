//! # View Mappings
//!
//! Binds node and relationship types of a resolved `GraphType` to tabular
//! views, and records how to rebuild topology from those views through join
//! predicates between an edge view and its start/end node views.
//!
//! Column existence is not checked here; views are opaque until a data-source
//! layer dereferences them.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use log::{debug, warn};

use super::ast::{
    JoinPredicate, LabelCombination, NodeMappingDefinition, NodeViewReference, PropertyMapping,
    PropertySignature, RelationshipMappingDefinition, SetSchemaDefinition, ViewPath,
};
use super::errors::{GraphDdlError, Result};
use super::graph_type::GraphType;
use crate::config::ResolverConfig;

/// Where a view lives, as far as the definition says. Never dereferenced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DataSourceDescriptor {
    pub data_source: Option<String>,
    pub schema: Option<String>,
}

/// A view qualified with the `SET SCHEMA` in effect for its graph.
///
/// - `ds.schema.table` (or longer) keeps its own data source and schema
/// - `schema.table` takes the data source from `SET SCHEMA`
/// - `table` takes both from `SET SCHEMA`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ViewId {
    data_source: Option<String>,
    schema: Option<String>,
    table: String,
}

impl ViewId {
    pub fn resolve(path: &ViewPath, set_schema: Option<&SetSchemaDefinition>) -> ViewId {
        let parts = path.parts();
        let default_ds = set_schema.map(|s| s.data_source.clone());
        match parts {
            [table] => ViewId {
                data_source: default_ds,
                schema: set_schema.map(|s| s.schema.clone()),
                table: table.clone(),
            },
            [schema, table] => ViewId {
                data_source: default_ds,
                schema: Some(schema.clone()),
                table: table.clone(),
            },
            [data_source, schema, rest @ ..] => ViewId {
                data_source: Some(data_source.clone()),
                schema: Some(schema.clone()),
                table: rest.join("."),
            },
            // ViewPath is never empty
            [] => ViewId {
                data_source: default_ds,
                schema: None,
                table: String::new(),
            },
        }
    }

    pub fn data_source(&self) -> DataSourceDescriptor {
        DataSourceDescriptor {
            data_source: self.data_source.clone(),
            schema: self.schema.clone(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ds) = &self.data_source {
            write!(f, "{}.", ds)?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{}.", schema)?;
        }
        f.write_str(&self.table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeViewKey {
    pub labels: LabelCombination,
    pub view: ViewId,
}

impl fmt::Display for NodeViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.labels, self.view)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeViewKey {
    pub rel_type: String,
    pub view: ViewId,
}

impl fmt::Display for EdgeViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] -> {}", self.rel_type, self.view)
    }
}

/// Column equality between a node view and an edge view, always node side first
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Join {
    pub node_column: String,
    pub edge_column: String,
}

impl Join {
    pub fn new(node_column: impl Into<String>, edge_column: impl Into<String>) -> Self {
        Join {
            node_column: node_column.into(),
            edge_column: edge_column.into(),
        }
    }
}

/// One end of an edge view: the node view it points at and how to join it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeEndpoint {
    pub node_view: NodeViewKey,
    pub joins: Vec<Join>,
}

pub type StartNode = NodeEndpoint;
pub type EndNode = NodeEndpoint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeToViewMapping {
    pub labels: LabelCombination,
    pub view: ViewId,
    pub property_mappings: PropertyMapping,
    pub id_column: String,
    pub implied_labels: BTreeSet<String>,
    pub data_source: DataSourceDescriptor,
}

impl NodeToViewMapping {
    pub fn key(&self) -> NodeViewKey {
        NodeViewKey {
            labels: self.labels.clone(),
            view: self.view.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeToViewMapping {
    pub rel_type: String,
    pub view: ViewId,
    pub property_mappings: PropertyMapping,
    pub id_column: String,
    pub start_column: String,
    pub end_column: String,
    pub start_node: StartNode,
    pub end_node: EndNode,
    pub data_source: DataSourceDescriptor,
}

impl EdgeToViewMapping {
    pub fn key(&self) -> EdgeViewKey {
        EdgeViewKey {
            rel_type: self.rel_type.clone(),
            view: self.view.clone(),
        }
    }

    /// The edge type as a singleton label set
    pub fn labels(&self) -> LabelCombination {
        LabelCombination::single(self.rel_type.clone())
    }
}

/// Orient a join predicate so the node-side column comes first.
///
/// Each alias is checked against `{node_alias, edge_alias}` in declaration
/// order. Every alias that matches neither is logged; the first is returned.
pub fn resolve_join(
    node_alias: &str,
    edge_alias: &str,
    predicate: &JoinPredicate,
) -> Result<Join> {
    let unmatched: Vec<&str> = [&predicate.left, &predicate.right]
        .into_iter()
        .map(|column| column.alias())
        .filter(|alias| *alias != node_alias && *alias != edge_alias)
        .collect();
    for alias in &unmatched {
        warn!(
            "Join predicate `{}` references alias `{}`, expected `{}` or `{}`",
            predicate, alias, node_alias, edge_alias
        );
    }
    if let Some(alias) = unmatched.first() {
        return Err(GraphDdlError::UnresolvedAlias {
            alias: alias.to_string(),
            expected: vec![node_alias.to_string(), edge_alias.to_string()],
        });
    }

    let (left, right) = (&predicate.left, &predicate.right);
    if left.alias() == node_alias && right.alias() == edge_alias {
        Ok(Join::new(left.column(), right.column()))
    } else if left.alias() == edge_alias && right.alias() == node_alias {
        Ok(Join::new(right.column(), left.column()))
    } else {
        Err(GraphDdlError::MalformedJoin {
            predicate: predicate.to_string(),
            node_alias: node_alias.to_string(),
            edge_alias: edge_alias.to_string(),
        })
    }
}

/// Builds view mappings for one graph against its resolved graph type
pub struct ViewMappingBuilder<'a> {
    graph_type: &'a GraphType,
    set_schema: Option<&'a SetSchemaDefinition>,
    config: &'a ResolverConfig,
}

impl<'a> ViewMappingBuilder<'a> {
    pub fn new(
        graph_type: &'a GraphType,
        set_schema: Option<&'a SetSchemaDefinition>,
        config: &'a ResolverConfig,
    ) -> Self {
        ViewMappingBuilder {
            graph_type,
            set_schema,
            config,
        }
    }

    pub fn map_nodes(&self, definition: &NodeMappingDefinition) -> Result<Vec<NodeToViewMapping>> {
        let signature = self.graph_type.node_property_keys(&definition.labels)?;
        if definition.views.is_empty() {
            return Err(GraphDdlError::EmptyMapping {
                element: definition.labels.to_string(),
            });
        }

        definition
            .views
            .iter()
            .map(|view_def| {
                let view = ViewId::resolve(&view_def.view, self.set_schema);
                let property_mappings = resolve_properties(
                    &definition.labels.to_string(),
                    signature,
                    view_def.properties.as_ref(),
                );
                debug!("Mapped node type {} to view {}", definition.labels, view);
                Ok(NodeToViewMapping {
                    labels: definition.labels.clone(),
                    data_source: view.data_source(),
                    view,
                    property_mappings,
                    id_column: self.config.id_column.clone(),
                    implied_labels: definition.labels.labels().clone(),
                })
            })
            .collect()
    }

    pub fn map_edges(
        &self,
        definition: &RelationshipMappingDefinition,
    ) -> Result<Vec<EdgeToViewMapping>> {
        let signature = self
            .graph_type
            .relationship_property_keys(&definition.rel_type)?;
        if definition.views.is_empty() {
            return Err(GraphDdlError::EmptyMapping {
                element: format!("[{}]", definition.rel_type),
            });
        }

        definition
            .views
            .iter()
            .map(|view_def| {
                let view = ViewId::resolve(&view_def.view, self.set_schema);
                let edge_alias = view_def.alias();
                let property_mappings = resolve_properties(
                    &definition.rel_type,
                    signature,
                    view_def.properties.as_ref(),
                );
                let start_node = self.resolve_endpoint(&view_def.start_node, edge_alias)?;
                let end_node = self.resolve_endpoint(&view_def.end_node, edge_alias)?;
                debug!(
                    "Mapped relationship type [{}] to view {}",
                    definition.rel_type, view
                );
                Ok(EdgeToViewMapping {
                    rel_type: definition.rel_type.clone(),
                    data_source: view.data_source(),
                    view,
                    property_mappings,
                    id_column: self.config.id_column.clone(),
                    start_column: self.config.start_column.clone(),
                    end_column: self.config.end_column.clone(),
                    start_node,
                    end_node,
                })
            })
            .collect()
    }

    fn resolve_endpoint(
        &self,
        reference: &NodeViewReference,
        edge_alias: &str,
    ) -> Result<NodeEndpoint> {
        // Endpoint node types must exist in the graph type
        self.graph_type.node_property_keys(&reference.labels)?;
        let node_alias = reference.alias();
        let joins = reference
            .join_on
            .iter()
            .map(|predicate| resolve_join(node_alias, edge_alias, predicate))
            .collect::<Result<Vec<_>>>()?;

        Ok(NodeEndpoint {
            node_view: NodeViewKey {
                labels: reference.labels.clone(),
                view: ViewId::resolve(&reference.view, self.set_schema),
            },
            joins,
        })
    }
}

/// Explicit mappings are taken verbatim; otherwise every declared property maps
/// to the column of the same name.
fn resolve_properties(
    element: &str,
    signature: &PropertySignature,
    explicit: Option<&PropertyMapping>,
) -> PropertyMapping {
    match explicit {
        Some(mapping) => {
            for property in mapping.keys().filter(|p| !signature.contains_key(*p)) {
                warn!(
                    "Property mapping for {} names undeclared property `{}`",
                    element, property
                );
            }
            mapping.clone()
        }
        None => signature
            .keys()
            .map(|property| (property.clone(), property.clone()))
            .collect(),
    }
}
