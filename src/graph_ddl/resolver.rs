//! Resolves a whole definition tree into named graphs.
//!
//! Named graph types are resolved first, then every graph: its inline schema
//! is always resolved, but a graph that references a named graph type uses
//! that type. View mappings are then built against the chosen type.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use log::{debug, info, warn};

use super::ast::{
    DdlDefinition, GraphDefinition, LabelCombination, SchemaDefinition, SetSchemaDefinition,
};
use super::errors::{DefinitionKind, GraphDdlError, Result};
use super::graph_type::{GraphType, GraphTypeBuilder};
use super::label_registry::LabelRegistry;
use super::view_mapping::{
    EdgeToViewMapping, EdgeViewKey, NodeToViewMapping, NodeViewKey, ViewId, ViewMappingBuilder,
};
use crate::config::{DuplicateMappingPolicy, ResolverConfig};

/// A graph with its type and all of its view mappings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedGraph {
    name: String,
    graph_type: GraphType,
    #[serde(serialize_with = "serialize_values")]
    node_to_view_mappings: BTreeMap<NodeViewKey, NodeToViewMapping>,
    #[serde(serialize_with = "serialize_values")]
    edge_to_view_mappings: BTreeMap<EdgeViewKey, EdgeToViewMapping>,
}

impl ResolvedGraph {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph_type(&self) -> &GraphType {
        &self.graph_type
    }

    pub fn node_mappings(&self) -> &BTreeMap<NodeViewKey, NodeToViewMapping> {
        &self.node_to_view_mappings
    }

    pub fn edge_mappings(&self) -> &BTreeMap<EdgeViewKey, EdgeToViewMapping> {
        &self.edge_to_view_mappings
    }

    pub fn node_mapping(
        &self,
        labels: &LabelCombination,
        view: &ViewId,
    ) -> Option<&NodeToViewMapping> {
        self.node_to_view_mappings.get(&NodeViewKey {
            labels: labels.clone(),
            view: view.clone(),
        })
    }

    pub fn edge_mapping(&self, rel_type: &str, view: &ViewId) -> Option<&EdgeToViewMapping> {
        self.edge_to_view_mappings.get(&EdgeViewKey {
            rel_type: rel_type.to_string(),
            view: view.clone(),
        })
    }

    /// Every view a node type is mapped to
    pub fn node_views_for<'s>(
        &'s self,
        labels: &'s LabelCombination,
    ) -> impl Iterator<Item = &'s NodeToViewMapping> + 's {
        self.node_to_view_mappings
            .values()
            .filter(move |mapping| &mapping.labels == labels)
    }
}

/// Output of one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedModel {
    graph_types: BTreeMap<String, GraphType>,
    graphs: BTreeMap<String, ResolvedGraph>,
}

impl ResolvedModel {
    pub fn graph(&self, name: &str) -> Result<&ResolvedGraph> {
        self.graphs
            .get(name)
            .ok_or_else(|| GraphDdlError::UndefinedGraph {
                name: name.to_string(),
                known: self.graphs.keys().cloned().collect(),
            })
    }

    /// A named graph type declared at the top level
    pub fn graph_type(&self, name: &str) -> Result<&GraphType> {
        self.graph_types.get(name).ok_or_else(|| {
            GraphDdlError::undefined_schema(name, self.graph_types.keys().map(String::as_str))
        })
    }

    pub fn graph_names(&self) -> impl Iterator<Item = &String> {
        self.graphs.keys()
    }

    pub fn graphs(&self) -> &BTreeMap<String, ResolvedGraph> {
        &self.graphs
    }

    pub fn into_graphs(self) -> BTreeMap<String, ResolvedGraph> {
        self.graphs
    }
}

/// Resolve a definition tree with the default configuration
pub fn resolve(ddl: &DdlDefinition) -> Result<ResolvedModel> {
    let config = ResolverConfig::default();
    GraphDdlResolver::new(&config).resolve(ddl)
}

pub struct GraphDdlResolver<'c> {
    config: &'c ResolverConfig,
}

impl<'c> GraphDdlResolver<'c> {
    pub fn new(config: &'c ResolverConfig) -> Self {
        GraphDdlResolver { config }
    }

    pub fn resolve(&self, ddl: &DdlDefinition) -> Result<ResolvedModel> {
        let global = LabelRegistry::global(ddl.element_types())?;
        debug!("Registered {} global element types", global.len());

        let mut graph_types = BTreeMap::new();
        for definition in ddl.graph_types() {
            if graph_types.contains_key(&definition.name) {
                return Err(GraphDdlError::DuplicateDefinition {
                    kind: DefinitionKind::GraphType,
                    name: definition.name.clone(),
                });
            }
            let graph_type = self.build_graph_type(&global, &definition.schema)?;
            debug!("Resolved graph type `{}`", definition.name);
            graph_types.insert(definition.name.clone(), graph_type);
        }

        let mut graphs = BTreeMap::new();
        for (definition, set_schema) in ddl.graphs() {
            if graphs.contains_key(&definition.name) {
                return Err(GraphDdlError::DuplicateDefinition {
                    kind: DefinitionKind::Graph,
                    name: definition.name.clone(),
                });
            }
            let graph = self.resolve_graph(&global, &graph_types, definition, set_schema)?;
            info!(
                "Resolved graph `{}`: {} node mappings, {} edge mappings",
                graph.name,
                graph.node_to_view_mappings.len(),
                graph.edge_to_view_mappings.len()
            );
            graphs.insert(definition.name.clone(), graph);
        }

        Ok(ResolvedModel {
            graph_types,
            graphs,
        })
    }

    fn build_graph_type<'a>(
        &self,
        global: &LabelRegistry<'a>,
        schema: &'a SchemaDefinition,
    ) -> Result<GraphType> {
        let registry = global.with_local(&schema.element_types)?;
        GraphTypeBuilder::new(&registry)
            .with_max_pattern_expansion(self.config.max_pattern_expansion)
            .build(schema)
    }

    fn resolve_graph<'a>(
        &self,
        global: &LabelRegistry<'a>,
        graph_types: &BTreeMap<String, GraphType>,
        definition: &'a GraphDefinition,
        set_schema: Option<&SetSchemaDefinition>,
    ) -> Result<ResolvedGraph> {
        let inline = self.build_graph_type(global, &definition.schema)?;
        let graph_type = match &definition.graph_type {
            Some(name) => {
                if !definition.schema.is_empty() {
                    debug!(
                        "Graph `{}` references graph type `{}`; its inline schema is not used",
                        definition.name, name
                    );
                }
                graph_types.get(name).cloned().ok_or_else(|| {
                    GraphDdlError::undefined_schema(
                        name.as_str(),
                        graph_types.keys().map(String::as_str),
                    )
                })?
            }
            None => inline,
        };

        let builder = ViewMappingBuilder::new(&graph_type, set_schema, self.config);
        let policy = self.config.duplicate_mappings;

        let mut node_to_view_mappings = BTreeMap::new();
        for mapping_definition in &definition.node_mappings {
            for mapping in builder.map_nodes(mapping_definition)? {
                insert_mapping(
                    &mut node_to_view_mappings,
                    mapping.key(),
                    mapping,
                    policy,
                    &definition.name,
                )?;
            }
        }

        let mut edge_to_view_mappings = BTreeMap::new();
        for mapping_definition in &definition.relationship_mappings {
            for mapping in builder.map_edges(mapping_definition)? {
                insert_mapping(
                    &mut edge_to_view_mappings,
                    mapping.key(),
                    mapping,
                    policy,
                    &definition.name,
                )?;
            }
        }

        Ok(ResolvedGraph {
            name: definition.name.clone(),
            graph_type,
            node_to_view_mappings,
            edge_to_view_mappings,
        })
    }
}

fn insert_mapping<K, V>(
    mappings: &mut BTreeMap<K, V>,
    key: K,
    value: V,
    policy: DuplicateMappingPolicy,
    graph: &str,
) -> Result<()>
where
    K: Ord + fmt::Display,
{
    if mappings.contains_key(&key) {
        match policy {
            DuplicateMappingPolicy::Fail => {
                return Err(GraphDdlError::DuplicateMapping {
                    graph: graph.to_string(),
                    key: key.to_string(),
                });
            }
            DuplicateMappingPolicy::Overwrite => {
                warn!("Overwriting view mapping {} in graph `{}`", key, graph);
            }
        }
    }
    mappings.insert(key, value);
    Ok(())
}

fn serialize_values<S, K, V>(
    mappings: &BTreeMap<K, V>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    serializer.collect_seq(mappings.values())
}
