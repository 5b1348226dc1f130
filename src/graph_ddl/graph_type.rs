//! # Graph Type
//!
//! The validated schema of one graph: which node label combinations and
//! relationship types exist, their property signatures, their keys, and which
//! `(source)-[type]->(target)` patterns are allowed.
//!
//! ## Resolution
//!
//! 1. Node types are the explicit node declarations plus every combination
//!    named as a pattern source or target.
//! 2. A combination's signature is the union of its labels' signatures. Two
//!    labels declaring the same property must agree on its type.
//! 3. Node keys are attached per label, and only for labels used in an
//!    explicit node declaration.
//! 4. Relationship types are the explicit declarations plus every type named
//!    in a pattern; each resolves to exactly one label definition.
//! 5. Relationship keys are attached only for explicitly declared types.
//! 6. Patterns expand to the cartesian product of their sources, types and
//!    targets.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::{debug, trace};

use super::ast::{
    KeyDefinition, LabelCombination, PropertySignature, SchemaDefinition, SchemaStatement,
};
use super::errors::{GraphDdlError, Result};
use super::label_registry::LabelRegistry;
use super::property_types::PropertyType;

/// Default cap on the number of triples a single pattern definition may expand to
pub const DEFAULT_MAX_PATTERN_EXPANSION: usize = 10_000;

/// One allowed connection: `(source)-[rel_type]->(target)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SchemaPattern {
    pub source: LabelCombination,
    pub rel_type: String,
    pub target: LabelCombination,
}

impl SchemaPattern {
    pub fn new(
        source: LabelCombination,
        rel_type: impl Into<String>,
        target: LabelCombination,
    ) -> Self {
        SchemaPattern {
            source,
            rel_type: rel_type.into(),
            target,
        }
    }
}

impl fmt::Display for SchemaPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-[{}]->{}", self.source, self.rel_type, self.target)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphType {
    node_types: BTreeMap<LabelCombination, PropertySignature>,
    relationship_types: BTreeMap<String, PropertySignature>,
    node_keys: BTreeMap<String, KeyDefinition>,
    relationship_keys: BTreeMap<String, KeyDefinition>,
    patterns: BTreeSet<SchemaPattern>,
}

impl GraphType {
    /// Graph type with no elements
    pub fn empty() -> Self {
        GraphType::default()
    }

    /// Resolve a schema definition against a label registry
    pub fn build(registry: &LabelRegistry<'_>, schema: &SchemaDefinition) -> Result<GraphType> {
        GraphTypeBuilder::new(registry).build(schema)
    }

    pub fn node_types(&self) -> impl Iterator<Item = &LabelCombination> {
        self.node_types.keys()
    }

    pub fn relationship_types(&self) -> impl Iterator<Item = &String> {
        self.relationship_types.keys()
    }

    pub fn node_property_keys(&self, combination: &LabelCombination) -> Result<&PropertySignature> {
        self.node_types
            .get(combination)
            .ok_or_else(|| GraphDdlError::UndefinedNodeType {
                combination: combination.clone(),
                known: self.node_types.keys().map(|c| c.to_string()).collect(),
            })
    }

    pub fn relationship_property_keys(&self, rel_type: &str) -> Result<&PropertySignature> {
        self.relationship_types
            .get(rel_type)
            .ok_or_else(|| GraphDdlError::UndefinedRelationshipType {
                name: rel_type.to_string(),
                known: self.relationship_types.keys().cloned().collect(),
            })
    }

    pub fn contains_node_type(&self, combination: &LabelCombination) -> bool {
        self.node_types.contains_key(combination)
    }

    pub fn contains_relationship_type(&self, rel_type: &str) -> bool {
        self.relationship_types.contains_key(rel_type)
    }

    pub fn node_key(&self, label: &str) -> Option<&KeyDefinition> {
        self.node_keys.get(label)
    }

    pub fn node_keys(&self) -> &BTreeMap<String, KeyDefinition> {
        &self.node_keys
    }

    pub fn relationship_key(&self, rel_type: &str) -> Option<&KeyDefinition> {
        self.relationship_keys.get(rel_type)
    }

    pub fn relationship_keys(&self) -> &BTreeMap<String, KeyDefinition> {
        &self.relationship_keys
    }

    pub fn patterns(&self) -> &BTreeSet<SchemaPattern> {
        &self.patterns
    }

    /// Whether `(source)-[rel_type]->(target)` is an allowed pattern
    pub fn allows(
        &self,
        source: &LabelCombination,
        rel_type: &str,
        target: &LabelCombination,
    ) -> bool {
        self.patterns
            .contains(&SchemaPattern::new(source.clone(), rel_type, target.clone()))
    }
}

/// Resolves `SchemaDefinition`s into `GraphType`s against one label registry
pub struct GraphTypeBuilder<'r, 'a> {
    registry: &'r LabelRegistry<'a>,
    max_pattern_expansion: usize,
}

impl<'r, 'a> GraphTypeBuilder<'r, 'a> {
    pub fn new(registry: &'r LabelRegistry<'a>) -> Self {
        GraphTypeBuilder {
            registry,
            max_pattern_expansion: DEFAULT_MAX_PATTERN_EXPANSION,
        }
    }

    pub fn with_max_pattern_expansion(mut self, limit: usize) -> Self {
        self.max_pattern_expansion = limit;
        self
    }

    pub fn build(&self, schema: &SchemaDefinition) -> Result<GraphType> {
        let mut explicit_nodes = BTreeSet::new();
        let mut explicit_rels = BTreeSet::new();
        let mut node_combinations = BTreeSet::new();
        let mut rel_types = BTreeSet::new();
        let mut patterns = BTreeSet::new();

        for element in &schema.elements {
            match element {
                SchemaStatement::Node(node) => {
                    explicit_nodes.insert(&node.labels);
                    node_combinations.insert(&node.labels);
                }
                SchemaStatement::Relationship(rel) => {
                    explicit_rels.insert(rel.name.as_str());
                    rel_types.insert(rel.name.as_str());
                }
                SchemaStatement::Pattern(pattern) => {
                    let size = pattern.expansion_size();
                    if size > self.max_pattern_expansion {
                        return Err(GraphDdlError::PatternExpansionLimit {
                            size,
                            limit: self.max_pattern_expansion,
                        });
                    }
                    node_combinations.extend(pattern.source.iter());
                    node_combinations.extend(pattern.target.iter());
                    rel_types.extend(pattern.relationships.iter().map(String::as_str));
                    for source in &pattern.source {
                        for rel_type in &pattern.relationships {
                            for target in &pattern.target {
                                patterns.insert(SchemaPattern::new(
                                    source.clone(),
                                    rel_type.clone(),
                                    target.clone(),
                                ));
                            }
                        }
                    }
                }
            }
        }

        let mut node_types = BTreeMap::new();
        for combination in node_combinations {
            let signature = self.merge_signatures(combination)?;
            node_types.insert(combination.clone(), signature);
        }

        let mut node_keys = BTreeMap::new();
        for label in explicit_nodes.iter().flat_map(|c| c.iter()) {
            if let Some(key) = &self.registry.lookup(label)?.key {
                node_keys.insert(label.clone(), key.clone());
            }
        }

        let mut relationship_types = BTreeMap::new();
        for rel_type in rel_types {
            let definition = self.registry.lookup(rel_type)?;
            relationship_types.insert(rel_type.to_string(), definition.properties.clone());
        }

        let mut relationship_keys = BTreeMap::new();
        for rel_type in explicit_rels {
            if let Some(key) = &self.registry.lookup(rel_type)?.key {
                relationship_keys.insert(rel_type.to_string(), key.clone());
            }
        }

        debug!(
            "Resolved graph type: {} node types, {} relationship types, {} patterns",
            node_types.len(),
            relationship_types.len(),
            patterns.len()
        );

        Ok(GraphType {
            node_types,
            relationship_types,
            node_keys,
            relationship_keys,
            patterns,
        })
    }

    /// Union of the signatures of every label in the combination
    fn merge_signatures(&self, combination: &LabelCombination) -> Result<PropertySignature> {
        let mut merged: BTreeMap<String, PropertyType> = BTreeMap::new();
        for label in combination.iter() {
            let definition = self.registry.lookup(label)?;
            for (property, property_type) in &definition.properties {
                match merged.get(property) {
                    Some(existing) if existing != property_type => {
                        return Err(GraphDdlError::PropertyTypeConflict {
                            combination: combination.clone(),
                            property: property.clone(),
                            first: *existing,
                            second: *property_type,
                        });
                    }
                    Some(_) => {
                        trace!("Property `{}` shared by labels of {}", property, combination);
                    }
                    None => {
                        merged.insert(property.clone(), *property_type);
                    }
                }
            }
        }
        Ok(merged)
    }
}
