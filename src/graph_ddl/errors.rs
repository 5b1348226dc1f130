//! # Graph DDL Error Types
//!
//! Every failure of the resolution pass is terminal and carries the offending
//! identifier plus the identifiers that would have been valid at that point, so
//! a definition can be fixed without re-running with extra diagnostics.
//!
//! ## Error Categories
//!
//! - **Reference Errors**: undefined labels, schemas, graphs, node or
//!   relationship types, and join aliases
//! - **Consistency Errors**: property type conflicts, invalid keys, duplicate
//!   definitions, duplicate view mappings and mappings without views
//! - **Input Errors**: reading or deserializing a definition tree

use std::fmt;
use thiserror::Error;

use super::ast::LabelCombination;
use super::property_types::PropertyType;

pub type Result<T> = std::result::Result<T, GraphDdlError>;

/// Which kind of named declaration was duplicated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    ElementType,
    GraphType,
    Graph,
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::ElementType => f.write_str("element type"),
            DefinitionKind::GraphType => f.write_str("graph type"),
            DefinitionKind::Graph => f.write_str("graph"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphDdlError {
    #[error("Undefined label `{name}`. Known labels: [{}]", list(.known))]
    UndefinedLabel { name: String, known: Vec<String> },

    #[error(
        "Property `{property}` of node type {combination} has conflicting types {first} and {second}"
    )]
    PropertyTypeConflict {
        combination: LabelCombination,
        property: String,
        first: PropertyType,
        second: PropertyType,
    },

    #[error("Unresolved alias `{alias}` in join predicate. Expected one of: [{}]", list(.expected))]
    UnresolvedAlias { alias: String, expected: Vec<String> },

    #[error("Join predicate `{predicate}` must reference node alias `{node_alias}` on one side and edge alias `{edge_alias}` on the other")]
    MalformedJoin {
        predicate: String,
        node_alias: String,
        edge_alias: String,
    },

    #[error("Undefined graph type `{name}`. Known graph types: [{}]", list(.known))]
    UndefinedSchemaReference { name: String, known: Vec<String> },

    #[error("Undefined graph `{name}`. Known graphs: [{}]", list(.known))]
    UndefinedGraph { name: String, known: Vec<String> },

    #[error("Node type {combination} is not part of the graph type. Known node types: [{}]", list(.known))]
    UndefinedNodeType {
        combination: LabelCombination,
        known: Vec<String>,
    },

    #[error("Relationship type `{name}` is not part of the graph type. Known relationship types: [{}]", list(.known))]
    UndefinedRelationshipType { name: String, known: Vec<String> },

    #[error("Duplicate {kind} definition `{name}`")]
    DuplicateDefinition { kind: DefinitionKind, name: String },

    #[error("Duplicate view mapping {key} in graph `{graph}`")]
    DuplicateMapping { graph: String, key: String },

    #[error("Mapping for {element} lists no views")]
    EmptyMapping { element: String },

    #[error("Invalid key `{key}` on label `{label}`: {reason}")]
    InvalidKey {
        label: String,
        key: String,
        reason: String,
    },

    #[error("Pattern definition expands to {size} patterns, exceeding the limit of {limit}")]
    PatternExpansionLimit { size: usize, limit: usize },

    #[error("Failed to read definition file: {error}")]
    DefinitionRead { error: String },

    #[error("Failed to parse definition: {error}")]
    DefinitionParse { error: String },
}

fn list(names: &[String]) -> String {
    names.join(", ")
}

impl GraphDdlError {
    /// Build an `UndefinedLabel` error from any iterator of known names
    pub fn undefined_label<'a>(
        name: impl Into<String>,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        GraphDdlError::UndefinedLabel {
            name: name.into(),
            known: sorted(known),
        }
    }

    /// Build an `UndefinedSchemaReference` error from any iterator of known names
    pub fn undefined_schema<'a>(
        name: impl Into<String>,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        GraphDdlError::UndefinedSchemaReference {
            name: name.into(),
            known: sorted(known),
        }
    }
}

fn sorted<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = names.into_iter().map(str::to_string).collect();
    names.sort();
    names.dedup();
    names
}
