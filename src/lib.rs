//! ViewGraph - Graph DDL resolution over tabular views
//!
//! This crate turns a graph definition tree into validated artifacts through:
//! - Label registries with global and schema-local scope
//! - Graph types with merged property signatures, keys and expanded patterns
//! - Node and edge to view mappings with canonical join orientation
//! - A resolver that assembles every named graph type and graph

pub mod config;
pub mod graph_ddl;

pub use graph_ddl::{resolve, GraphDdlError, GraphDdlResolver, ResolvedGraph, ResolvedModel};
