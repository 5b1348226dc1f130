//! Integration tests - Resolve complete definition trees through the public API
//!
//! These tests load YAML/JSON definitions the way the CLI does and check the
//! resolved graph types and view mappings together.

mod definition_loading_tests;
mod resolution_error_tests;
mod social_graph_tests;
