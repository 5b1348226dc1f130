pub mod ast;
pub mod errors;
pub mod graph_type;
pub mod label_registry;
pub mod names;
pub mod property_types;
pub mod resolver;
pub mod view_mapping;

// Re-export commonly used types
pub use ast::{
    ColumnIdentifier, DdlDefinition, DdlStatement, GraphDefinition, GraphTypeDefinition,
    JoinPredicate, KeyDefinition, LabelCombination, LabelDefinition, PropertyMapping,
    PropertySignature, SchemaDefinition, SchemaStatement, SetSchemaDefinition, ViewPath,
};
pub use errors::{DefinitionKind, GraphDdlError, Result};
pub use graph_type::{GraphType, GraphTypeBuilder, SchemaPattern};
pub use label_registry::LabelRegistry;
pub use property_types::{BaseType, PropertyType};
pub use resolver::{resolve, GraphDdlResolver, ResolvedGraph, ResolvedModel};
pub use view_mapping::{
    DataSourceDescriptor, EdgeToViewMapping, EdgeViewKey, EndNode, Join, NodeEndpoint,
    NodeToViewMapping, NodeViewKey, StartNode, ViewId, ViewMappingBuilder,
};
