//! # Graph DDL Definition Tree
//!
//! Plain data produced by a DDL parser (or deserialized from YAML/JSON) and
//! consumed by the resolver. Nothing in this module validates references; that
//! happens during resolution.
//!
//! ```yaml
//! statements:
//!   - statement: set_schema
//!     data_source: warehouse
//!     schema: social
//!   - statement: element_type
//!     name: Person
//!     properties: { name: STRING }
//!     key: { name: person_key, properties: [name] }
//!   - statement: element_type
//!     name: KNOWS
//!     properties: { since: INTEGER }
//!   - statement: graph_type
//!     name: social_type
//!     schema:
//!       elements:
//!         - { kind: node, labels: Person }
//!         - { kind: relationship, name: KNOWS }
//!         - { kind: pattern, source: [Person], relationships: [KNOWS], target: [Person] }
//!   - statement: graph
//!     name: social
//!     graph_type: social_type
//!     node_mappings:
//!       - labels: Person
//!         views: [{ view: people }]
//!     relationship_mappings:
//!       - type: KNOWS
//!         views:
//!           - view: knows
//!             start_node:
//!               labels: Person
//!               view: people
//!               join_on: ["people.id = knows.start_id"]
//!             end_node:
//!               labels: Person
//!               view: people
//!               join_on: ["people.id = knows.end_id"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

use super::errors::GraphDdlError;
use super::names;
use super::property_types::PropertyType;

/// Property name to declared type
pub type PropertySignature = BTreeMap<String, PropertyType>;

/// Property name to view column
pub type PropertyMapping = BTreeMap<String, String>;

// ============================================================================
// Names
// ============================================================================

/// A non-empty set of labels jointly describing one node type.
///
/// Deserializes from `"Person:Employee"` or `[Person, Employee]`; serializes to
/// the compact string so it can key JSON maps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "LabelCombinationRepr", into = "String")]
pub struct LabelCombination(BTreeSet<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelCombinationRepr {
    Compact(String),
    Labels(Vec<String>),
}

impl LabelCombination {
    pub fn new<I, S>(labels: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: BTreeSet<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err("A label combination needs at least one label".to_string());
        }
        if let Some(empty) = labels.iter().find(|l| l.is_empty()) {
            return Err(format!("Invalid empty label '{}' in combination", empty));
        }
        Ok(LabelCombination(labels))
    }

    /// Combination holding exactly one label
    pub fn single(label: impl Into<String>) -> Self {
        LabelCombination(BTreeSet::from([label.into()]))
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::str::FromStr for LabelCombination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LabelCombination::new(names::parse_label_combination(s)?)
    }
}

impl TryFrom<LabelCombinationRepr> for LabelCombination {
    type Error = String;

    fn try_from(value: LabelCombinationRepr) -> Result<Self, Self::Error> {
        match value {
            LabelCombinationRepr::Compact(s) => s.parse(),
            LabelCombinationRepr::Labels(labels) => LabelCombination::new(labels),
        }
    }
}

impl From<LabelCombination> for String {
    fn from(value: LabelCombination) -> Self {
        value
            .0
            .iter()
            .map(|l| names::render_identifier(l))
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl fmt::Display for LabelCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", String::from(self.clone()))
    }
}

/// Dotted view identifier as written, e.g. `warehouse.social.people`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ViewPath(Vec<String>);

impl ViewPath {
    pub fn new<I, S>(parts: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() || parts.iter().any(|p| p.is_empty()) {
            return Err(format!("Invalid view path: {:?}", parts));
        }
        Ok(ViewPath(parts))
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Last path segment, used as the default alias of a view
    pub fn name(&self) -> &str {
        // ViewPath is never empty
        self.0.last().map(String::as_str).unwrap_or_default()
    }
}

impl TryFrom<String> for ViewPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ViewPath::new(names::parse_qualified_name(&value)?)
    }
}

impl From<ViewPath> for String {
    fn from(value: ViewPath) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ViewPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|p| names::render_identifier(p)).collect();
        f.write_str(&rendered.join("."))
    }
}

/// Column qualified by a view alias: `knows.start_id`, `people.address.zip`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnIdentifier {
    alias: String,
    path: Vec<String>,
}

impl ColumnIdentifier {
    pub fn new<S: Into<String>>(alias: impl Into<String>, path: Vec<S>) -> Self {
        ColumnIdentifier {
            alias: alias.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Column path below the alias, nested segments joined with `.`
    pub fn column(&self) -> String {
        self.path.join(".")
    }
}

impl TryFrom<String> for ColumnIdentifier {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (alias, path) = names::parse_column_reference(&value)?;
        Ok(ColumnIdentifier { alias, path })
    }
}

impl From<ColumnIdentifier> for String {
    fn from(value: ColumnIdentifier) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ColumnIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", names::render_identifier(&self.alias))?;
        for part in &self.path {
            write!(f, ".{}", names::render_identifier(part))?;
        }
        Ok(())
    }
}

/// Unordered equality between two qualified columns.
///
/// Deserializes from `"people.id = knows.start_id"` or `[people.id, knows.start_id]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "JoinPredicateRepr", into = "String")]
pub struct JoinPredicate {
    pub left: ColumnIdentifier,
    pub right: ColumnIdentifier,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JoinPredicateRepr {
    Compact(String),
    Pair(ColumnIdentifier, ColumnIdentifier),
}

impl JoinPredicate {
    pub fn new(left: ColumnIdentifier, right: ColumnIdentifier) -> Self {
        JoinPredicate { left, right }
    }
}

impl TryFrom<JoinPredicateRepr> for JoinPredicate {
    type Error = String;

    fn try_from(value: JoinPredicateRepr) -> Result<Self, Self::Error> {
        match value {
            JoinPredicateRepr::Compact(s) => {
                let ((la, lp), (ra, rp)) = names::parse_join_predicate(&s)?;
                Ok(JoinPredicate::new(
                    ColumnIdentifier::new(la, lp),
                    ColumnIdentifier::new(ra, rp),
                ))
            }
            JoinPredicateRepr::Pair(left, right) => Ok(JoinPredicate::new(left, right)),
        }
    }
}

impl From<JoinPredicate> for String {
    fn from(value: JoinPredicate) -> Self {
        value.to_string()
    }
}

impl fmt::Display for JoinPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.left, self.right)
    }
}

// ============================================================================
// Element types and schemas
// ============================================================================

/// Named, ordered set of properties identifying an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDefinition {
    pub name: String,
    pub properties: Vec<String>,
}

/// A label with its property signature and optional key.
///
/// Relationship types are declared the same way; node labels and relationship
/// types share one namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDefinition {
    pub name: String,
    #[serde(default)]
    pub properties: PropertySignature,
    #[serde(default)]
    pub key: Option<KeyDefinition>,
}

impl LabelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        LabelDefinition {
            name: name.into(),
            properties: PropertySignature::new(),
            key: None,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, property_type: PropertyType) -> Self {
        self.properties.insert(name.into(), property_type);
        self
    }

    pub fn with_key<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        properties: Vec<S>,
    ) -> Self {
        self.key = Some(KeyDefinition {
            name: name.into(),
            properties: properties.into_iter().map(Into::into).collect(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTypeDefinition {
    pub labels: LabelCombination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipTypeDefinition {
    pub name: String,
}

/// Every source combination may connect via every listed relationship type to
/// every target combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    pub source: BTreeSet<LabelCombination>,
    pub relationships: BTreeSet<String>,
    pub target: BTreeSet<LabelCombination>,
}

impl PatternDefinition {
    /// Number of triples this definition expands to
    pub fn expansion_size(&self) -> usize {
        self.source
            .len()
            .saturating_mul(self.relationships.len())
            .saturating_mul(self.target.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaStatement {
    Node(NodeTypeDefinition),
    Relationship(RelationshipTypeDefinition),
    Pattern(PatternDefinition),
}

/// Local element types plus node, relationship and pattern declarations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(default)]
    pub element_types: Vec<LabelDefinition>,
    #[serde(default)]
    pub elements: Vec<SchemaStatement>,
}

impl SchemaDefinition {
    pub fn node_types(&self) -> impl Iterator<Item = &LabelCombination> {
        self.elements.iter().filter_map(|e| match e {
            SchemaStatement::Node(node) => Some(&node.labels),
            SchemaStatement::Relationship(_) | SchemaStatement::Pattern(_) => None,
        })
    }

    pub fn relationship_types(&self) -> impl Iterator<Item = &String> {
        self.elements.iter().filter_map(|e| match e {
            SchemaStatement::Relationship(rel) => Some(&rel.name),
            SchemaStatement::Node(_) | SchemaStatement::Pattern(_) => None,
        })
    }

    pub fn patterns(&self) -> impl Iterator<Item = &PatternDefinition> {
        self.elements.iter().filter_map(|e| match e {
            SchemaStatement::Pattern(pattern) => Some(pattern),
            SchemaStatement::Node(_) | SchemaStatement::Relationship(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.element_types.is_empty() && self.elements.is_empty()
    }
}

/// A schema declared under its own name so graphs can reference it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphTypeDefinition {
    pub name: String,
    #[serde(default)]
    pub schema: SchemaDefinition,
}

// ============================================================================
// Graphs and view mappings
// ============================================================================

/// Default data source and schema for the graphs declared after it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetSchemaDefinition {
    pub data_source: String,
    pub schema: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeToViewDefinition {
    pub view: ViewPath,
    #[serde(default)]
    pub properties: Option<PropertyMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMappingDefinition {
    pub labels: LabelCombination,
    pub views: Vec<NodeToViewDefinition>,
}

/// One endpoint of a relationship view: the node view and how to join it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeViewReference {
    pub labels: LabelCombination,
    pub view: ViewPath,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub join_on: Vec<JoinPredicate>,
}

impl NodeViewReference {
    /// Alias used in join predicates, defaulting to the view name
    pub fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.view.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipToViewDefinition {
    pub view: ViewPath,
    #[serde(default)]
    pub alias: Option<String>,
    pub start_node: NodeViewReference,
    pub end_node: NodeViewReference,
    #[serde(default)]
    pub properties: Option<PropertyMapping>,
}

impl RelationshipToViewDefinition {
    /// Alias used in join predicates, defaulting to the view name
    pub fn alias(&self) -> &str {
        self.alias.as_deref().unwrap_or_else(|| self.view.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipMappingDefinition {
    #[serde(rename = "type")]
    pub rel_type: String,
    pub views: Vec<RelationshipToViewDefinition>,
}

/// A named graph: its type (by reference and/or inline) and its view mappings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    pub name: String,
    #[serde(default)]
    pub graph_type: Option<String>,
    #[serde(default)]
    pub schema: SchemaDefinition,
    #[serde(default)]
    pub node_mappings: Vec<NodeMappingDefinition>,
    #[serde(default)]
    pub relationship_mappings: Vec<RelationshipMappingDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "statement", rename_all = "snake_case")]
pub enum DdlStatement {
    SetSchema(SetSchemaDefinition),
    ElementType(LabelDefinition),
    GraphType(GraphTypeDefinition),
    Graph(GraphDefinition),
}

/// Root of the definition tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DdlDefinition {
    #[serde(default)]
    pub statements: Vec<DdlStatement>,
}

impl DdlDefinition {
    /// Load a definition tree from a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, GraphDdlError> {
        let contents = fs::read_to_string(path).map_err(|e| GraphDdlError::DefinitionRead {
            error: e.to_string(),
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse a definition tree from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, GraphDdlError> {
        serde_yaml::from_str(yaml).map_err(|e| GraphDdlError::DefinitionParse {
            error: e.to_string(),
        })
    }

    /// Parse a definition tree from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, GraphDdlError> {
        serde_json::from_str(json).map_err(|e| GraphDdlError::DefinitionParse {
            error: e.to_string(),
        })
    }

    pub fn element_types(&self) -> impl Iterator<Item = &LabelDefinition> {
        self.statements.iter().filter_map(|s| match s {
            DdlStatement::ElementType(label) => Some(label),
            _ => None,
        })
    }

    pub fn graph_types(&self) -> impl Iterator<Item = &GraphTypeDefinition> {
        self.statements.iter().filter_map(|s| match s {
            DdlStatement::GraphType(graph_type) => Some(graph_type),
            _ => None,
        })
    }

    /// Graph definitions paired with the `SET SCHEMA` in effect where they appear
    pub fn graphs(&self) -> Vec<(&GraphDefinition, Option<&SetSchemaDefinition>)> {
        let mut current = None;
        let mut graphs = Vec::new();
        for statement in &self.statements {
            match statement {
                DdlStatement::SetSchema(set_schema) => current = Some(set_schema),
                DdlStatement::Graph(graph) => graphs.push((graph, current)),
                DdlStatement::ElementType(_) | DdlStatement::GraphType(_) => {}
            }
        }
        graphs
    }
}
