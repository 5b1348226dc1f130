use test_case::test_case;
use viewgraph::config::{DuplicateMappingPolicy, ResolverConfig};
use viewgraph::graph_ddl::{DdlDefinition, GraphDdlError, GraphDdlResolver};

fn resolve_yaml(yaml: &str) -> Result<viewgraph::ResolvedModel, GraphDdlError> {
    let ddl = DdlDefinition::from_yaml_str(yaml).unwrap();
    viewgraph::resolve(&ddl)
}

const PREAMBLE: &str = r#"
statements:
  - statement: element_type
    name: Person
    properties: { name: STRING }
  - statement: element_type
    name: KNOWS
"#;

fn knows_graph(start_join: &str) -> String {
    format!(
        r#"{PREAMBLE}  - statement: graph
    name: social
    schema:
      elements:
        - {{ kind: node, labels: Person }}
        - {{ kind: relationship, name: KNOWS }}
    relationship_mappings:
      - type: KNOWS
        views:
          - view: knows
            start_node:
              labels: Person
              view: people
              join_on: ["{start_join}"]
            end_node:
              labels: Person
              view: people
              join_on: ["people.id = knows.end_id"]
"#
    )
}

#[test]
fn test_undefined_label_in_schema() {
    let yaml = format!(
        r#"{PREAMBLE}  - statement: graph
    name: g
    schema:
      elements: [{{ kind: node, labels: "Person:Ghost" }}]
"#
    );
    match resolve_yaml(&yaml) {
        Err(GraphDdlError::UndefinedLabel { name, known }) => {
            assert_eq!(name, "Ghost");
            assert_eq!(known, vec!["KNOWS".to_string(), "Person".to_string()]);
        }
        other => panic!("expected UndefinedLabel, got {:?}", other),
    }
}

#[test]
fn test_conflicting_property_types() {
    let yaml = r#"
statements:
  - statement: element_type
    name: A
    properties: { p: INTEGER }
  - statement: element_type
    name: B
    properties: { p: STRING }
  - statement: graph
    name: g
    schema:
      elements: [{ kind: node, labels: "A:B" }]
"#;
    match resolve_yaml(yaml) {
        Err(GraphDdlError::PropertyTypeConflict { property, .. }) => assert_eq!(property, "p"),
        other => panic!("expected PropertyTypeConflict, got {:?}", other),
    }
}

#[test]
fn test_unknown_graph_type_reference() {
    let yaml = format!(
        r#"{PREAMBLE}  - statement: graph
    name: g
    graph_type: missing
"#
    );
    assert!(matches!(
        resolve_yaml(&yaml),
        Err(GraphDdlError::UndefinedSchemaReference { name, .. }) if name == "missing"
    ));
}

#[test_case("people.id = knows.start_id" ; "node first")]
#[test_case("knows.start_id = people.id" ; "edge first")]
fn test_valid_join_orientations(predicate: &str) {
    let model = resolve_yaml(&knows_graph(predicate)).unwrap();
    let edge = model.graph("social").unwrap().edge_mappings().values().next().unwrap();
    assert_eq!(edge.start_node.joins[0].node_column, "id");
    assert_eq!(edge.start_node.joins[0].edge_column, "start_id");
}

#[test_case("persons.id = knows.start_id", "persons" ; "unknown left alias")]
#[test_case("people.id = k.start_id", "k" ; "unknown right alias")]
fn test_unresolved_join_alias(predicate: &str, expected_alias: &str) {
    match resolve_yaml(&knows_graph(predicate)) {
        Err(GraphDdlError::UnresolvedAlias { alias, expected }) => {
            assert_eq!(alias, expected_alias);
            assert_eq!(expected, vec!["people".to_string(), "knows".to_string()]);
        }
        other => panic!("expected UnresolvedAlias, got {:?}", other),
    }
}

#[test]
fn test_join_within_one_alias_is_malformed() {
    assert!(matches!(
        resolve_yaml(&knows_graph("people.id = people.other_id")),
        Err(GraphDdlError::MalformedJoin { .. })
    ));
}

#[test]
fn test_mapping_for_undeclared_node_type() {
    let yaml = format!(
        r#"{PREAMBLE}  - statement: graph
    name: g
    schema:
      elements: [{{ kind: node, labels: Person }}]
    node_mappings:
      - labels: KNOWS
        views: [{{ view: knows }}]
"#
    );
    assert!(matches!(
        resolve_yaml(&yaml),
        Err(GraphDdlError::UndefinedNodeType { .. })
    ));
}

#[test]
fn test_node_mapping_without_views() {
    let yaml = format!(
        r#"{PREAMBLE}  - statement: graph
    name: g
    schema:
      elements: [{{ kind: node, labels: Person }}]
    node_mappings:
      - labels: Person
        views: []
"#
    );
    match resolve_yaml(&yaml) {
        Err(GraphDdlError::EmptyMapping { element }) => assert_eq!(element, "(Person)"),
        other => panic!("expected EmptyMapping, got {:?}", other),
    }
}

#[test]
fn test_relationship_mapping_without_views() {
    let yaml = format!(
        r#"{PREAMBLE}  - statement: graph
    name: g
    schema:
      elements: [{{ kind: relationship, name: KNOWS }}]
    relationship_mappings:
      - type: KNOWS
        views: []
"#
    );
    assert!(matches!(
        resolve_yaml(&yaml),
        Err(GraphDdlError::EmptyMapping { element }) if element == "[KNOWS]"
    ));
}

#[test]
fn test_duplicate_mapping_policy() {
    let yaml = format!(
        r#"{PREAMBLE}  - statement: graph
    name: g
    schema:
      elements: [{{ kind: node, labels: Person }}]
    node_mappings:
      - labels: Person
        views: [{{ view: people }}]
      - labels: Person
        views: [{{ view: people, properties: {{ name: full_name }} }}]
"#
    );
    let ddl = DdlDefinition::from_yaml_str(&yaml).unwrap();

    assert!(matches!(
        viewgraph::resolve(&ddl),
        Err(GraphDdlError::DuplicateMapping { .. })
    ));

    let config = ResolverConfig {
        duplicate_mappings: DuplicateMappingPolicy::Overwrite,
        ..Default::default()
    };
    let model = GraphDdlResolver::new(&config).resolve(&ddl).unwrap();
    let mapping = model.graph("g").unwrap().node_mappings().values().next().unwrap();
    assert_eq!(mapping.property_mappings["name"], "full_name");
}

#[test]
fn test_pattern_expansion_limit() {
    let yaml = r#"
statements:
  - statement: element_type
    name: A
  - statement: element_type
    name: B
  - statement: element_type
    name: R
  - statement: graph
    name: g
    schema:
      elements:
        - { kind: pattern, source: [A, B], relationships: [R], target: [A, B] }
"#;
    let ddl = DdlDefinition::from_yaml_str(yaml).unwrap();
    let config = ResolverConfig {
        max_pattern_expansion: 3,
        ..Default::default()
    };
    assert!(matches!(
        GraphDdlResolver::new(&config).resolve(&ddl),
        Err(GraphDdlError::PatternExpansionLimit { size: 4, limit: 3 })
    ));
    assert_eq!(
        viewgraph::resolve(&ddl).unwrap().graph("g").unwrap().graph_type().patterns().len(),
        4
    );
}

#[test]
fn test_unknown_graph_lookup() {
    let model = resolve_yaml(PREAMBLE).unwrap();
    assert!(matches!(
        model.graph("nowhere"),
        Err(GraphDdlError::UndefinedGraph { .. })
    ));
}
