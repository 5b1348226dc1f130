use std::io::Write;

use viewgraph::graph_ddl::{DdlDefinition, GraphDdlError, LabelCombination, ViewId, ViewPath};

fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_yaml_file() {
    let file = write_temp(
        r#"
statements:
  - statement: element_type
    name: City
    properties: { name: STRING, population: INTEGER? }
  - statement: graph
    name: geo
    schema:
      elements:
        - { kind: node, labels: City }
    node_mappings:
      - labels: City
        views: [{ view: cities }]
"#,
        ".yaml",
    );

    let ddl = DdlDefinition::from_yaml_file(file.path()).unwrap();
    let model = viewgraph::resolve(&ddl).unwrap();
    let graph = model.graph("geo").unwrap();
    let signature = graph
        .graph_type()
        .node_property_keys(&LabelCombination::single("City"))
        .unwrap();
    assert!(signature["population"].is_nullable());
    assert_eq!(graph.node_mappings().len(), 1);
}

#[test]
fn test_missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = DdlDefinition::from_yaml_file(dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, GraphDdlError::DefinitionRead { .. }));
}

#[test]
fn test_load_json_definition() {
    let json = r#"{
  "statements": [
    { "statement": "element_type", "name": "Tag", "properties": { "title": "STRING" } },
    { "statement": "graph", "name": "tags",
      "schema": { "elements": [ { "kind": "node", "labels": ["Tag"] } ] },
      "node_mappings": [ { "labels": "Tag", "views": [ { "view": "lake.public.tags" } ] } ] }
  ]
}"#;
    let ddl = DdlDefinition::from_json_str(json).unwrap();
    let model = viewgraph::resolve(&ddl).unwrap();
    let mapping = model.graph("tags").unwrap().node_mappings().values().next().unwrap();
    assert_eq!(mapping.data_source.data_source.as_deref(), Some("lake"));
    assert_eq!(mapping.view.table(), "tags");
}

#[test]
fn test_set_schema_qualifies_views() {
    let yaml = r#"
statements:
  - statement: element_type
    name: Person
  - statement: graph
    name: unqualified
    schema:
      elements: [{ kind: node, labels: Person }]
    node_mappings:
      - labels: Person
        views: [{ view: people }]
  - statement: set_schema
    data_source: warehouse
    schema: social
  - statement: graph
    name: qualified
    schema:
      elements: [{ kind: node, labels: Person }]
    node_mappings:
      - labels: Person
        views: [{ view: people }, { view: archive.people }]
"#;
    let ddl = DdlDefinition::from_yaml_str(yaml).unwrap();
    let model = viewgraph::resolve(&ddl).unwrap();

    let before = model.graph("unqualified").unwrap();
    let mapping = before.node_mappings().values().next().unwrap();
    assert_eq!(mapping.data_source.data_source, None);
    assert_eq!(mapping.view.to_string(), "people");

    let after = model.graph("qualified").unwrap();
    let person = LabelCombination::single("Person");
    let views: Vec<String> = after
        .node_views_for(&person)
        .map(|m| m.view.to_string())
        .collect();
    assert_eq!(views.len(), 2);
    assert!(views.contains(&"warehouse.social.people".to_string()));
    assert!(views.contains(&"warehouse.archive.people".to_string()));

    let set_schema = viewgraph::graph_ddl::SetSchemaDefinition {
        data_source: "warehouse".to_string(),
        schema: "social".to_string(),
    };
    let path = ViewPath::try_from("people".to_string()).unwrap();
    assert!(after
        .node_mapping(&person, &ViewId::resolve(&path, Some(&set_schema)))
        .is_some());
}

#[test]
fn test_resolved_model_serializes() {
    let yaml = r#"
statements:
  - statement: element_type
    name: Person
    properties: { name: STRING }
  - statement: graph
    name: social
    schema:
      elements: [{ kind: node, labels: Person }]
    node_mappings:
      - labels: Person
        views: [{ view: people }]
"#;
    let ddl = DdlDefinition::from_yaml_str(yaml).unwrap();
    let model = viewgraph::resolve(&ddl).unwrap();
    let json = serde_json::to_value(&model).unwrap();

    let mappings = &json["graphs"]["social"]["node_to_view_mappings"];
    assert!(mappings.is_array());
    assert_eq!(mappings[0]["property_mappings"]["name"], "name");
    assert!(serde_yaml::to_string(&model).is_ok());
}
