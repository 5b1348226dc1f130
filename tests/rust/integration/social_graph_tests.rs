use viewgraph::config::ResolverConfig;
use viewgraph::graph_ddl::{
    BaseType, DdlDefinition, GraphDdlResolver, Join, LabelCombination, PropertyType, ViewId,
    ViewPath,
};

const SOCIAL_DDL: &str = r#"
statements:
  - statement: element_type
    name: Person
    properties: { name: STRING }
    key: { name: person_key, properties: [name] }
  - statement: element_type
    name: KNOWS
    properties: { since: INTEGER }
  - statement: graph
    name: social
    schema:
      elements:
        - { kind: node, labels: Person }
        - { kind: relationship, name: KNOWS }
        - { kind: pattern, source: [Person], relationships: [KNOWS], target: [Person] }
    node_mappings:
      - labels: Person
        views: [{ view: people }]
    relationship_mappings:
      - type: KNOWS
        views:
          - view: knows
            start_node:
              labels: Person
              view: people
              join_on: ["people.id = knows.start_id"]
            end_node:
              labels: Person
              view: people
              join_on: ["knows.end_id = people.id"]
"#;

fn person() -> LabelCombination {
    LabelCombination::single("Person")
}

fn view(name: &str) -> ViewId {
    let path = ViewPath::try_from(name.to_string()).unwrap();
    ViewId::resolve(&path, None)
}

#[test]
fn test_social_graph_type() {
    let ddl = DdlDefinition::from_yaml_str(SOCIAL_DDL).unwrap();
    let model = viewgraph::resolve(&ddl).unwrap();
    let graph = model.graph("social").unwrap();
    let graph_type = graph.graph_type();

    assert_eq!(graph_type.node_types().collect::<Vec<_>>(), vec![&person()]);
    assert_eq!(
        graph_type.node_property_keys(&person()).unwrap()["name"],
        PropertyType::new(BaseType::String)
    );
    assert_eq!(
        graph_type.relationship_property_keys("KNOWS").unwrap()["since"],
        PropertyType::new(BaseType::Integer)
    );
    assert_eq!(graph_type.node_keys().len(), 1);
    assert_eq!(
        graph_type.node_key("Person").unwrap().properties,
        vec!["name".to_string()]
    );
    assert!(graph_type.allows(&person(), "KNOWS", &person()));
    assert_eq!(graph_type.patterns().len(), 1);
}

#[test]
fn test_social_node_mapping() {
    let ddl = DdlDefinition::from_yaml_str(SOCIAL_DDL).unwrap();
    let model = viewgraph::resolve(&ddl).unwrap();
    let graph = model.graph("social").unwrap();

    let mapping = graph.node_mapping(&person(), &view("people")).unwrap();
    assert_eq!(mapping.property_mappings["name"], "name");
    assert_eq!(mapping.id_column, "id");
    assert!(mapping.implied_labels.contains("Person"));
    assert_eq!(graph.node_views_for(&person()).count(), 1);
    assert_eq!(graph.node_mappings().len(), 1);
    assert_eq!(graph.edge_mappings().len(), 1);
}

#[test]
fn test_social_edge_mapping_joins_are_oriented() {
    let ddl = DdlDefinition::from_yaml_str(SOCIAL_DDL).unwrap();
    let model = viewgraph::resolve(&ddl).unwrap();
    let graph = model.graph("social").unwrap();

    let edge = graph.edge_mapping("KNOWS", &view("knows")).unwrap();
    assert_eq!(edge.start_node.joins, vec![Join::new("id", "start_id")]);
    // Written edge-first, still oriented node-first
    assert_eq!(edge.end_node.joins, vec![Join::new("id", "end_id")]);
    assert_eq!(edge.start_node.node_view.view, view("people"));
    assert_eq!(edge.property_mappings.len(), 1);
    assert_eq!(edge.property_mappings["since"], "since");
    assert_eq!(edge.labels(), LabelCombination::single("KNOWS"));
}

#[test]
fn test_custom_implicit_columns() {
    let ddl = DdlDefinition::from_yaml_str(SOCIAL_DDL).unwrap();
    let config = ResolverConfig {
        id_column: "row_id".to_string(),
        start_column: "src".to_string(),
        end_column: "dst".to_string(),
        ..Default::default()
    };
    let model = GraphDdlResolver::new(&config).resolve(&ddl).unwrap();
    let edge = model
        .graph("social")
        .unwrap()
        .edge_mapping("KNOWS", &view("knows"))
        .unwrap();

    assert_eq!(edge.id_column, "row_id");
    assert_eq!(edge.start_column, "src");
    assert_eq!(edge.end_column, "dst");
}

#[test]
fn test_multi_label_merge_across_graph() {
    let yaml = r#"
statements:
  - statement: element_type
    name: Person
    properties: { name: STRING }
  - statement: element_type
    name: Employee
    properties: { salary: FLOAT }
  - statement: graph_type
    name: company
    schema:
      elements:
        - { kind: node, labels: "Person:Employee" }
        - { kind: node, labels: Person }
  - statement: graph
    name: staff
    graph_type: company
    node_mappings:
      - labels: [Employee, Person]
        views:
          - view: hr.employees
            properties: { name: full_name, salary: pay }
"#;
    let ddl = DdlDefinition::from_yaml_str(yaml).unwrap();
    let model = viewgraph::resolve(&ddl).unwrap();
    let combo = LabelCombination::new(["Person", "Employee"]).unwrap();

    let graph_type = model.graph_type("company").unwrap();
    let signature = graph_type.node_property_keys(&combo).unwrap();
    assert_eq!(signature.len(), 2);
    assert_eq!(graph_type.node_types().count(), 2);

    let graph = model.graph("staff").unwrap();
    let mapping = graph.node_mapping(&combo, &view("hr.employees")).unwrap();
    assert_eq!(mapping.property_mappings["name"], "full_name");
    assert_eq!(mapping.property_mappings["salary"], "pay");
    assert_eq!(mapping.data_source.schema.as_deref(), Some("hr"));
}
