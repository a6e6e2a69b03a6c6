use yang_data_core::{
    DataConfig, FindingSeverity, FindingsConfig, ParserFindingType, SchemaModel,
};
use yang_data_parser::{DataSession, DomValue, InstanceSnapshot, XmlElement};

const NS: &str = "urn:acme:system";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_schema() -> SchemaModel {
    SchemaModel::from_yaml_str(
        r#"
modules:
  - name: acme-system
    namespace: "urn:acme:system"
    nodes:
      - name: system
        kind: container
        children:
          - { name: hostname, kind: leaf, types: [string] }
          - { name: port, kind: leaf, types: [uint16] }
          - { name: enabled, kind: leaf, types: [boolean] }
          - { name: ready, kind: leaf, types: [empty] }
          - { name: tag, kind: leaf-list, types: [string] }
          - { name: marker, kind: leaf-list, types: [empty] }
          - name: user
            kind: list
            keys: [name]
            children:
              - { name: name, kind: leaf, types: [string] }
              - { name: shell, kind: leaf, types: [string] }
          - name: state
            kind: container
            config: false
            children:
              - { name: uptime, kind: leaf, types: [uint32] }
  - name: acme-meta
    namespace: "urn:acme:meta"
    nodes: []
"#,
    )
    .unwrap()
}

fn combined_snapshot(session: &mut DataSession) -> InstanceSnapshot {
    let root = session.build_combined_tree(&test_schema());
    session.snapshot(root).unwrap().normalized()
}

fn xml_session(text: &str) -> DataSession {
    let mut session = DataSession::new();
    session.add_xml_text("input.xml", text);
    session
}

fn json_session(text: &str) -> DataSession {
    let mut session = DataSession::new();
    session.add_json_text("input.json", text);
    session
}

fn finding_types(session: &DataSession) -> Vec<String> {
    session
        .findings()
        .findings()
        .map(|f| f.finding_type.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Format equivalence
// ---------------------------------------------------------------------------

#[test]
fn test_xml_and_json_produce_equal_trees() {
    let mut xml = xml_session(
        r#"<config>
  <system xmlns="urn:acme:system">
    <hostname>core-1</hostname>
    <port>22</port>
    <enabled>true</enabled>
    <tag>edge</tag>
    <tag>lab</tag>
    <user><name>alice</name><shell>zsh</shell></user>
    <user><name>bob</name></user>
  </system>
</config>"#,
    );
    let mut json = json_session(
        r#"{
  "acme-system:system": {
    "hostname": "core-1",
    "port": 22,
    "enabled": true,
    "tag": ["edge", "lab"],
    "user": [{"name": "alice", "shell": "zsh"}, {"name": "bob"}]
  }
}"#,
    );

    let from_xml = combined_snapshot(&mut xml);
    let from_json = combined_snapshot(&mut json);

    assert!(xml.findings().is_empty(), "{:?}", finding_types(&xml));
    assert!(json.findings().is_empty(), "{:?}", finding_types(&json));
    assert_eq!(from_xml, from_json);
}

#[test]
fn test_instance_data_set_wrapper() {
    let mut session = xml_session(
        r#"<instance-data-set xmlns="urn:ietf:params:xml:ns:yang:ietf-yang-instance-data">
  <name>inventory</name>
  <content-data>
    <system xmlns="urn:acme:system"><hostname>h</hostname></system>
  </content-data>
</instance-data-set>"#,
    );

    let root = session.build_combined_tree(&test_schema());
    let arena = session.arena();
    let system = arena.find_container(root, NS, "system").unwrap();
    assert_eq!(arena.leaf_value(system, NS, "hostname"), Some("h"));
    assert!(session.findings().is_empty());
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[test]
fn test_merge_with_empty_input_is_identity() {
    let doc = r#"{"acme-system:system": {"hostname": "h", "tag": ["x"]}}"#;

    let mut single = json_session(doc);
    let mut with_empty = DataSession::new();
    with_empty.add_json_text("a.json", doc);
    with_empty.add_json_text("empty.json", r#"{}"#);

    assert_eq!(combined_snapshot(&mut single), combined_snapshot(&mut with_empty));
    assert!(with_empty.findings().has_finding_of_type(ParserFindingType::P079EmptyDataFile));
}

#[test]
fn test_merge_with_itself_is_identity() {
    let doc = r#"<data><system xmlns="urn:acme:system"><hostname>h</hostname><tag>x</tag><user><name>a</name></user></system></data>"#;

    let mut single = xml_session(doc);
    let mut twice = DataSession::new();
    twice.add_xml_text("a.xml", doc);
    twice.add_xml_text("b.xml", doc);

    assert_eq!(combined_snapshot(&mut single), combined_snapshot(&mut twice));
    assert!(twice.findings().is_empty());
}

#[test]
fn test_merge_adds_missing_leafs() {
    let mut session = DataSession::new();
    session.add_json_text("a.json", r#"{"acme-system:system": {"hostname": "h"}}"#);
    session.add_json_text("b.json", r#"{"acme-system:system": {"hostname": "h", "port": 80}}"#);

    let root = session.build_combined_tree(&test_schema());
    let arena = session.arena();
    let system = arena.find_container(root, NS, "system").unwrap();
    assert_eq!(arena.leaf_value(system, NS, "hostname"), Some("h"));
    assert_eq!(arena.leaf_value(system, NS, "port"), Some("80"));
    assert!(session.findings().is_empty());
}

#[test]
fn test_merge_conflict_keeps_first_value() {
    let mut session = DataSession::new();
    session.add_json_text("a.json", r#"{"acme-system:system": {"hostname": "one"}}"#);
    let second = session.add_json_text("b.json", r#"{"acme-system:system": {"hostname": "two"}}"#);

    let root = session.build_combined_tree(&test_schema());
    let system = session.arena().find_container(root, NS, "system").unwrap();
    assert_eq!(session.arena().leaf_value(system, NS, "hostname"), Some("one"));

    let conflicts: Vec<_> = session.findings().findings_for_document(second).collect();
    assert_eq!(conflicts.len(), 1);
    assert!(conflicts[0].is(ParserFindingType::P073LeafValueAlreadySet));
    assert!(conflicts[0].message.contains("'a.json'"));
    assert!(conflicts[0].message.contains("(two vs. one)"));
}

#[test]
fn test_merge_lists_and_leaf_lists() {
    let mut session = DataSession::new();
    session.add_xml_text(
        "a.xml",
        r#"<config><system xmlns="urn:acme:system"><tag>x</tag><user><name>a</name></user></system></config>"#,
    );
    session.add_json_text(
        "b.json",
        r#"{"acme-system:system": {"tag": ["x", "y"], "user": [{"name": "a", "shell": "sh"}, {"name": "b"}]}}"#,
    );

    let root = session.build_combined_tree(&test_schema());
    let arena = session.arena();
    let system = arena.find_container(root, NS, "system").unwrap();

    assert_eq!(arena.leaf_list_values(system, NS, "tag"), vec!["x", "y"]);
    let users = arena.list_entries(system, NS, "user");
    assert_eq!(users.len(), 2);
    assert_eq!(arena.leaf_value(users[0], NS, "name"), Some("a"));
    assert_eq!(arena.leaf_value(users[0], NS, "shell"), Some("sh"));
    assert_eq!(arena.leaf_value(users[1], NS, "name"), Some("b"));
    assert!(session.findings().is_empty());
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[test]
fn test_json_empty_type_encodings() {
    let mut session =
        json_session(r#"{"acme-system:system": {"ready": [null], "marker": [null]}}"#);

    let root = session.build_combined_tree(&test_schema());
    let arena = session.arena();
    let system = arena.find_container(root, NS, "system").unwrap();
    assert_eq!(arena.leaf_value(system, NS, "ready"), Some(""));
    assert_eq!(arena.leaf_list_values(system, NS, "marker"), vec![""]);
    assert!(session.findings().is_empty());
}

#[test]
fn test_null_leaf_without_empty_type() {
    let mut session = json_session(r#"{"acme-system:system": {"hostname": null}}"#);

    let root = session.build_combined_tree(&test_schema());
    let system = session.arena().find_container(root, NS, "system").unwrap();
    assert_eq!(session.arena().leaf_value(system, NS, "hostname"), None);
    assert_eq!(finding_types(&session), vec!["P080_NULL_VALUE"]);
}

#[test]
fn test_xml_leaf_with_element_content_has_no_value() {
    let mut session = xml_session(
        r#"<config><system xmlns="urn:acme:system"><hostname>text<b>bold</b></hostname></system></config>"#,
    );

    let id = session.documents().iter().next().unwrap().id();
    let document = session.document(id).unwrap();
    let system = document.top_level_nodes()[0];
    let hostname = document.child_named(system, "hostname").unwrap();
    assert_eq!(document.node(hostname).unwrap().value(), &DomValue::Absent);

    session.build_combined_tree(&test_schema());
    assert!(session.findings().has_finding_of_type(ParserFindingType::P080NullValue));
}

#[test]
fn test_xml_text_is_cleaned() {
    let mut session = xml_session(
        "<config><system xmlns=\"urn:acme:system\"><hostname>\n    core\n    one\n  </hostname></system></config>",
    );

    let root = session.build_combined_tree(&test_schema());
    let system = session.arena().find_container(root, NS, "system").unwrap();
    assert_eq!(session.arena().leaf_value(system, NS, "hostname"), Some("core one"));
}

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

#[test]
fn test_annotations_from_both_formats() {
    let schema = test_schema();

    let mut xml = xml_session(
        r#"<config xmlns:m="urn:acme:meta"><system xmlns="urn:acme:system"><hostname m:origin="intended">h</hostname></system></config>"#,
    );
    let mut json = json_session(
        r#"{"acme-system:system": {"hostname": "h", "@hostname": {"acme-meta:origin": "intended"}}}"#,
    );
    xml.build_combined_tree(&schema);
    json.build_combined_tree(&schema);

    for session in [&xml, &json] {
        let document = session.documents().iter().next().unwrap();
        let system = document.top_level_nodes()[0];
        let hostname = document.node(document.child_named(system, "hostname").unwrap()).unwrap();
        let origin = hostname.annotation("origin").unwrap();
        assert_eq!(origin.namespace.as_deref(), Some("urn:acme:meta"));
        assert_eq!(origin.module_name.as_deref(), Some("acme-meta"));
        assert_eq!(origin.value, DomValue::String("intended".into()));
        assert!(session.findings().is_empty());
    }
}

#[test]
fn test_orphaned_json_annotation() {
    let mut session =
        json_session(r#"{"acme-system:system": {"@hostname": {"acme-meta:origin": "x"}}}"#);
    session.build_combined_tree(&test_schema());
    assert!(session.findings().has_finding_of_type(ParserFindingType::P069UnexpectedJsonValue));
}

// ---------------------------------------------------------------------------
// Schema mismatches
// ---------------------------------------------------------------------------

#[test]
fn test_namespace_suggestion() {
    let mut session = xml_session(r#"<config><system xmlns="urn:acme:wrong"/></config>"#);
    let root = session.build_combined_tree(&test_schema());

    assert!(session.arena().children(root).unwrap().structure.is_empty());
    let finding = session.findings().findings().next().unwrap();
    assert!(finding.is(ParserFindingType::P075CorrespondingSchemaNodeNotFound));
    assert!(finding.message.contains("namespace 'urn:acme:system'"));
}

#[test]
fn test_missing_list_key_drops_entry() {
    let mut session =
        json_session(r#"{"acme-system:system": {"user": [{"shell": "sh"}, {"name": "a"}]}}"#);

    let root = session.build_combined_tree(&test_schema());
    let system = session.arena().find_container(root, NS, "system").unwrap();
    assert_eq!(session.arena().list_entries(system, NS, "user").len(), 1);
    assert_eq!(finding_types(&session), vec!["P072_MISSING_KEY_VALUE"]);
}

#[test]
fn test_duplicate_within_one_input() {
    let mut session = xml_session(
        r#"<config><system xmlns="urn:acme:system"><hostname>a</hostname><hostname>b</hostname><tag>x</tag><tag>x</tag></system></config>"#,
    );

    let root = session.build_combined_tree(&test_schema());
    let system = session.arena().find_container(root, NS, "system").unwrap();
    assert_eq!(session.arena().leaf_value(system, NS, "hostname"), Some("a"));
    assert_eq!(session.arena().leaf_list_values(system, NS, "tag"), vec!["x"]);
    assert_eq!(
        finding_types(&session),
        vec!["P076_DUPLICATE_INSTANCE_DATA", "P076_DUPLICATE_INSTANCE_DATA"]
    );
}

#[test]
fn test_state_container_is_translated() {
    let mut session = xml_session(
        r#"<data><system xmlns="urn:acme:system"><state><uptime>5</uptime></state></system></data>"#,
    );

    let root = session.build_combined_tree(&test_schema());
    let system = session.arena().find_container(root, NS, "system").unwrap();
    let state = session.arena().find_container(system, NS, "state").unwrap();
    assert_eq!(session.arena().leaf_value(state, NS, "uptime"), Some("5"));
}

#[test]
fn test_wrong_root_element() {
    let mut session =
        xml_session(r#"<system xmlns="urn:acme:system"><hostname>h</hostname></system>"#);

    let root = session.build_combined_tree(&test_schema());
    assert!(session.arena().find_container(root, NS, "system").is_some());
    assert_eq!(finding_types(&session), vec!["P071_INCORRECT_ROOT_ELEMENT_OF_DATA_FILE"]);
}

#[test]
fn test_top_level_without_namespace() {
    let mut session = xml_session(r#"<config><system><hostname>h</hostname></system></config>"#);
    session.build_combined_tree(&test_schema());

    let types = finding_types(&session);
    assert!(types.contains(&"P015_INVALID_SYNTAX_IN_DOCUMENT".to_string()));
    assert!(types.contains(&"P075_CORRESPONDING_SCHEMA_NODE_NOT_FOUND".to_string()));
}

// ---------------------------------------------------------------------------
// Text adapters
// ---------------------------------------------------------------------------

#[test]
fn test_malformed_text_is_reported() {
    let mut session = DataSession::new();
    let xml = session.add_xml_text("bad.xml", "<config>");
    let json = session.add_json_text("bad.json", "{\"a\": ");
    let good = session.add_json_text("good.json", r#"{"acme-system:system": {"hostname": "h"}}"#);

    let root = session.build_combined_tree(&test_schema());
    assert!(session.arena().find_container(root, NS, "system").is_some());
    for id in [xml, json] {
        let findings: Vec<_> = session.findings().findings_for_document(id).collect();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].is(ParserFindingType::P000UnspecifiedError));
    }
    assert_eq!(session.findings().findings_for_document(good).count(), 0);
}

#[test]
fn test_assembled_xml_tree() {
    let root = XmlElement::new("config").child(
        XmlElement::new("system")
            .attr("xmlns", NS)
            .child(XmlElement::new("hostname").text("h").at(3, 5)),
    );
    let mut session = DataSession::new();
    session.add_xml_document("built", &root);

    let combined = session.build_combined_tree(&test_schema());
    let system = session.arena().find_container(combined, NS, "system").unwrap();
    assert_eq!(session.arena().leaf_value(system, NS, "hostname"), Some("h"));
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_session_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.yaml");

    let config = DataConfig {
        findings: FindingsConfig {
            severities: [("P073_LEAF_VALUE_ALREADY_SET".to_string(), FindingSeverity::Warning)]
                .into_iter()
                .collect(),
            filters: vec!["*;P079_*;*".to_string()],
            ..FindingsConfig::default()
        },
        ..DataConfig::default()
    };
    config.save(&path).unwrap();

    let loaded = DataConfig::load(&path).unwrap();
    let mut session = DataSession::from_config(&loaded).unwrap();
    session.add_json_text("a.json", r#"{"acme-system:system": {"hostname": "one"}}"#);
    session.add_json_text("b.json", r#"{"acme-system:system": {"hostname": "two"}}"#);
    session.add_json_text("c.json", "{}");
    session.build_combined_tree(&test_schema());

    assert_eq!(finding_types(&session), vec!["P073_LEAF_VALUE_ALREADY_SET"]);
    assert!(!session.findings().has_findings_with_severity(FindingSeverity::Error));
    assert!(session.findings().has_findings_with_severity(FindingSeverity::Warning));
}

#[test]
fn test_config_top_level_namespaces() {
    let config = DataConfig::from_yaml_str(
        r#"
version: "1.0"
data:
  top_level_namespaces: ["urn:acme:other"]
"#,
    )
    .unwrap();

    let mut session = DataSession::from_config(&config).unwrap();
    session.add_json_text("a.json", r#"{"acme-system:system": {"hostname": "h"}}"#);
    let root = session.build_combined_tree(&test_schema());
    assert!(session.arena().find_container(root, NS, "system").is_none());
}

#[test]
fn test_invalid_filter_in_config() {
    let config = DataConfig::from_yaml_str(
        r#"
version: "1.0"
findings:
  filters: ["only-two;sections"]
"#,
    )
    .unwrap();
    assert!(DataSession::from_config(&config).is_err());
}
