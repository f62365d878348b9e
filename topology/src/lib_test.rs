use serde_json::json;

use super::*;

#[test]
fn non_mapping_document_is_rejected() {
    for doc in [json!(null), json!("rack"), json!([{"id": "r1"}])] {
        let err = generate(&doc, &RenderOptions::default()).unwrap_err();
        assert_eq!(err.error_code(), "E_INVALID_DOCUMENT");
        assert!(err.to_string().contains("at $:"), "{err}");
    }
}

#[test]
fn scalar_marker_value_is_rejected() {
    let err = generate(&json!({"racks": true}), &RenderOptions::default()).unwrap_err();
    assert_eq!(
        err,
        GenerateError::StructurallyInvalidDocument {
            path: "$.racks".to_owned(),
            expected: "mapping or list",
            found: "boolean"
        }
    );
}

#[test]
fn null_marker_value_renders_an_empty_graph() {
    let out = generate(&json!({"topology": null}), &RenderOptions::default()).unwrap();
    assert_eq!(out.kind, Kind::Topology);
    assert!(out.diagnostics.is_empty());
    assert_eq!(out.dot, "digraph topology {\n}\n");
}

#[test]
fn report_serializes_in_camel_case() {
    let out = generate(&json!({"sites": [{"id": "a", "label": "A"}]}), &RenderOptions::default()).unwrap();
    let report = serde_json::to_value(&out).unwrap();
    assert_eq!(report["kind"], "site_topology");
    assert_eq!(
        report["nodeIds"]["a"],
        json!({"graphNodeId": "a", "entityType": "site", "sourceId": "a", "label": "A"})
    );
    assert_eq!(report["diagnostics"], json!([]));
}

#[test]
fn diagnostics_serialize_with_kind_tag() {
    let out = generate(&json!({}), &RenderOptions::default()).unwrap();
    let report = serde_json::to_value(&out.diagnostics).unwrap();
    assert_eq!(report, json!([{"kind": "unknown_schema", "keys": []}]));
    assert_eq!(out.diagnostics[0].error_code(), "E_UNKNOWN_SCHEMA");
}
