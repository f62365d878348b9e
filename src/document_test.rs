use std::path::PathBuf;

use serde_json::json;

use super::*;

#[test]
fn format_from_extension() {
    assert_eq!(Format::from_path(Path::new("dc.yaml")), Some(Format::Yaml));
    assert_eq!(Format::from_path(Path::new("dc.YML")), Some(Format::Yaml));
    assert_eq!(Format::from_path(Path::new("dc.json")), Some(Format::Json));
    assert_eq!(Format::from_path(Path::new("dc.txt")), None);
    assert_eq!(Format::from_path(Path::new("dc")), None);
}

#[test]
fn yaml_integer_keys_are_stringified() {
    let text = "rack_servers:\n  1:\n    - id: s1\n  true: []\n";
    let doc = decode(text, Some(Format::Yaml)).unwrap();
    assert_eq!(doc, json!({"rack_servers": {"1": [{"id": "s1"}], "true": []}}));
}

#[test]
fn yaml_preserves_key_order() {
    let doc = decode("racks:\n  - id: z\n  - id: a\nsite: hq\n", Some(Format::Yaml)).unwrap();
    let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["racks", "site"]);
}

#[test]
fn yaml_scalars_convert() {
    let doc = decode("a: 1.5\nb: -3\nc: ~\nd: !custom 7\n", Some(Format::Yaml)).unwrap();
    assert_eq!(doc, json!({"a": 1.5, "b": -3, "c": null, "d": 7}));
}

#[test]
fn unknown_format_tries_json_then_yaml() {
    assert_eq!(decode("{\"links\": []}", None).unwrap(), json!({"links": []}));
    assert_eq!(decode("links: []", None).unwrap(), json!({"links": []}));
}

#[test]
fn invalid_input_reports_decoder_error() {
    assert!(matches!(decode("{", Some(Format::Json)), Err(CliError::Json(_))));
    assert!(matches!(decode("a: [", None), Err(CliError::Yaml(_))));
}

#[tokio::test]
async fn load_missing_file_names_the_path() {
    let path = PathBuf::from("/nonexistent/topodot/dc.yaml");
    let err = load(&path).await.unwrap_err();
    assert!(err.to_string().contains("/nonexistent/topodot/dc.yaml"), "{err}");
}
