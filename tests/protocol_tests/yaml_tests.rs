//! YAML Reader Tests

use beanline::protocol::yaml::{self, YamlValue};
use beanline::ErrorKind;

#[test]
fn test_parse_stats_mapping() {
    let text = "---\ncurrent-jobs-urgent: 0\ncurrent-jobs-ready: 12\nhostname: \"worker-1\"\nuptime: 3600\n";
    let doc = yaml::parse(text, false).unwrap();

    assert_eq!(doc.get_u64("current-jobs-ready"), Some(12));
    assert_eq!(doc.get("hostname"), Some("worker-1"));
    assert_eq!(doc.as_mapping().unwrap().len(), 4);
    assert!(doc.as_sequence().is_none());
}

#[test]
fn test_parse_tube_list() {
    let doc = yaml::parse("---\n- default\n- emails\n- \"reports\"\n", true).unwrap();
    assert_eq!(
        doc,
        YamlValue::Sequence(vec![
            "default".to_string(),
            "emails".to_string(),
            "reports".to_string()
        ])
    );
}

#[test]
fn test_parse_tolerates_crlf_line_endings() {
    let doc = yaml::parse("---\r\nname: default\r\n", false).unwrap();
    assert_eq!(doc.get("name"), Some("default"));
}

#[test]
fn test_quoted_value_keeps_inner_colons() {
    let doc = yaml::parse("---\nos: \"linux: 6.1\"\n", false).unwrap();
    assert_eq!(doc.get("os"), Some("linux: 6.1"));
}

#[test]
fn test_single_quoted_scalars() {
    let doc = yaml::parse("---\nname: 'emails'\nnote: 'it''s paused'\n", false).unwrap();
    assert_eq!(doc.get("name"), Some("emails"));
    assert_eq!(doc.get("note"), Some("it's paused"));

    let list = yaml::parse("---\n- 'default'\n", true).unwrap();
    assert_eq!(list.as_sequence().unwrap(), ["default".to_string()]);
}

#[test]
fn test_nested_value_kept_as_yaml_text() {
    let doc = yaml::parse("---\nname: emails\nlimits:\n  max: 10\n", false).unwrap();

    assert_eq!(doc.get("name"), Some("emails"));
    assert_eq!(doc.get("limits"), Some("max: 10"));
}

#[test]
fn test_empty_document() {
    assert_eq!(yaml::parse("---\n", true).unwrap(), YamlValue::Sequence(Vec::new()));
    assert!(yaml::parse("---\n", false).unwrap().as_mapping().unwrap().is_empty());
}

#[test]
fn test_shape_mismatch_is_error() {
    let err = yaml::parse("---\n- default\n", false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);

    let err = yaml::parse("---\nname: default\n", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn test_empty_value() {
    let doc = yaml::parse("---\nbinlog-current-index:\n", false).unwrap();
    assert_eq!(doc.get("binlog-current-index"), Some(""));
}

#[test]
fn test_list_entry_without_dash_is_error() {
    let err = yaml::parse("---\n- default\nemails\n", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn test_mapping_entry_without_colon_is_error() {
    let err = yaml::parse("---\njust text\n", false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn test_non_numeric_lookup() {
    let doc = yaml::parse("---\nversion: 1.13\n", false).unwrap();
    assert_eq!(doc.get_u64("version"), None);
    assert_eq!(doc.get_u64("missing"), None);
}
