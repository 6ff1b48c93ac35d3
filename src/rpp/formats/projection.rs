//! JSON and YAML renderings of the projection

use super::{Format, FormatError};
use crate::rpp::chunk::Chunk;
use crate::rpp::projection::{from_value, to_value, Value};

/// Pretty printed JSON projection.
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Projection as JSON"
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Chunk, FormatError> {
        let value: Value = serde_json::from_str(source)?;
        Ok(from_value(&value)?)
    }

    fn serialize(&self, root: &Chunk) -> Result<String, FormatError> {
        let mut text = serde_json::to_string_pretty(&to_value(root))?;
        text.push('\n');
        Ok(text)
    }
}

pub struct YamlFormat;

impl Format for YamlFormat {
    fn name(&self) -> &str {
        "yaml"
    }

    fn description(&self) -> &str {
        "Projection as YAML"
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Chunk, FormatError> {
        let value: Value = serde_yaml::from_str(source)?;
        Ok(from_value(&value)?)
    }

    fn serialize(&self, root: &Chunk) -> Result<String, FormatError> {
        Ok(serde_yaml::to_string(&to_value(root))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpp::parser::parse;

    #[test]
    fn test_yaml_rendering() {
        let root = parse("<A 1\n  B \"x y\"\n>").unwrap();
        insta::assert_snapshot!(YamlFormat.serialize(&root).unwrap(), @r###"
        children:
        - params:
          - x y
          tag: B
        params:
        - '1'
        tag: A
        "###);
    }

    #[test]
    fn test_yaml_round_trip() {
        let root = parse("<A 1\n  <B\n    C '' \"q\"\n  >\n  |x \"y\n>").unwrap();
        let text = YamlFormat.serialize(&root).unwrap();
        assert_eq!(YamlFormat.parse(&text).unwrap(), root);
    }

    #[test]
    fn test_json_parse_is_validated() {
        let err = JsonFormat
            .parse(r#"{"tag": "A", "params": [], "children": [{"params": []}]}"#)
            .unwrap_err();
        match err {
            FormatError::Projection(err) => assert_eq!(err.path, "children[0].tag"),
            other => panic!("Expected a projection error, found {:?}", other),
        }
    }

    #[test]
    fn test_json_numbers_are_accepted_as_params() {
        let root = JsonFormat
            .parse(r#"{"tag": "A", "params": [1, 0.5], "children": []}"#)
            .unwrap();
        assert_eq!(root.params, vec!["1", "0.5"]);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            JsonFormat.parse("{"),
            Err(FormatError::Json(_))
        ));
    }
}
