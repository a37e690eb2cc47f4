use crate::core::template::Template;
use crate::error::{Xls2JsonError, Xls2JsonResult};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;

/// Parse a JSON template file
pub fn parse_template_file(path: &Path) -> Xls2JsonResult<Template> {
    let content = std::fs::read_to_string(path)?;
    parse_template_str(&content)
}

/// Parse a JSON template.
///
/// Accepts a format string, an object of nested objects/strings, or a
/// top-level array of label names (turned into an identity template).
pub fn parse_template_str(content: &str) -> Xls2JsonResult<Template> {
    let json: Value = serde_json::from_str(content)?;
    match json {
        Value::Array(items) => {
            let labels = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        Xls2JsonError::TemplateSyntax(format!(
                            "label list entry [{i}] must be a string, got {item}"
                        ))
                    })
                })
                .collect::<Xls2JsonResult<Vec<_>>>()?;
            identity_template(&labels)
        }
        other => template_from_value(&other, "$"),
    }
}

/// `{label: "{label}"}` for every label, in the given order
pub fn identity_template(labels: &[String]) -> Xls2JsonResult<Template> {
    if labels.is_empty() {
        return Err(Xls2JsonError::TemplateSyntax(
            "label list is empty".to_string(),
        ));
    }
    let mut map = IndexMap::with_capacity(labels.len());
    for label in labels {
        if label.is_empty() || label.contains(['{', '}', ':']) {
            return Err(Xls2JsonError::TemplateSyntax(format!(
                "'{label}' cannot be used as a label name"
            )));
        }
        map.insert(label.clone(), Template::leaf(&format!("{{{label}}}"))?);
    }
    Ok(Template::Node(map))
}

fn template_from_value(value: &Value, path: &str) -> Xls2JsonResult<Template> {
    match value {
        Value::String(s) => Template::leaf(s).map_err(|e| match e {
            Xls2JsonError::TemplateSyntax(msg) => {
                Xls2JsonError::TemplateSyntax(format!("{path}: {msg}"))
            }
            other => other,
        }),
        Value::Object(map) => {
            let mut children = IndexMap::with_capacity(map.len());
            for (key, child) in map {
                let child_path = format!("{path}.{key}");
                children.insert(key.clone(), template_from_value(child, &child_path)?);
            }
            Ok(Template::Node(children))
        }
        other => Err(Xls2JsonError::TemplateSyntax(format!(
            "{path}: expected a string or an object, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::labels::extract_labels;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_nested_object_preserves_order() {
        let t = parse_template_str(r#"{"b": "{id}", "a": {"y": "{name}", "x": "{email}"}}"#)
            .unwrap();
        let Template::Node(map) = &t else {
            panic!("Expected node template");
        };
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        let Template::Node(inner) = &map["a"] else {
            panic!("Expected nested node");
        };
        assert_eq!(inner.keys().collect::<Vec<_>>(), vec!["y", "x"]);
        assert_eq!(extract_labels(&t).len(), 3);
    }

    #[test]
    fn test_parse_string_template() {
        let t = parse_template_str(r#""{id}-{name}""#).unwrap();
        assert!(matches!(t, Template::Leaf(_)));
    }

    #[test]
    fn test_parse_label_list() {
        let t = parse_template_str(r#"["id", "email"]"#).unwrap();
        let Template::Node(map) = &t else {
            panic!("Expected node template");
        };
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["id", "email"]);
        let Template::Leaf(leaf) = &map["email"] else {
            panic!("Expected leaf");
        };
        assert_eq!(leaf.as_str(), "{email}");
    }

    #[test]
    fn test_parse_rejects_numbers_with_path() {
        let err = parse_template_str(r#"{"a": {"b": 3}}"#).unwrap_err();
        match err {
            Xls2JsonError::TemplateSyntax(msg) => {
                assert!(msg.contains("$.a.b"), "got: {msg}");
                assert!(msg.contains("a number"), "got: {msg}");
            }
            other => panic!("Expected TemplateSyntax, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_placeholder_with_path() {
        let err = parse_template_str(r#"{"a": "{oops"}"#).unwrap_err();
        match err {
            Xls2JsonError::TemplateSyntax(msg) => assert!(msg.starts_with("$.a"), "got: {msg}"),
            other => panic!("Expected TemplateSyntax, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_template_str("{not json"),
            Err(Xls2JsonError::Json(_))
        ));
    }

    #[test]
    fn test_identity_template_errors() {
        assert!(identity_template(&[]).is_err());
        assert!(identity_template(&["a:b".to_string()]).is_err());
        assert!(identity_template(&["{a}".to_string()]).is_err());
    }

    #[test]
    fn test_parse_template_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"user_id": "{{id}}"}}"#).unwrap();
        let t = parse_template_file(file.path()).unwrap();
        assert_eq!(
            extract_labels(&t).into_iter().collect::<Vec<_>>(),
            vec!["id"]
        );
    }
}
