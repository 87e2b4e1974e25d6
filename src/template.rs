//! Path template interpolation
//!
//! Handles the `{param}` placeholders OpenAPI uses in operation paths,
//! e.g. `/lmp/{iso}/node`.

use crate::error::{Error, Result};
use crate::types::StringMap;
use regex::Regex;
use std::sync::LazyLock;

/// Regex for matching path placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*([a-zA-Z_][a-zA-Z0-9_\-]*)\s*\}").unwrap());

/// Render a path template, percent-encoding each substituted value.
///
/// Every placeholder must have a value; the names of all missing ones are
/// reported together.
pub fn render_path(template: &str, values: &StringMap) -> Result<String> {
    let mut missing = Vec::new();

    let rendered = PLACEHOLDER_REGEX.replace_all(template, |cap: &regex::Captures<'_>| {
        let name = &cap[1];
        match values.get(name) {
            Some(value) => encode_segment(value),
            None => {
                missing.push(name.to_string());
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(rendered.into_owned())
    } else {
        Err(Error::config(format!(
            "Path '{template}' has no value for: {}",
            missing.join(", ")
        )))
    }
}

/// Extract all placeholder names from a path template
pub fn extract_placeholders(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Turn an API path into a method name: `/dalmp/node` -> `dalmp_node`
pub fn path_to_name(path: &str) -> String {
    let name = PLACEHOLDER_REGEX.replace_all(path, "$1");
    name.replace(['/', '-', '.'], "_")
        .trim_matches('_')
        .to_string()
}

fn encode_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> StringMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple() {
        let result = render_path("/lmp/{iso}/node", &values(&[("iso", "ercot")])).unwrap();
        assert_eq!(result, "/lmp/ercot/node");
    }

    #[test]
    fn test_render_multiple_and_spaces() {
        let result = render_path(
            "/{ iso }/{node}",
            &values(&[("iso", "pjm"), ("node", "WESTERN HUB")]),
        )
        .unwrap();
        assert_eq!(result, "/pjm/WESTERN%20HUB");
    }

    #[test]
    fn test_render_encodes_slashes() {
        let result = render_path("/node/{node}", &values(&[("node", "A/B")])).unwrap();
        assert_eq!(result, "/node/A%2FB");
    }

    #[test]
    fn test_render_missing() {
        let err = render_path("/{iso}/{node}", &values(&[])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("iso"));
        assert!(msg.contains("node"));
    }

    #[test]
    fn test_render_no_placeholders() {
        assert_eq!(render_path("/dalmp", &values(&[])).unwrap(), "/dalmp");
    }

    #[test]
    fn test_extract_placeholders() {
        assert_eq!(
            extract_placeholders("/{iso}/lmp/{node_id}"),
            vec!["iso".to_string(), "node_id".to_string()]
        );
    }

    #[test]
    fn test_path_to_name() {
        assert_eq!(path_to_name("/dalmp/node"), "dalmp_node");
        assert_eq!(path_to_name("/dalmp/"), "dalmp");
        assert_eq!(path_to_name("/rt-lmp/{iso}"), "rt_lmp_iso");
    }
}
