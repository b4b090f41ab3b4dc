//! Template parameter extraction.
//!
//! Parses a Mustache-style template into a placeholder tree, then derives the
//! structural object type describing the variables the template consumes:
//!
//! - `{{name}}` — plain variable, typed `String`. The content between the
//!   braces (trimmed) is the variable name verbatim; embedded dots are not
//!   treated as path traversal.
//! - `{{#items}}...{{/items}}` — section: repeats per element, so a section
//!   with inner variables becomes `Array(Object)`; with no inner variables
//!   it is just a truthiness gate, `Boolean`.
//! - `{{^flag}}...{{/flag}}` — inverted section: renders zero-or-one times,
//!   so the derived type is wrapped `Optional` instead of `Array`.
//! - `{{>partial}}` — logged, not modeled.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diag::Diagnostics;
use crate::schema::SchemaType;
use indexmap::IndexMap;

/// Placeholder tree node. Ephemeral: built per template string, consumed once
/// to produce an `Object` type, then discarded.
#[derive(Debug, Clone)]
struct Node {
    name: String,
    is_section: bool,
    is_inverted: bool,
    children: Vec<Node>,
}

impl Node {
    fn variable(name: &str) -> Self {
        Node {
            name: name.to_string(),
            is_section: false,
            is_inverted: false,
            children: Vec::new(),
        }
    }

    fn section(name: &str, inverted: bool) -> Self {
        Node {
            name: name.to_string(),
            is_section: true,
            is_inverted: inverted,
            children: Vec::new(),
        }
    }
}

static TEMPLATE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{[^{}]*\}\}").expect("template tag regex"));

/// Cheap probe used by JSON inference to decide whether a string leaf is
/// worth running through the extractor.
pub fn looks_like_template(text: &str) -> bool {
    TEMPLATE_TAG.is_match(text)
}

/// Derive the parameter object type for a template string. An empty template
/// yields an empty `Object`, never an error.
pub fn extract_schema(template: &str, diag: &dyn Diagnostics) -> SchemaType {
    let nodes = parse_nodes(template, diag);
    nodes_to_object(&nodes)
}

/// Tokenize into full `{{...}}` tags and maximal runs of surrounding text,
/// left to right, and fold the tags into a tree with a scope stack.
fn parse_nodes(template: &str, diag: &dyn Diagnostics) -> Vec<Node> {
    // Bottom of the stack is the root scope; open sections push a scope.
    let mut stack: Vec<Node> = vec![Node::section("", false)];

    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            // Unterminated tag: the remainder is plain text.
            break;
        };
        let content = after_open[..close].trim();
        rest = &after_open[close + 2..];

        if let Some(name) = content.strip_prefix('>') {
            diag.log(
                "template",
                &format!("partial `{{{{>{}}}}}` is not modeled structurally", name.trim()),
            );
        } else if let Some(name) = content.strip_prefix('#') {
            stack.push(Node::section(name.trim(), false));
        } else if let Some(name) = content.strip_prefix('^') {
            stack.push(Node::section(name.trim(), true));
        } else if content.starts_with('/') {
            // Close the innermost scope; a stray close tag is tolerated.
            if stack.len() > 1 {
                let done = stack.pop().expect("open scope");
                stack.last_mut().expect("root scope").children.push(done);
            }
        } else if !content.is_empty() {
            stack
                .last_mut()
                .expect("root scope")
                .children
                .push(Node::variable(content));
        }
    }

    // Unclosed sections are closed at end of input.
    while stack.len() > 1 {
        let done = stack.pop().expect("open scope");
        stack.last_mut().expect("root scope").children.push(done);
    }
    stack.pop().expect("root scope").children
}

/// Convert a node list into an `Object`. First occurrence of a field name
/// wins: a later plain-variable use never overwrites a section-derived type,
/// and vice versa.
fn nodes_to_object(nodes: &[Node]) -> SchemaType {
    let mut fields: IndexMap<String, SchemaType> = IndexMap::new();
    for node in nodes {
        if fields.contains_key(&node.name) {
            continue;
        }
        let ty = if node.is_section {
            if node.children.is_empty() {
                // Pure gate, no context variables.
                if node.is_inverted {
                    SchemaType::optional(SchemaType::Boolean)
                } else {
                    SchemaType::Boolean
                }
            } else {
                let inner = nodes_to_object(&node.children);
                if node.is_inverted {
                    // Renders zero-or-one times; no list semantics.
                    SchemaType::optional(inner)
                } else {
                    SchemaType::array(inner)
                }
            }
        } else {
            SchemaType::String
        };
        fields.insert(node.name.clone(), ty);
    }
    SchemaType::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{CollectingDiagnostics, NullDiagnostics};

    fn extract(template: &str) -> SchemaType {
        extract_schema(template, &NullDiagnostics)
    }

    #[test]
    fn plain_variables_become_string_fields() {
        let t = extract("{{a}} and {{b}}, then {{c}}");
        assert_eq!(
            t,
            SchemaType::object(vec![
                ("a".to_string(), SchemaType::String),
                ("b".to_string(), SchemaType::String),
                ("c".to_string(), SchemaType::String),
            ])
        );
    }

    #[test]
    fn empty_template_yields_empty_object() {
        assert_eq!(extract(""), SchemaType::empty_object());
        assert_eq!(extract("no tags here"), SchemaType::empty_object());
    }

    #[test]
    fn dotted_names_are_verbatim() {
        let t = extract("{{user.name}}");
        let fields = t.as_object().unwrap();
        assert_eq!(fields.get("user.name"), Some(&SchemaType::String));
    }

    #[test]
    fn section_with_children_is_array_of_object() {
        let t = extract("{{#items}}{{name}}{{/items}}");
        assert_eq!(
            t,
            SchemaType::object(vec![(
                "items".to_string(),
                SchemaType::array(SchemaType::object(vec![(
                    "name".to_string(),
                    SchemaType::String
                )])),
            )])
        );
    }

    #[test]
    fn empty_inverted_section_is_optional_boolean() {
        let t = extract("{{^flag}}fallback text{{/flag}}");
        assert_eq!(
            t,
            SchemaType::object(vec![(
                "flag".to_string(),
                SchemaType::optional(SchemaType::Boolean),
            )])
        );
    }

    #[test]
    fn inverted_section_with_children_is_optional_object() {
        let t = extract("{{^user}}{{fallback}}{{/user}}");
        assert_eq!(
            t,
            SchemaType::object(vec![(
                "user".to_string(),
                SchemaType::optional(SchemaType::object(vec![(
                    "fallback".to_string(),
                    SchemaType::String
                )])),
            )])
        );
    }

    #[test]
    fn empty_section_is_boolean_gate() {
        let t = extract("{{#debug}}verbose{{/debug}}");
        let fields = t.as_object().unwrap();
        assert_eq!(fields.get("debug"), Some(&SchemaType::Boolean));
    }

    #[test]
    fn first_occurrence_wins() {
        // Section first, plain variable later: the section type stays.
        let t = extract("{{#x}}{{y}}{{/x}} {{x}}");
        let fields = t.as_object().unwrap();
        assert!(matches!(fields.get("x"), Some(SchemaType::Array(_))));

        // Plain variable first: the later section does not overwrite it.
        let t = extract("{{x}} {{#x}}{{y}}{{/x}}");
        let fields = t.as_object().unwrap();
        assert_eq!(fields.get("x"), Some(&SchemaType::String));
    }

    #[test]
    fn partial_is_logged_not_modeled() {
        let diag = CollectingDiagnostics::new();
        let t = extract_schema("{{>header}} {{name}}", &diag);
        let fields = t.as_object().unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields.contains_key("name"));
        assert!(diag.contains("header"));
    }

    #[test]
    fn unclosed_section_closes_at_end_of_input() {
        let t = extract("{{#items}}{{name}}");
        let fields = t.as_object().unwrap();
        assert!(matches!(fields.get("items"), Some(SchemaType::Array(_))));
    }

    #[test]
    fn stray_close_tag_is_tolerated() {
        let t = extract("{{/nothing}}{{a}}");
        let fields = t.as_object().unwrap();
        assert_eq!(fields.get("a"), Some(&SchemaType::String));
    }

    #[test]
    fn template_probe() {
        assert!(looks_like_template("Hello {{name}}"));
        assert!(!looks_like_template("plain text"));
        assert!(!looks_like_template("single {brace}"));
    }
}
