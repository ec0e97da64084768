//! Setter references carried by line comments in resource documents.
//!
//! A field refers to a setter with a trailing comment holding a JSON object:
//!
//! ```yaml
//! image: nginx:v1 # {"$ref":"#/definitions/io.k8s.cli.setters.image-tag"}
//! replicas: 3 # {"$kpt-set":"replicas"}
//! env: dev # {"$openapi":"env"}
//! ```

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::substitute::{holds_node, next_node_line};
use crate::package::ResourceDocument;
use crate::schema::SETTER_DEFINITION_PREFIX;

static RE_SETTER_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#/definitions/io\.k8s\.cli\.setters\.(.+)$").unwrap());

/// Returns the setter named by a comment, if it holds a setter reference.
///
/// `comment` may include the leading `#`.
pub fn setter_reference(comment: &str) -> Option<String> {
    let body = comment.trim_start_matches('#').trim();
    if !body.starts_with('{') {
        return None;
    }

    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(body).ok()?;

    let short_form = ["$kpt-set", "$openapi"]
        .iter()
        .find_map(|key| object.get(*key).and_then(|v| v.as_str()));
    if let Some(name) = short_form {
        return Some(name.to_string());
    }

    let reference = object.get("$ref").and_then(|v| v.as_str())?;
    RE_SETTER_REF
        .captures(reference)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Builds the comment that references a setter.
pub fn reference_comment(name: &str) -> String {
    format!(
        "# {{\"$ref\":\"#/definitions/{}{}\"}}",
        SETTER_DEFINITION_PREFIX, name
    )
}

/// Splits a line (without line break) into its content and trailing comment.
///
/// A `#` starts a comment when it is outside quotes and at the start of the
/// line or preceded by whitespace.
pub(crate) fn split_comment(line: &str) -> (&str, Option<&str>) {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    let mut last_significant: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(b'"') => {
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if b == b'"' {
                    quote = None;
                    last_significant = Some(b);
                }
            }
            Some(_) => {
                if b == b'\'' {
                    // '' is an escaped quote inside single quotes
                    if bytes.get(i + 1) == Some(&b'\'') {
                        i += 2;
                        continue;
                    }
                    quote = None;
                    last_significant = Some(b);
                }
            }
            None => {
                let after_space = i == 0 || bytes[i - 1] == b' ' || bytes[i - 1] == b'\t';
                if b == b'#' && after_space {
                    return (&line[..i], Some(&line[i..]));
                }

                let token_start = after_space || matches!(bytes[i - 1], b'[' | b'{' | b',');
                let opens_scalar = matches!(
                    last_significant,
                    None | Some(b':' | b'-' | b'[' | b'{' | b',' | b'?')
                );
                if (b == b'"' || b == b'\'') && token_start && opens_scalar {
                    quote = Some(b);
                }

                if !b.is_ascii_whitespace() {
                    last_significant = Some(b);
                }
            }
        }
        i += 1;
    }

    (line, None)
}

/// Splits the line break off a line.
pub(crate) fn split_eol(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Counts the fields referencing each setter across documents.
///
/// Full-line comments and references inside block scalar bodies are not
/// fields and are not counted.
pub fn count_references<'a, I>(documents: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a ResourceDocument>,
{
    let mut counts = BTreeMap::new();
    for document in documents {
        let lines: Vec<&str> = document.content.split_inclusive('\n').collect();
        let mut i = 0;
        while i < lines.len() {
            let (body, _) = split_eol(lines[i]);
            let (content, comment) = split_comment(body);
            let reference = comment
                .filter(|_| holds_node(content))
                .and_then(setter_reference);
            if let Some(name) = reference {
                *counts.entry(name).or_insert(0) += 1;
            }
            i = next_node_line(&lines, i, content);
        }
    }
    counts
}
