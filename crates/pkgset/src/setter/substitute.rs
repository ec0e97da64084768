//! Rewriting the fields that reference a setter.
//!
//! Substitution works on the document text line by line so that comments,
//! formatting and every untouched field keep their exact bytes.

use serde_yaml::Value;

use super::reference::{setter_reference, split_comment, split_eol};
use crate::package::{Filter, PackageError, ResourceDocument, Result as PackageResult};
use crate::schema::{SchemaRegistry, SchemaType, SetterDefinition, SetterValue};

/// A referencing field whose shape does not fit the setter's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    /// 1-based line number within the document.
    pub line: usize,
    pub expected: &'static str,
    pub found: &'static str,
}

impl std::fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: setter holds a {} but the field is a {}",
            self.line, self.expected, self.found
        )
    }
}

impl std::error::Error for ShapeMismatch {}

/// The parts of a line holding a field.
#[derive(Debug, PartialEq, Eq)]
struct FieldLine<'a> {
    /// Indentation, sequence markers, key, anchors and tags preceding the value.
    prefix: &'a str,
    /// The value token without surrounding whitespace.
    value: &'a str,
    /// Whitespace between the value and the comment.
    gap: &'a str,
    /// Column of the key, or of the item for a bare sequence item.
    column: usize,
}

impl<'a> FieldLine<'a> {
    fn parse(content: &'a str) -> Self {
        let bytes = content.as_bytes();
        let mut pos = skip_spaces(bytes, 0);
        while bytes.get(pos) == Some(&b'-') && matches!(bytes.get(pos + 1), None | Some(b' ' | b'\t'))
        {
            pos = skip_spaces(bytes, pos + 1);
        }
        let column = pos;

        let mut value_start = match find_key_end(bytes, pos) {
            Some(colon) => skip_spaces(bytes, colon + 1),
            None => pos,
        };

        // Anchors and tags stay with the node
        while matches!(bytes.get(value_start), Some(b'&' | b'!')) {
            match content[value_start..].find(|c: char| c == ' ' || c == '\t') {
                Some(offset) => value_start = skip_spaces(bytes, value_start + offset),
                None => break,
            }
        }

        let rest = &content[value_start..];
        let value = rest.trim_end();
        Self {
            prefix: &content[..value_start],
            value,
            gap: &rest[value.len()..],
            column,
        }
    }

    fn is_bare_item(&self) -> bool {
        self.prefix.trim_start().starts_with('-') && !self.prefix.trim_end().ends_with(':')
    }

    fn is_block_scalar(&self) -> bool {
        self.value.starts_with(['|', '>'])
    }

    /// Indentation the lines of a block scalar body must exceed.
    fn block_parent(&self) -> usize {
        if self.is_bare_item() {
            self.prefix.len() - self.prefix.trim_start().len()
        } else {
            self.column
        }
    }
}

fn skip_spaces(bytes: &[u8], mut pos: usize) -> usize {
    while matches!(bytes.get(pos), Some(b' ' | b'\t')) {
        pos += 1;
    }
    pos
}

fn is_key_colon(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b':' && matches!(bytes.get(i + 1), None | Some(b' ' | b'\t'))
}

/// Returns the index of the `:` ending a mapping key that starts at `start`.
fn find_key_end(bytes: &[u8], start: usize) -> Option<usize> {
    match bytes.get(start).copied() {
        Some(q) if q == b'"' || q == b'\'' => {
            let mut i = start + 1;
            while i < bytes.len() && bytes[i] != q {
                if q == b'"' && bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            let colon = skip_spaces(bytes, i + 1);
            (colon < bytes.len() && is_key_colon(bytes, colon)).then_some(colon)
        }
        Some(b'[' | b'{' | b'|' | b'>' | b'*') | None => None,
        Some(_) => (start..bytes.len()).find(|&i| is_key_colon(bytes, i)),
    }
}

/// What is nested under a field on the following lines.
#[derive(Debug, PartialEq, Eq)]
enum Children {
    None,
    /// A block sequence; `indent` and the token of the first item are kept
    /// to lay out replacement items the same way.
    Sequence { indent: usize, first_item: String },
    Other,
}

/// Finds the lines nested under the field at `column`, starting at `start`.
/// Returns the index after the last nested line. Trailing blank and comment
/// lines are not included.
fn nested_block(lines: &[&str], start: usize, column: usize) -> (usize, Children) {
    let mut end = start;
    let mut children = Children::None;

    for (offset, line) in lines[start..].iter().enumerate() {
        let (body, _) = split_eol(line);
        let trimmed = body.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let indent = body.len() - trimmed.len();
        let is_item = trimmed == "-" || trimmed.starts_with("- ");
        let nested = match children {
            Children::Other => indent > column,
            _ => indent > column || (indent == column && is_item),
        };
        if !nested {
            break;
        }

        if children == Children::None {
            children = if is_item {
                let (content, _) = split_comment(body);
                let item = FieldLine::parse(content);
                let first_item = if item.is_bare_item() {
                    item.value.to_string()
                } else {
                    String::new()
                };
                Children::Sequence { indent, first_item }
            } else {
                Children::Other
            };
        }
        end = start + offset + 1;
    }

    (end, children)
}

/// Finds the end of a block scalar body starting at `start`. Body lines are
/// blank or indented deeper than `parent`; trailing blank lines are left out.
fn block_scalar_end(lines: &[&str], start: usize, parent: usize) -> usize {
    let mut end = start;
    for (offset, line) in lines[start..].iter().enumerate() {
        let (body, _) = split_eol(line);
        let trimmed = body.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        if body.len() - trimmed.len() <= parent {
            break;
        }
        end = start + offset + 1;
    }
    end
}

/// Index of the line following the node on `lines[index]`, passing over the
/// body when `content` opens a block scalar.
pub(crate) fn next_node_line(lines: &[&str], index: usize, content: &str) -> usize {
    let field = FieldLine::parse(content);
    if field.is_block_scalar() {
        block_scalar_end(lines, index + 1, field.block_parent())
    } else {
        index + 1
    }
}

/// Whether a line holds a node, as opposed to being blank or a full-line
/// comment.
pub(crate) fn holds_node(content: &str) -> bool {
    !content.trim().is_empty()
}

fn reads_as_string(s: &str) -> bool {
    matches!(serde_yaml::from_str::<Value>(s), Ok(Value::String(_)))
}

fn needs_quotes(value: &str, flow: bool) -> bool {
    if value.is_empty() || value.trim() != value || value.contains(|c: char| c.is_control()) {
        return true;
    }
    if flow && value.contains(|c: char| matches!(c, ',' | '[' | ']' | '{' | '}')) {
        return true;
    }

    // A plain scalar must read back as itself
    match serde_yaml::from_str::<Value>(value) {
        Ok(Value::String(s)) => s != value,
        Ok(Value::Number(_) | Value::Bool(_) | Value::Null) => false,
        _ => true,
    }
}

fn reads_as_number_or_bool(s: &str) -> bool {
    s.trim() == s && matches!(serde_yaml::from_str::<Value>(s), Ok(Value::Number(_) | Value::Bool(_)))
}

fn double_quoted(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Renders a scalar in the quoting style of the token it replaces. A declared
/// schema type takes precedence over the style of the original token.
fn format_scalar(
    value: &str,
    original: &str,
    flow: bool,
    schema_type: Option<SchemaType>,
) -> String {
    let quoted = matches!(original.as_bytes().first(), Some(b'"' | b'\''));
    match schema_type {
        Some(SchemaType::Integer | SchemaType::Number | SchemaType::Boolean)
            if reads_as_number_or_bool(value) =>
        {
            return value.to_string();
        }
        Some(SchemaType::String) if !quoted && !reads_as_string(value) => {
            return double_quoted(value);
        }
        _ => {}
    }

    match original.as_bytes().first() {
        Some(b'"') => double_quoted(value),
        Some(b'\'') if !value.contains(|c: char| c.is_control()) => {
            format!("'{}'", value.replace('\'', "''"))
        }
        Some(b'\'') => double_quoted(value),
        _ if needs_quotes(value, flow) => double_quoted(value),
        // Keep string fields strings, e.g. a tag "v1" set to "1.0"
        _ if !original.is_empty() && reads_as_string(original) && !reads_as_string(value) => {
            double_quoted(value)
        }
        _ => value.to_string(),
    }
}

fn format_flow(items: &[String], original: &str) -> String {
    let first = original
        .trim_start_matches('[')
        .split(',')
        .next()
        .unwrap_or("")
        .trim();
    let rendered: Vec<String> = items
        .iter()
        .map(|item| format_scalar(item, first, true, None))
        .collect();
    format!("[{}]", rendered.join(", "))
}

fn push_field(out: &mut String, field: &FieldLine<'_>, value: &str, comment: &str, eol: &str) {
    out.push_str(field.prefix);
    out.push_str(value);
    out.push_str(if field.gap.is_empty() { " " } else { field.gap });
    out.push_str(comment);
    out.push_str(eol);
}

/// Rewrites every field of `text` that references the setter `definition`
/// to the value it holds.
///
/// Returns the new text and the number of referencing fields; a field counts
/// even when it already holds the value. Full-line comments and the bodies of
/// block scalars are text, not fields, and are copied as they are.
pub fn substitute(
    text: &str,
    definition: &SetterDefinition,
) -> Result<(String, usize), ShapeMismatch> {
    let name = definition.name.as_str();
    let value = &definition.value;
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut out = String::with_capacity(text.len());
    let mut count = 0;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let (body, eol) = split_eol(line);
        let (content, comment) = split_comment(body);
        let referenced = comment.filter(|c| {
            holds_node(content) && setter_reference(c).as_deref() == Some(name)
        });
        let Some(comment) = referenced else {
            let next = next_node_line(&lines, i, content);
            lines[i..next].iter().for_each(|line| out.push_str(line));
            i = next;
            continue;
        };

        let field = FieldLine::parse(content);
        let mismatch = |found| ShapeMismatch {
            line: i + 1,
            expected: value.form(),
            found,
        };

        let block_scalar = field.is_block_scalar();
        let (block_end, children) = if block_scalar {
            (block_scalar_end(&lines, i + 1, field.block_parent()), Children::None)
        } else if field.value.is_empty() {
            nested_block(&lines, i + 1, field.column)
        } else {
            (i + 1, Children::None)
        };

        if field.value.starts_with('{') || children == Children::Other {
            return Err(mismatch("mapping"));
        }
        let is_sequence =
            field.value.starts_with('[') || matches!(children, Children::Sequence { .. });

        match value {
            SetterValue::Scalar(new) => {
                if is_sequence {
                    return Err(mismatch("sequence"));
                }
                // Block scalars are replaced by a double-quoted scalar
                let original = if block_scalar { "\"" } else { field.value };
                let rendered = format_scalar(new, original, false, definition.schema_type);
                push_field(&mut out, &field, &rendered, comment, eol);
                i = block_end.max(i + 1);
            }
            SetterValue::List(items) => match &children {
                Children::Sequence { indent, first_item } if !items.is_empty() => {
                    let newline = if eol.is_empty() { "\n" } else { eol };
                    out.push_str(body);
                    out.push_str(newline);
                    for item in items {
                        out.push_str(&" ".repeat(*indent));
                        out.push_str("- ");
                        out.push_str(&format_scalar(item, first_item, false, None));
                        out.push_str(newline);
                    }
                    i = block_end;
                }
                _ if is_sequence || field.value.is_empty() => {
                    push_field(&mut out, &field, &format_flow(items, field.value), comment, eol);
                    i = block_end.max(i + 1);
                }
                _ => return Err(mismatch("scalar")),
            },
        }
        count += 1;
    }

    Ok((out, count))
}

/// Pipeline filter setting every field that references one setter to the
/// value registered for it.
pub struct SetterFilter<'r> {
    name: String,
    registry: &'r SchemaRegistry,
    count: usize,
}

impl<'r> SetterFilter<'r> {
    pub fn new(name: impl Into<String>, registry: &'r SchemaRegistry) -> Self {
        Self {
            name: name.into(),
            registry,
            count: 0,
        }
    }

    /// Number of fields set so far.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Filter for SetterFilter<'_> {
    fn filter(&mut self, mut documents: Vec<ResourceDocument>) -> PackageResult<Vec<ResourceDocument>> {
        let registry = self.registry;
        let definition = registry
            .get(&self.name)
            .ok_or_else(|| PackageError::Stage(format!("setter '{}' is not registered", self.name)))?;

        for document in documents.iter_mut() {
            let (content, count) =
                substitute(&document.content, definition).map_err(|e| {
                    PackageError::Filter {
                        path: document.path.clone(),
                        message: format!("setter '{}': {}", self.name, e),
                    }
                })?;

            if count > 0 {
                document.content = content;
                document.parse()?;
                self.count += count;
            }
        }

        Ok(documents)
    }
}
