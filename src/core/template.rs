//! Templates and their expansion against a row context
//!
//! A template is either a format string (`"{first} {last}"`) or an ordered
//! mapping of output keys to nested templates. Expansion keeps the shape and
//! substitutes every placeholder.

use crate::core::format_spec::FormatSpec;
use crate::error::{Xls2JsonError, Xls2JsonResult};
use crate::types::{CellValue, Record};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Named values available to one row's expansion
pub type RowContext<'a> = HashMap<&'a str, CellValue>;

/// A piece of a parsed format string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Field {
        name: String,
        spec: Option<FormatSpec>,
    },
}

/// A format string parsed once at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatString {
    raw: String,
    segments: Vec<Segment>,
}

impl FormatString {
    /// Parse `{name}` / `{name:spec}` placeholders; `{{` and `}}` are
    /// literal braces.
    pub fn parse(raw: &str) -> Xls2JsonResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|(_, next)| *next) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|(_, next)| *next) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(Xls2JsonError::TemplateSyntax(format!(
                        "single '}}' at position {pos} in \"{raw}\""
                    )));
                }
                '{' => {
                    let mut field = String::new();
                    let mut closed = false;
                    for (inner_pos, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(Xls2JsonError::TemplateSyntax(format!(
                                    "nested '{{' at position {inner_pos} in \"{raw}\""
                                )));
                            }
                            _ => field.push(inner),
                        }
                    }
                    if !closed {
                        return Err(Xls2JsonError::TemplateSyntax(format!(
                            "unclosed '{{' at position {pos} in \"{raw}\""
                        )));
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_field(&field, raw)?);
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in order of appearance
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute every placeholder from `context`
    pub fn render(&self, context: &RowContext<'_>) -> Xls2JsonResult<String> {
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { name, spec } => {
                    let value = context.get(name.as_str()).ok_or_else(|| {
                        Xls2JsonError::UnresolvedPlaceholder { name: name.clone() }
                    })?;
                    match spec {
                        Some(spec) => out.push_str(&spec.apply(value)?),
                        None => out.push_str(&value.to_string()),
                    }
                }
            }
        }
        Ok(out)
    }
}

fn parse_field(field: &str, raw: &str) -> Xls2JsonResult<Segment> {
    let (name, spec) = match field.split_once(':') {
        Some((name, spec)) => (name, Some(spec)),
        None => (field, None),
    };
    if name.is_empty() {
        return Err(Xls2JsonError::TemplateSyntax(format!(
            "empty placeholder name in \"{raw}\""
        )));
    }
    let spec = match spec {
        Some(spec) if !spec.is_empty() => Some(FormatSpec::parse(spec)?),
        _ => None,
    };
    Ok(Segment::Field {
        name: name.to_string(),
        spec,
    })
}

/// Output structure: a format string or an ordered mapping of sub-templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    Leaf(FormatString),
    Node(IndexMap<String, Template>),
}

impl Template {
    pub fn leaf(raw: &str) -> Xls2JsonResult<Self> {
        Ok(Template::Leaf(FormatString::parse(raw)?))
    }

    /// Every format string in the template, depth first
    pub fn leaves(&self) -> Vec<&FormatString> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a FormatString>) {
        match self {
            Template::Leaf(format) => out.push(format),
            Template::Node(children) => {
                for child in children.values() {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

/// Expand `template` against `context`, preserving keys and key order
pub fn expand(template: &Template, context: &RowContext<'_>) -> Xls2JsonResult<Record> {
    match template {
        Template::Leaf(format) => Ok(Record::Text(format.render(context)?)),
        Template::Node(children) => {
            let mut record = IndexMap::with_capacity(children.len());
            for (key, child) in children {
                record.insert(key.clone(), expand(child, context)?);
            }
            Ok(Record::Map(record))
        }
    }
}
