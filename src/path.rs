//! Path templates
//!
//! A template such as `/pet/{petId}/uploadImage` is a list of literal
//! segments and named placeholders. Templates render into concrete paths and
//! match concrete paths back into placeholder values.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\{([A-Za-z_][A-Za-z0-9_]*)\}$").expect("placeholder pattern is valid")
    })
}

/// One segment of a path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed path template
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathTemplate {
    raw: String,
}

impl PathTemplate {
    /// Parse a template, rejecting malformed placeholders
    pub fn parse(template: impl Into<String>) -> Result<Self> {
        let raw = template.into();
        let invalid = |reason: &str| SchemaError::InvalidTemplate {
            template: raw.clone(),
            reason: reason.to_string(),
        };

        if !raw.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut seen: Vec<&str> = Vec::new();
        for part in raw[1..].split('/') {
            if let Some(caps) = placeholder_pattern().captures(part) {
                let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                if seen.contains(&name) {
                    return Err(invalid(&format!("placeholder '{}' appears twice", name)));
                }
                seen.push(name);
            } else if part.contains('{') || part.contains('}') {
                return Err(invalid(&format!("malformed placeholder segment '{}'", part)));
            }
        }

        Ok(Self { raw })
    }

    /// The template text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Segments in order. The root template `/` has a single empty literal.
    pub fn segments(&self) -> Vec<Segment> {
        self.raw[1..]
            .split('/')
            .map(|part| match placeholder_pattern().captures(part) {
                Some(caps) => Segment::Param(caps[1].to_string()),
                None => Segment::Literal(part.to_string()),
            })
            .collect()
    }

    /// Placeholder names in order of appearance
    pub fn param_names(&self) -> Vec<String> {
        self.segments()
            .into_iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some(name),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Number of literal segments; higher wins when several templates match
    pub fn specificity(&self) -> usize {
        self.segments()
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Substitute placeholders, returning the unencoded segment values
    pub fn render_segments(&self, values: &BTreeMap<String, String>) -> Result<Vec<String>> {
        self.segments()
            .into_iter()
            .map(|segment| match segment {
                Segment::Literal(text) => Ok(text),
                Segment::Param(name) => {
                    values
                        .get(&name)
                        .cloned()
                        .ok_or_else(|| SchemaError::MissingParameter {
                            name,
                            location: crate::endpoint::ParamLocation::Path,
                        })
                }
            })
            .collect()
    }

    /// Substitute placeholders into a percent-encoded concrete path
    pub fn render(&self, values: &BTreeMap<String, String>) -> Result<String> {
        let segments = self.render_segments(values)?;
        Ok(segments
            .iter()
            .map(|s| format!("/{}", utf8_percent_encode(s, SEGMENT)))
            .collect())
    }

    /// Match a concrete path, returning decoded placeholder values.
    ///
    /// Any query string or fragment on `path` is ignored.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let concrete = path.strip_prefix('/')?;

        let segments = self.segments();
        let parts: Vec<&str> = concrete.split('/').collect();
        if parts.len() != segments.len() {
            return None;
        }

        let mut values = BTreeMap::new();
        for (segment, part) in segments.iter().zip(parts) {
            match segment {
                Segment::Literal(text) => {
                    if text != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    let decoded = percent_decode_str(part).decode_utf8().ok()?;
                    values.insert(name.clone(), decoded.into_owned());
                }
            }
        }
        Some(values)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for PathTemplate {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<PathTemplate> for String {
    fn from(template: PathTemplate) -> Self {
        template.raw
    }
}
