//! Code Generation
//!
//! Renders a [`SchemaRegistry`] for consumers that do not link this crate:
//! - `typescript`: `export interface` declarations plus a `paths` table
//! - `json-schema`: a draft-07 document with one definition per record
//! - `json`: the raw registry catalog
//!
//! Emitters only read the registry; nothing here can change a declaration.
//! Drift detection compares a previously generated file against a fresh
//! rendering, line by line.

pub mod json_schema;
pub mod typescript;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use crate::error::{Result, SchemaError};
use crate::registry::SchemaRegistry;

// =============================================================================
// Targets & Options
// =============================================================================

/// Output format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    #[serde(rename = "typescript")]
    TypeScript,
    JsonSchema,
    Json,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::TypeScript => "typescript",
            Target::JsonSchema => "json-schema",
            Target::Json => "json",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "typescript" | "ts" => Ok(Target::TypeScript),
            "json-schema" | "jsonschema" => Ok(Target::JsonSchema),
            "json" => Ok(Target::Json),
            other => Err(SchemaError::UnknownTarget(other.to_string())),
        }
    }
}

/// Rendering knobs shared by every target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Spaces per indentation level
    pub indent: usize,
    /// Emit parameter and field descriptions as doc comments
    pub descriptions: bool,
    /// Single-line JSON output (JSON targets only)
    pub compact: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            descriptions: true,
            compact: false,
        }
    }
}

// =============================================================================
// Generated Output
// =============================================================================

/// Output from code generation
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Generated text, newline terminated
    pub code: String,
    /// Number of record types emitted
    pub type_count: usize,
}

/// Render the registry for a target
pub fn generate(registry: &SchemaRegistry, target: Target, options: &RenderOptions) -> Result<GeneratedOutput> {
    let code = match target {
        Target::TypeScript => typescript::render(registry, options),
        Target::JsonSchema => to_json_text(&json_schema::document(registry, options), options)?,
        Target::Json => to_json_text(&registry.to_json()?, options)?,
    };

    tracing::debug!(export = %target, bytes = code.len(), "generated export");

    Ok(GeneratedOutput {
        code,
        type_count: registry.records().len(),
    })
}

fn to_json_text(value: &serde_json::Value, options: &RenderOptions) -> Result<String> {
    let mut text = if options.compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    text.push('\n');
    Ok(text)
}

// =============================================================================
// Drift Detection
// =============================================================================

/// Difference between a file on disk and a fresh rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drift {
    /// Lines only in the fresh rendering
    pub added: usize,
    /// Lines only in the file on disk
    pub removed: usize,
    /// Unified diff, on-disk side first
    pub diff: String,
}

impl Drift {
    pub fn summary(&self) -> String {
        format!("{} line(s) added, {} line(s) removed", self.added, self.removed)
    }
}

/// Compare `on_disk` with `generated`; `None` when they are identical.
///
/// `label` names the file in the diff header.
pub fn detect_drift(on_disk: &str, generated: &str, label: &str) -> Option<Drift> {
    if on_disk == generated {
        return None;
    }

    let diff = TextDiff::from_lines(on_disk, generated);
    let mut added = 0;
    let mut removed = 0;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => removed += 1,
            ChangeTag::Equal => {}
        }
    }

    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header(&format!("{} (on disk)", label), &format!("{} (generated)", label))
        .to_string();

    Some(Drift {
        added,
        removed,
        diff: unified,
    })
}
