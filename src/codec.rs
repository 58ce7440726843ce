//! Compact transport form for locale trees.
//!
//! The compact form is minified JSON with the source key order preserved, so a
//! payload can be expanded without any side channel. Replies from the service
//! come back in the same shape, sometimes wrapped in a Markdown code fence.

use crate::error::{PipelineError, Result};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

/// Reversible, size-reduced serialization of a locale tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactPayload(String);

impl CompactPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CompactPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static CODE_FENCE_REGEX: OnceLock<Regex> = OnceLock::new();

/// Compress JSON source text into its compact transport form.
///
/// Nesting is limited to 128 levels (serde_json's recursion limit); deeper
/// documents fail with `MalformedInput` instead of risking a stack overflow.
pub fn compress(source: &str) -> Result<CompactPayload> {
    let tree = parse(source)?;
    let payload = compress_value(&tree);
    debug!(
        "Compressed locale from {} to {} bytes",
        source.len(),
        payload.len()
    );
    Ok(payload)
}

/// Compress an already parsed tree.
pub fn compress_value(tree: &Value) -> CompactPayload {
    // Display on Value is the compact serializer and cannot fail.
    CompactPayload(tree.to_string())
}

/// Expand a compact (or raw) payload into pretty-printed JSON.
///
/// Output uses two-space indentation and keeps the payload's own key order,
/// so expanding the same payload twice is byte-identical.
pub fn expand(payload: &str) -> Result<String> {
    let tree = expand_tree(payload)?;
    serde_json::to_string_pretty(&tree)
        .map_err(|e| PipelineError::MalformedInput(format!("failed to format JSON: {}", e)))
}

/// Parse a compact (or raw) payload back into a tree.
///
/// Subject to the same 128-level nesting limit as [`compress`].
pub fn expand_tree(payload: &str) -> Result<Value> {
    parse(unwrap_code_fence(payload))
}

/// One step from a node to its child: an object key or an array position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a leaf inside a tree, as the sequence of steps from the root.
///
/// Comparison works on the segments, so `{"a":{"b":..}}` and `{"a.b":..}` give
/// different paths even though both display as `a.b`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<PathSegment>);

impl KeyPath {
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The node this path points at in `tree`, if it exists there.
    pub fn resolve<'a>(&self, tree: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(tree, |node, segment| match (segment, node) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key),
            (PathSegment::Index(i), Value::Array(items)) => items.get(*i),
            _ => None,
        })
    }
}

/// Dotted display form, e.g. `nav.items[0].label`. The root displays as "".
impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// All leaf paths of a tree, in document order. Empty objects and arrays
/// count as leaves; a scalar root yields the root path.
pub fn leaf_paths(tree: &Value) -> Vec<KeyPath> {
    let mut paths = Vec::new();
    collect_paths(tree, &mut Vec::new(), &mut paths);
    paths
}

/// Display form of [`leaf_paths`].
///
/// Object keys are joined with `.` and array positions are written as `[i]`,
/// e.g. `nav.items[0].label`. Keys containing `.` make these strings
/// ambiguous; compare [`KeyPath`]s when structure matters.
pub fn key_paths(tree: &Value) -> Vec<String> {
    leaf_paths(tree).iter().map(KeyPath::to_string).collect()
}

fn collect_paths(node: &Value, prefix: &mut Vec<PathSegment>, paths: &mut Vec<KeyPath>) {
    match node {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                prefix.push(PathSegment::Key(key.clone()));
                collect_paths(child, prefix, paths);
                prefix.pop();
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, child) in items.iter().enumerate() {
                prefix.push(PathSegment::Index(i));
                collect_paths(child, prefix, paths);
                prefix.pop();
            }
        }
        _ => paths.push(KeyPath(prefix.clone())),
    }
}

fn parse(text: &str) -> Result<Value> {
    serde_json::from_str(text.trim())
        .map_err(|e| PipelineError::MalformedInput(format!("invalid JSON: {}", e)))
}

/// Strip one enclosing Markdown code fence (```json ... ```), if present.
fn unwrap_code_fence(payload: &str) -> &str {
    let regex = CODE_FENCE_REGEX.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?```\s*$").unwrap()
    });

    match regex.captures(payload).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => payload,
    }
}
