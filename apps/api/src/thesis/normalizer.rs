//! Response normalizer — turns one raw generation payload into a schema-shaped result.
//!
//! Two tiers:
//! 1. Structured fast path: the payload (optionally wrapped in a markdown code fence)
//!    parses as a JSON object. The object is kept verbatim; only declared sections
//!    that are missing or empty are filled with their fallback default.
//! 2. Heuristic split: blocks separated by a blank line are assigned to schema
//!    sections by position. This is the contract stated to the generator by
//!    `prompts::BLOCK_FORMAT_CONTRACT`; change both together.
//!
//! Normalization never fails. Anything it cannot use resolves to fallback defaults.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::thesis::schema::{SectionSchema, SectionShape, TopicContext};

/// Which tier produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Structured,
    Heuristic,
}

/// Normalized output of one generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub source: ResultSource,
    /// Section keys whose value is a fallback default rather than generated content.
    pub defaulted: Vec<String>,
    /// Ordered section values. Heuristic results hold exactly the schema's keys;
    /// structured results may carry extra keys from the payload.
    pub sections: Map<String, Value>,
}

impl GenerationResult {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.sections.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.sections.get(key).and_then(Value::as_str)
    }

    pub fn list(&self, key: &str) -> Option<Vec<&str>> {
        self.sections
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
    }

    /// True when no section had to fall back to a default.
    pub fn is_complete(&self) -> bool {
        self.defaulted.is_empty()
    }
}

/// Normalizes `raw` against `schema`, interpolating defaults with `topic` only.
pub fn normalize(raw: &str, topic: &str, schema: &SectionSchema) -> GenerationResult {
    normalize_with(raw, &TopicContext::new(topic), schema)
}

/// Normalizes `raw` against `schema`, interpolating defaults with the full context.
pub fn normalize_with(raw: &str, ctx: &TopicContext, schema: &SectionSchema) -> GenerationResult {
    let result = match parse_structured(raw) {
        Some(object) => fill_structured(object, ctx, schema),
        None => split_blocks(raw, ctx, schema),
    };

    debug!(
        "Normalized {} byte payload via {:?}: {} of {} sections defaulted",
        raw.len(),
        result.source,
        result.defaulted.len(),
        schema.len()
    );

    result
}

// ────────────────────────────────────────────────────────────────────────────
// Structured fast path
// ────────────────────────────────────────────────────────────────────────────

fn parse_structured(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(strip_code_fence(raw)) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

fn fill_structured(
    mut sections: Map<String, Value>,
    ctx: &TopicContext,
    schema: &SectionSchema,
) -> GenerationResult {
    let mut defaulted = Vec::new();

    for spec in schema.sections() {
        let populated = sections.get(spec.key).is_some_and(is_populated);
        if !populated {
            sections.insert(spec.key.to_string(), spec.default.render(ctx));
            defaulted.push(spec.key.to_string());
        }
    }

    GenerationResult {
        source: ResultSource::Structured,
        defaulted,
        sections,
    }
}

fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from generator output.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Heuristic block split
// ────────────────────────────────────────────────────────────────────────────

fn split_blocks(raw: &str, ctx: &TopicContext, schema: &SectionSchema) -> GenerationResult {
    let text = raw.replace("\r\n", "\n");
    let blocks: Vec<&str> = text.split("\n\n").collect();
    let last = schema.len().saturating_sub(1);

    let mut sections = Map::new();
    let mut defaulted = Vec::new();

    for (index, spec) in schema.sections().iter().enumerate() {
        // The final section absorbs any surplus blocks so trailing content is kept.
        let block = if index == last && blocks.len() > index + 1 {
            Some(blocks[index..].join("\n\n"))
        } else {
            blocks.get(index).map(|b| b.to_string())
        };

        let value = match block.and_then(|b| extract(&b, spec.shape())) {
            Some(value) => value,
            None => {
                defaulted.push(spec.key.to_string());
                spec.default.render(ctx)
            }
        };
        sections.insert(spec.key.to_string(), value);
    }

    GenerationResult {
        source: ResultSource::Heuristic,
        defaulted,
        sections,
    }
}

fn extract(block: &str, shape: SectionShape) -> Option<Value> {
    match shape {
        SectionShape::Text => {
            let text = block.trim();
            (!text.is_empty()).then(|| Value::String(text.to_string()))
        }
        SectionShape::List => {
            let items: Vec<Value> = split_list_items(block)
                .into_iter()
                .map(Value::String)
                .collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
    }
}

/// Splits a block into one item per line, dropping blank lines and bullet markers.
pub fn split_list_items(block: &str) -> Vec<String> {
    block
        .lines()
        .map(|line| strip_bullet(line.trim()))
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn strip_bullet(line: &str) -> &str {
    for marker in ['-', '*', '•'] {
        if let Some(rest) = line.strip_prefix(marker) {
            if rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }
    line
}
