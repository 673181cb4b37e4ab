//! Section schemas — the ordered, fixed shape each feature page renders.
//!
//! A schema is static per page. The value shape of a section is implied by its
//! fallback default, so a schema can never declare a list section with a text default.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ────────────────────────────────────────────────────────────────────────────
// Schema types
// ────────────────────────────────────────────────────────────────────────────

/// Expected value shape of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionShape {
    Text,
    List,
}

/// Deterministic placeholder used when a section cannot be populated from the payload.
/// Templates are interpolated with [`TopicContext::interpolate`].
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Text(&'static str),
    List(&'static [&'static str]),
}

impl DefaultValue {
    pub fn render(&self, ctx: &TopicContext) -> Value {
        match self {
            DefaultValue::Text(template) => Value::String(ctx.interpolate(template)),
            DefaultValue::List(templates) => Value::Array(
                templates
                    .iter()
                    .map(|t| Value::String(ctx.interpolate(t)))
                    .collect(),
            ),
        }
    }
}

/// One named output section.
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    /// Stable key of the section in a `GenerationResult`. Never localized.
    pub key: &'static str,
    /// Default heading; presentation may replace it with a translated label.
    pub label: &'static str,
    /// What the generator is asked to write for this section.
    pub instruction: &'static str,
    pub default: DefaultValue,
}

impl SectionSpec {
    pub fn shape(&self) -> SectionShape {
        match self.default {
            DefaultValue::Text(_) => SectionShape::Text,
            DefaultValue::List(_) => SectionShape::List,
        }
    }
}

/// Ordered declaration of a page's sections.
#[derive(Debug, Clone, Copy)]
pub struct SectionSchema {
    sections: &'static [SectionSpec],
}

impl SectionSchema {
    pub const fn new(sections: &'static [SectionSpec]) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &'static [SectionSpec] {
        self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        self.sections.iter().map(|s| s.key)
    }

    pub fn get(&self, key: &str) -> Option<&'static SectionSpec> {
        self.sections.iter().find(|s| s.key == key)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Topic context
// ────────────────────────────────────────────────────────────────────────────

/// The user-supplied inputs of one generation: the topic plus optional page extras.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicContext {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_focus: Option<String>,
}

impl TopicContext {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    /// Trimmed topic.
    pub fn topic(&self) -> &str {
        self.topic.trim()
    }

    /// Fills `{placeholder}` slots in a template.
    ///
    /// - `{topic}` — the trimmed topic
    /// - `{topic_head}` — first word of the topic
    /// - `{name|fallback}` — a page extra, or `fallback` when it is absent or blank
    ///
    /// Unknown placeholders without a fallback are left as written.
    pub fn interpolate(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len() + self.topic.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };
            let placeholder = &after[..close];
            match self.resolve(placeholder) {
                Some(value) => out.push_str(value),
                None => {
                    out.push('{');
                    out.push_str(placeholder);
                    out.push('}');
                }
            }
            rest = &after[close + 1..];
        }

        out.push_str(rest);
        out
    }

    fn resolve<'a>(&'a self, placeholder: &'a str) -> Option<&'a str> {
        let (name, fallback) = match placeholder.split_once('|') {
            Some((name, fallback)) => (name.trim(), Some(fallback)),
            None => (placeholder.trim(), None),
        };

        let value = match name {
            "topic" => Some(self.topic()),
            "topic_head" => Some(self.topic().split_whitespace().next().unwrap_or("")),
            "time_period" => non_blank(self.time_period.as_deref()),
            "geographic_focus" => non_blank(self.geographic_focus.as_deref()),
            _ => None,
        };

        value.or(fallback)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &[SectionSpec] = &[
        SectionSpec {
            key: "thesis",
            label: "Thesis",
            instruction: "Thesis statement",
            default: DefaultValue::Text("A thesis about {topic}."),
        },
        SectionSpec {
            key: "points",
            label: "Points",
            instruction: "Key points",
            default: DefaultValue::List(&["Origins of {topic_head}", "Wider context"]),
        },
    ];

    #[test]
    fn test_shape_follows_default() {
        let schema = SectionSchema::new(MIXED);
        assert_eq!(schema.sections()[0].shape(), SectionShape::Text);
        assert_eq!(schema.sections()[1].shape(), SectionShape::List);
        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["thesis", "points"]);
        assert!(schema.get("points").is_some());
        assert!(schema.get("missing").is_none());
    }

    #[test]
    fn test_interpolate_topic_and_head() {
        let ctx = TopicContext::new("  decolonization movements ");
        assert_eq!(
            ctx.interpolate("{topic_head} and {topic}"),
            "decolonization and decolonization movements"
        );
    }

    #[test]
    fn test_interpolate_extra_uses_fallback_when_blank() {
        let mut ctx = TopicContext::new("the printing press");
        ctx.time_period = Some("   ".to_string());
        assert_eq!(
            ctx.interpolate("during {time_period|the selected period}"),
            "during the selected period"
        );

        ctx.time_period = Some("15th-16th centuries".to_string());
        assert_eq!(
            ctx.interpolate("during {time_period|the selected period}"),
            "during 15th-16th centuries"
        );
    }

    #[test]
    fn test_interpolate_leaves_unknown_and_unclosed_placeholders() {
        let ctx = TopicContext::new("X");
        assert_eq!(ctx.interpolate("{unknown} {topic"), "{unknown} {topic");
        assert_eq!(ctx.interpolate("{unknown|fallback}"), "fallback");
    }

    #[test]
    fn test_render_default_values() {
        let ctx = TopicContext::new("urban housing");
        assert_eq!(
            MIXED[0].default.render(&ctx),
            Value::String("A thesis about urban housing.".to_string())
        );
        assert_eq!(
            MIXED[1].default.render(&ctx),
            serde_json::json!(["Origins of urban", "Wider context"])
        );
    }

    #[test]
    fn test_topic_context_deserializes_without_extras() {
        let ctx: TopicContext = serde_json::from_str(r#"{"topic": "X"}"#).unwrap();
        assert_eq!(ctx, TopicContext::new("X"));
    }
}
