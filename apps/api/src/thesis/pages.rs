//! Feature page catalog — one static schema and one task template per generator page.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::thesis::prompts::{
    BLOCK_FORMAT_CONTRACT, JSON_FORMAT_CONTRACT, JSON_FORMAT_RULES, PLAIN_FORMAT_CONTRACT,
};
use crate::thesis::schema::{DefaultValue, SectionSchema, SectionShape, SectionSpec, TopicContext};

/// How a page asks the generator to lay out its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// One JSON object keyed by section.
    Json,
    /// Components separated by blank lines.
    Blocks,
    /// A single piece of prose.
    Plain,
}

/// A one-click example prompt shown on a page.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExamplePrompt {
    pub topic: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_period: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geographic_focus: Option<&'static str>,
}

impl ExamplePrompt {
    const fn topic(topic: &'static str) -> Self {
        Self {
            topic,
            time_period: None,
            geographic_focus: None,
        }
    }
}

/// Static description of one feature page.
#[derive(Debug)]
pub struct PageSpec {
    pub slug: &'static str,
    pub title: &'static str,
    pub tagline: &'static str,
    /// Inline message when the user submits a blank topic.
    pub empty_topic_message: &'static str,
    /// Opening sentence of the task template. Interpolated like a default.
    pub preamble: &'static str,
    pub format: ResponseFormat,
    /// Extra rules appended after the format contract.
    pub guidance: &'static [&'static str],
    pub examples: &'static [ExamplePrompt],
    pub schema: SectionSchema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeaturePage {
    Analytical,
    Argumentative,
    Historical,
    LiteraturePolicy,
    Policy,
    Enhancer,
}

impl FeaturePage {
    pub const ALL: [FeaturePage; 6] = [
        FeaturePage::Analytical,
        FeaturePage::Argumentative,
        FeaturePage::Historical,
        FeaturePage::LiteraturePolicy,
        FeaturePage::Policy,
        FeaturePage::Enhancer,
    ];

    pub fn spec(&self) -> &'static PageSpec {
        match self {
            FeaturePage::Analytical => &ANALYTICAL,
            FeaturePage::Argumentative => &ARGUMENTATIVE,
            FeaturePage::Historical => &HISTORICAL,
            FeaturePage::LiteraturePolicy => &LITERATURE_POLICY,
            FeaturePage::Policy => &POLICY,
            FeaturePage::Enhancer => &ENHANCER,
        }
    }

    pub fn slug(&self) -> &'static str {
        self.spec().slug
    }

    pub fn schema(&self) -> &'static SectionSchema {
        &self.spec().schema
    }

    /// Builds the instruction sent to the generator for `ctx`.
    ///
    /// The section list and the format contract are derived from the schema, so the
    /// layout the generator is asked for is the layout the normalizer expects.
    pub fn task_template(&self, ctx: &TopicContext) -> String {
        let spec = self.spec();
        let sections = spec.schema.sections();
        let mut template = ctx.interpolate(spec.preamble);

        if spec.format != ResponseFormat::Plain {
            template.push_str(&format!(
                "\nStructure it with these {} components:\n",
                sections.len()
            ));
            for (i, section) in sections.iter().enumerate() {
                template.push_str(&format!("{}. {}\n", i + 1, section.instruction));
            }
        } else {
            for section in sections {
                template.push_str(&format!("\n- {}", section.instruction));
            }
            template.push('\n');
        }

        template.push('\n');
        match spec.format {
            ResponseFormat::Blocks => template.push_str(BLOCK_FORMAT_CONTRACT),
            ResponseFormat::Json => {
                template.push_str(JSON_FORMAT_CONTRACT);
                template.push_str(&json_skeleton(sections));
                template.push_str(JSON_FORMAT_RULES);
            }
            ResponseFormat::Plain => template.push_str(PLAIN_FORMAT_CONTRACT),
        }

        for rule in spec.guidance {
            template.push('\n');
            template.push_str(rule);
        }

        template
    }
}

impl fmt::Display for FeaturePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for FeaturePage {
    type Err = String;

    fn from_str(slug: &str) -> Result<Self, Self::Err> {
        FeaturePage::ALL
            .into_iter()
            .find(|page| page.slug() == slug)
            .ok_or_else(|| format!("Unknown feature page '{slug}'"))
    }
}

fn json_skeleton(sections: &[SectionSpec]) -> String {
    let fields: Vec<String> = sections
        .iter()
        .map(|s| match s.shape() {
            SectionShape::Text => format!("  \"{}\": \"\"", s.key),
            SectionShape::List => format!("  \"{}\": []", s.key),
        })
        .collect();
    format!("\n{{\n{}\n}}\n", fields.join(",\n"))
}

// ────────────────────────────────────────────────────────────────────────────
// Page definitions
// ────────────────────────────────────────────────────────────────────────────

static ANALYTICAL: PageSpec = PageSpec {
    slug: "analytical",
    title: "Analytical Thesis Generator",
    tagline: "Deconstruct complex topics with AI-powered structural analysis and data interpretation",
    empty_topic_message: "Please enter a research topic",
    preamble: "Generate an analytical thesis framework about the following topic: \"{topic}\".",
    format: ResponseFormat::Json,
    guidance: &["Focus on analytical depth and evidence-based reasoning."],
    examples: &[
        ExamplePrompt::topic("The correlation between economic inequality and educational attainment"),
        ExamplePrompt::topic("Comparative analysis of renewable energy policies in Europe and Asia"),
        ExamplePrompt::topic("The impact of algorithmic bias in hiring practices"),
    ],
    schema: SectionSchema::new(&[
        SectionSpec {
            key: "thesisStatement",
            label: "Thesis Statement",
            instruction: "A clear thesis statement",
            default: DefaultValue::Text(
                "This analysis examines {topic} by breaking it into its component parts and evaluating how they interact.",
            ),
        },
        SectionSpec {
            key: "keyComponents",
            label: "Key Components",
            instruction: "3-5 key components to analyze",
            default: DefaultValue::List(&[
                "Underlying causes and drivers of {topic}",
                "Measurable effects and outcomes",
                "Contextual factors that shape {topic}",
            ]),
        },
        SectionSpec {
            key: "methodology",
            label: "Methodology",
            instruction: "Suggested methodology",
            default: DefaultValue::Text(
                "Mixed methods approach combining quantitative and qualitative analysis",
            ),
        },
        SectionSpec {
            key: "recommendations",
            label: "Recommendations",
            instruction: "Research recommendations",
            default: DefaultValue::List(&[
                "Further research needed to explore this topic in depth",
                "Consider comparative studies with related phenomena",
                "Validate findings with empirical data",
            ]),
        },
    ]),
};

static ARGUMENTATIVE: PageSpec = PageSpec {
    slug: "argumentative",
    title: "Argumentative Thesis Generator",
    tagline: "Craft compelling argumentative thesis statements with structured reasoning and counterpoints",
    empty_topic_message: "Please enter a debate topic",
    preamble: "Generate a complete argumentative thesis about: \"{topic}\".",
    format: ResponseFormat::Blocks,
    guidance: &["Make the argument balanced but persuasive."],
    examples: &[
        ExamplePrompt::topic("Facial recognition in schools"),
        ExamplePrompt::topic("Banning plastic packaging"),
        ExamplePrompt::topic("AI in legal decision making"),
    ],
    schema: SectionSchema::new(&[
        SectionSpec {
            key: "thesis",
            label: "Thesis Statement",
            instruction: "Thesis statement (clear position on the issue)",
            default: DefaultValue::Text(
                "Despite its benefits, {topic} poses significant risks that require consideration.",
            ),
        },
        SectionSpec {
            key: "claim",
            label: "Main Claim",
            instruction: "Main claim (primary argument)",
            default: DefaultValue::Text(
                "The practice of {topic} has led to several concerning developments.",
            ),
        },
        SectionSpec {
            key: "counterargument",
            label: "Counterargument",
            instruction: "Counterargument (opposing viewpoint)",
            default: DefaultValue::Text("Proponents argue that {topic} provides important benefits."),
        },
        SectionSpec {
            key: "rebuttal",
            label: "Rebuttal",
            instruction: "Rebuttal (response to counterargument)",
            default: DefaultValue::Text("However, these advantages come with significant drawbacks."),
        },
        SectionSpec {
            key: "conclusion",
            label: "Conclusion",
            instruction: "Conclusion (final position and call to action)",
            default: DefaultValue::Text("Therefore, a balanced approach to {topic} is necessary."),
        },
    ]),
};

static HISTORICAL: PageSpec = PageSpec {
    slug: "historical",
    title: "Historical Thesis Generator",
    tagline: "Build historically grounded arguments with context, historiography and primary sources",
    empty_topic_message: "Please enter a historical topic",
    preamble: "Generate a comprehensive historical thesis framework about: \"{topic}\" during \
        {time_period|a historical period} in {geographic_focus|a specific region}.",
    format: ResponseFormat::Blocks,
    guidance: &["Focus on academic rigor and primary source analysis."],
    examples: &[
        ExamplePrompt {
            topic: "impact of the printing press",
            time_period: Some("15th-16th centuries"),
            geographic_focus: Some("Europe"),
        },
        ExamplePrompt {
            topic: "decolonization movements",
            time_period: Some("1945-1975"),
            geographic_focus: Some("Africa and Asia"),
        },
        ExamplePrompt {
            topic: "women in the industrial workforce",
            time_period: Some("World War II"),
            geographic_focus: Some("United States and Britain"),
        },
    ],
    schema: SectionSchema::new(&[
        SectionSpec {
            key: "thesisStatement",
            label: "Thesis Statement",
            instruction: "Thesis statement (clear historical argument)",
            default: DefaultValue::Text(
                "This historical analysis examines {topic} during {time_period|the selected period} \
                 in {geographic_focus|the specified region}.",
            ),
        },
        SectionSpec {
            key: "historicalContext",
            label: "Historical Context",
            instruction: "Historical context (3 bullet points)",
            default: DefaultValue::List(&[
                "Background of {topic_head} in {time_period|this period}",
                "Key events leading to the development of {topic}",
                "Contemporary accounts and primary sources",
            ]),
        },
        SectionSpec {
            key: "historiographicalDebate",
            label: "Historiographical Debate",
            instruction: "Historiographical debate (3 bullet points)",
            default: DefaultValue::List(&[
                "Main scholarly perspectives on this topic",
                "Key historians and their interpretations",
                "Evolution of the historical narrative",
            ]),
        },
        SectionSpec {
            key: "researchApproach",
            label: "Research Approach",
            instruction: "Research methodology",
            default: DefaultValue::Text(
                "Combination of archival research, textual analysis, and comparative historical methods",
            ),
        },
        SectionSpec {
            key: "potentialSources",
            label: "Potential Sources",
            instruction: "Potential primary sources (4 bullet points)",
            default: DefaultValue::List(&[
                "National archives and collections",
                "Contemporary newspapers and periodicals",
                "Personal correspondence and diaries",
                "Archaeological evidence where applicable",
            ]),
        },
    ]),
};

static LITERATURE_POLICY: PageSpec = PageSpec {
    slug: "literature-policy",
    title: "Literature-Based Policy Thesis Generator",
    tagline: "Connect literature and narrative analysis to real-world policy solutions and reform ideas.",
    empty_topic_message: "Please enter a literary theme or social issue",
    preamble: "Generate a literature-based policy thesis framework about: \"{topic}\".",
    format: ResponseFormat::Blocks,
    guidance: &["Focus on concrete policy recommendations derived from literary analysis."],
    examples: &[
        ExamplePrompt::topic("Gender inequality in postcolonial literature"),
        ExamplePrompt::topic("Representations of migration in contemporary fiction"),
        ExamplePrompt::topic("Climate anxiety in young adult novels"),
    ],
    schema: SectionSchema::new(&[
        SectionSpec {
            key: "thesisStatement",
            label: "Thesis Statement",
            instruction: "Thesis statement (connecting literature to policy)",
            default: DefaultValue::Text(
                "Drawing upon literary narratives surrounding {topic}, this thesis explores \
                 cultural representations and policy implications.",
            ),
        },
        SectionSpec {
            key: "literaryContext",
            label: "Literary Context",
            instruction: "Literary context (1 paragraph analysis)",
            default: DefaultValue::Text(
                "Through examination of texts addressing {topic}, patterns of social discourse \
                 and structural challenges emerge.",
            ),
        },
        SectionSpec {
            key: "policyImplications",
            label: "Policy Implications",
            instruction: "Policy implications (3 bullet points)",
            default: DefaultValue::List(&[
                "Encourage policy frameworks that acknowledge narratives.",
                "Develop culturally responsive programs.",
                "Utilize literature for civic engagement.",
            ]),
        },
        SectionSpec {
            key: "suggestedAuthors",
            label: "Suggested Authors",
            instruction: "Relevant authors (4 authors, one per line)",
            default: DefaultValue::List(&[
                "Toni Morrison",
                "Chinua Achebe",
                "Margaret Atwood",
                "James Baldwin",
            ]),
        },
        SectionSpec {
            key: "interdisciplinaryFocus",
            label: "Interdisciplinary Focus",
            instruction: "Interdisciplinary connections (4 fields, one per line)",
            default: DefaultValue::List(&[
                "Literary Studies",
                "Public Policy",
                "Cultural Studies",
                "Ethics",
            ]),
        },
    ]),
};

static POLICY: PageSpec = PageSpec {
    slug: "policy",
    title: "Policy Thesis Generator",
    tagline: "Frame evidence-based policy theses with stakeholders, objectives and recommendations",
    empty_topic_message: "Please enter a policy issue",
    preamble: "Generate a comprehensive policy thesis framework about: \"{topic}\".",
    format: ResponseFormat::Blocks,
    guidance: &["Focus on evidence-based, actionable policy solutions."],
    examples: &[
        ExamplePrompt::topic("Affordable housing in urban centers"),
        ExamplePrompt::topic("Universal basic income pilots"),
        ExamplePrompt::topic("Regulating short-term rental platforms"),
    ],
    schema: SectionSchema::new(&[
        SectionSpec {
            key: "thesisStatement",
            label: "Thesis Statement",
            instruction: "Thesis statement (clear policy focus)",
            default: DefaultValue::Text(
                "This thesis examines policy reform in {topic}, emphasizing equitable implementation.",
            ),
        },
        SectionSpec {
            key: "policyBackground",
            label: "Policy Background",
            instruction: "Policy background (1 paragraph)",
            default: DefaultValue::Text("The issue of {topic} has long posed challenges in governance."),
        },
        SectionSpec {
            key: "stakeholders",
            label: "Key Stakeholders",
            instruction: "Key stakeholders (4 bullet points)",
            default: DefaultValue::List(&[
                "Government agencies",
                "Non-governmental organizations",
                "Affected communities",
                "International bodies",
            ]),
        },
        SectionSpec {
            key: "objectives",
            label: "Policy Objectives",
            instruction: "Policy objectives (3 bullet points)",
            default: DefaultValue::List(&[
                "Assess current policy efficacy and gaps",
                "Propose inclusive, evidence-based reforms",
                "Promote stakeholder engagement",
            ]),
        },
        SectionSpec {
            key: "policyRecommendations",
            label: "Policy Recommendations",
            instruction: "Policy recommendations (3 bullet points)",
            default: DefaultValue::List(&[
                "Establish a task force to reassess frameworks",
                "Implement pilot programs for validation",
                "Ensure transparent reporting",
            ]),
        },
    ]),
};

static ENHANCER: PageSpec = PageSpec {
    slug: "enhancer",
    title: "Thesis Enhancer",
    tagline: "Polish a rough thesis statement into clear, academic prose",
    empty_topic_message: "Please enter a thesis statement to enhance",
    preamble: "Enhance this thesis statement for academic writing: \"{topic}\".",
    format: ResponseFormat::Plain,
    guidance: &[],
    examples: &[],
    schema: SectionSchema::new(&[SectionSpec {
        key: "enhancedThesis",
        label: "Enhanced Thesis",
        instruction: "Maintain the original meaning while improving clarity and academic tone. \
            Strengthen the argument if possible. Keep it concise (1-2 sentences).",
        default: DefaultValue::Text("{topic}"),
    }]),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thesis::normalizer::{normalize_with, ResultSource};

    #[test]
    fn test_slugs_round_trip_through_from_str() {
        for page in FeaturePage::ALL {
            assert_eq!(page.slug().parse::<FeaturePage>(), Ok(page));
            assert_eq!(page.to_string(), page.slug());
        }
        assert!("thesis".parse::<FeaturePage>().is_err());
    }

    #[test]
    fn test_serialized_page_matches_slug() {
        for page in FeaturePage::ALL {
            let json = serde_json::to_value(page).unwrap();
            assert_eq!(json, serde_json::Value::String(page.slug().to_string()));
        }
    }

    #[test]
    fn test_every_schema_has_unique_keys() {
        for page in FeaturePage::ALL {
            let mut keys: Vec<_> = page.schema().keys().collect();
            let count = keys.len();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), count, "{page}");
            assert!(!page.schema().is_empty(), "{page}");
        }
    }

    #[test]
    fn test_block_template_lists_sections_and_contract() {
        let ctx = TopicContext::new("Banning plastic packaging");
        let template = FeaturePage::Argumentative.task_template(&ctx);

        assert!(template.starts_with(
            "Generate a complete argumentative thesis about: \"Banning plastic packaging\"."
        ));
        assert!(template.contains("these 5 components"));
        assert!(template.contains("1. Thesis statement (clear position on the issue)"));
        assert!(template.contains("5. Conclusion (final position and call to action)"));
        assert!(template.contains(BLOCK_FORMAT_CONTRACT));
        assert!(template.ends_with("Make the argument balanced but persuasive."));
    }

    #[test]
    fn test_json_template_lists_exact_keys() {
        let ctx = TopicContext::new("algorithmic bias");
        let template = FeaturePage::Analytical.task_template(&ctx);

        assert!(template.contains("\"thesisStatement\": \"\""));
        assert!(template.contains("\"keyComponents\": []"));
        assert!(template.contains("\"methodology\": \"\""));
        assert!(template.contains("\"recommendations\": []"));
        assert!(!template.contains(BLOCK_FORMAT_CONTRACT));
    }

    #[test]
    fn test_historical_template_uses_extras_or_fallbacks() {
        let mut ctx = TopicContext::new("decolonization movements");
        let template = FeaturePage::Historical.task_template(&ctx);
        assert!(template.contains("during a historical period in a specific region"));

        ctx.time_period = Some("1945-1975".to_string());
        ctx.geographic_focus = Some("Africa and Asia".to_string());
        let template = FeaturePage::Historical.task_template(&ctx);
        assert!(template.contains("during 1945-1975 in Africa and Asia"));
    }

    #[test]
    fn test_plain_template_has_no_component_list() {
        let ctx = TopicContext::new("social media is bad");
        let template = FeaturePage::Enhancer.task_template(&ctx);
        assert!(!template.contains("components"));
        assert!(template.contains(PLAIN_FORMAT_CONTRACT));
    }

    #[test]
    fn test_historical_defaults_interpolate_extras() {
        let ctx = TopicContext {
            topic: "impact of the printing press".to_string(),
            time_period: Some("15th-16th centuries".to_string()),
            geographic_focus: None,
        };
        let result = normalize_with("", &ctx, FeaturePage::Historical.schema());

        assert_eq!(
            result.text("thesisStatement"),
            Some(
                "This historical analysis examines impact of the printing press during \
                 15th-16th centuries in the specified region."
            )
        );
        assert_eq!(
            result.list("historicalContext").unwrap()[0],
            "Background of impact in 15th-16th centuries"
        );
    }

    #[test]
    fn test_enhancer_keeps_whole_response() {
        let ctx = TopicContext::new("rough thesis");
        let raw = "Polished sentence one.\n\nPolished sentence two.";
        let result = normalize_with(raw, &ctx, FeaturePage::Enhancer.schema());
        assert_eq!(result.source, ResultSource::Heuristic);
        assert_eq!(result.text("enhancedThesis"), Some(raw));
    }

    #[test]
    fn test_enhancer_defaults_to_input_thesis() {
        let ctx = TopicContext::new("rough thesis");
        let result = normalize_with("  ", &ctx, FeaturePage::Enhancer.schema());
        assert_eq!(result.text("enhancedThesis"), Some("rough thesis"));
    }

    #[test]
    fn test_policy_blocks_map_positionally() {
        let raw = "Thesis.\n\nBackground.\n\n- Agencies\n- Residents\n\n- Assess\n\n- Fund pilots";
        let ctx = TopicContext::new("housing");
        let result = normalize_with(raw, &ctx, FeaturePage::Policy.schema());

        assert!(result.is_complete());
        assert_eq!(result.text("policyBackground"), Some("Background."));
        assert_eq!(result.list("stakeholders").unwrap(), vec!["Agencies", "Residents"]);
        assert_eq!(result.list("policyRecommendations").unwrap(), vec!["Fund pilots"]);
    }
}
