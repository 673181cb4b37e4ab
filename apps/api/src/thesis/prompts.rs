// Prompt fragments for the thesis generators.
// The block contract below is what `normalizer` splits on; keep the two in step.

/// Format contract for pages whose answer is split into blank-line separated blocks.
pub const BLOCK_FORMAT_CONTRACT: &str = "\
Format the response with each component separated by two newlines (one blank line). \
Write list components as one item per line, using markdown-style bullet points, \
with no blank lines inside a component. \
Do not add headings, numbering, or any text before or after the components.";

/// Opening of the format contract for pages that ask for a JSON object.
pub const JSON_FORMAT_CONTRACT: &str = "\
Format the response as a single JSON object with exactly these keys:";

/// Closing rule for JSON pages.
pub const JSON_FORMAT_RULES: &str = "\
Return ONLY the JSON object. Do NOT use markdown code fences.";

/// Format contract for pages that expect a single piece of prose.
pub const PLAIN_FORMAT_CONTRACT: &str = "\
Return only the requested text, without any additional commentary or formatting.";
