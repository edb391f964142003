//! Prompt text for extraction and report generation.

use outlook_attrs::{AttributeDefinitionSet, LooseSchema};

pub const EXTRACTION_SYSTEM_PROMPT: &str = "\
You are extracting structured attributes from the attached document.
Output ONLY a JSON object that exactly matches the provided JSON schema.
Each field may be a string, a number, or an array of strings.
If a value is unknown, output an empty string \"\" (or an empty array [] where appropriate).
Do not include any keys that are not in the schema. Do not include explanations.
";

pub const EXTRACTION_USER_INSTRUCTION: &str = "\
Extract attributes for this document according to the attached JSON schema. \
Return a single JSON object. Use only the allowed enum values where provided.
";

pub const CONTINUATION_DIRECTIVE: &str =
    "Continue. Use file_search as needed. Return ONLY the JSON object per schema.";

/// `"\n\nEnum hints ...\n- field: a, b\n"`, or empty when nothing is constrained.
pub fn enum_hints(defs: &AttributeDefinitionSet) -> String {
    if !defs.has_enums() {
        return String::new();
    }
    let mut out = String::from("\n\nEnum hints (use only if present in the document):\n");
    for (name, values) in defs.enums() {
        out.push_str(&format!("- {name}: {}\n", values.join(", ")));
    }
    out
}

pub fn extraction_system_prompt(defs: &AttributeDefinitionSet) -> String {
    format!("{EXTRACTION_SYSTEM_PROMPT}{}", enum_hints(defs))
}

pub fn schema_text(schema: &LooseSchema) -> String {
    format!("JSON Schema:\n\n{}", schema.to_pretty_string())
}

pub const REPORT_INSTRUCTIONS: &str = r#"You are an expert in hospitality, real estate, and financial analysis.

Objective:
- Produce a forward-looking U.S. Lodging Industry Outlook report for the requested period.
- Assess the available data, prevailing opinions and sentiment, and how they have changed over time.
- Give a professional forecast grounded in the data and the overall industry landscape.
- Use all pertinent information from the provided vector store.

Required report sections:
1. Summary
2. Demand Trends (by travel type and price tier)
3. Economic & Industry Metrics
4. Sentiment Analysis (attributed quotes or paraphrased opinions)
5. Regional Segmentation
6. Emerging Trends
7. Historical Comparison
8. Professional Conclusions

Workflow:
1. Call `file_list(vector_store_id)` once to inventory the available documents (companies, quarters, regions, segments).
2. Decide which subsets you need, for example this period's earnings call transcripts or regional commentary.
3. Run targeted `file_search` calls for each major section.
4. Cover leisure, group, business and convention demand; luxury, premium and economy performance; KPIs such as RevPAR, ADR, occupancy and GOP with their macroeconomic links; regional variation; emerging themes; attributed sentiment; and comparison with prior periods.
5. Cite sources inline using the file title and fiscal quarter or company. Avoid duplicate quotes.

Retrieval guidelines:
- Prefer data matching the requested period, so outlooks can be compared across quarters.
- When matching data is thin, widen the search to more companies or document types and state the exact timeframe of every data point.

Output format:
Return the report as a single JSON object with exactly this shape. Use narrative text unless an array is indicated. For missing data use null or an empty structure and say so in the related section.

{
  "summary": "<narrative summary>",
  "demand_trends": {
    "leisure": "<narrative>",
    "group": "<narrative>",
    "business": "<narrative>",
    "convention": "<narrative>",
    "by_price_scale": {
      "luxury": "<narrative>",
      "premium": "<narrative>",
      "economy": "<narrative>"
    }
  },
  "economic_and_industry_metrics": [
    {
      "metric": "<e.g. RevPAR>",
      "value": <number|null>,
      "trend_vs_prior": "<comparison>",
      "source": "<file title + quarter or company>",
      "notes": "<optional notes>"
    }
  ],
  "sentiment_analysis": [
    {
      "quote_or_paraphrase": "<text>",
      "attribution": {
        "speaker": "<name/role, if available>",
        "source": "<file title + quarter or company>"
      }
    }
  ],
  "regional_segmentation": [
    {
      "region": "<region>",
      "trend": "<narrative>",
      "sources": ["<file title + quarter or company>"]
    }
  ],
  "emerging_trends": ["<narrative>"],
  "historical_comparison": {
    "period_compared": "<e.g. 2024-Q4 vs 2025-Q2>",
    "key_differences": ["<narrative>"]
  },
  "conclusions": "<professional analysis and outlook>"
}
"#;

/// User turn that opens a report conversation.
pub fn report_request(period: &str, defs: &AttributeDefinitionSet, vector_store_id: &str) -> String {
    let keys: Vec<&str> = defs.names().collect();
    let enums: serde_json::Map<String, serde_json::Value> = defs
        .enums()
        .map(|(name, values)| (name.to_string(), serde_json::json!(values)))
        .collect();
    format!(
        "You are generating a U.S. Lodging Industry Outlook for period: {period}.\n\
         Attribute keys available (for filtering): {}.\n\
         Enum guidance (partial): {}.\n\
         Use file_search across vector_store_id={vector_store_id}. Return ONLY the JSON object per the schema.\n",
        serde_json::json!(keys),
        serde_json::Value::Object(enums),
    )
}
