//! The lodging outlook report returned by the model.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// Model answers are loosely typed. Each field takes what it can and
// defaults the rest.

/// Text form of a loosely typed value: strings as-is, scalars in their JSON
/// form, arrays joined with `"; "`, objects as compact JSON.
fn loose_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => Some(value.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(loose_text).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
    }
}

fn text_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_text(&Value::deserialize(deserializer)?))
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_or_none(deserializer)?.unwrap_or_default())
}

/// One-or-many list of strings; a single value becomes a one-element list.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().filter_map(loose_text).collect(),
        other => loose_text(&other).into_iter().collect(),
    })
}

/// A nested section; anything that is not an object leaves it at its default.
fn section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => T::default(),
    })
}

/// A list of sections; a lone object counts as a one-element list and
/// entries that are not objects are dropped.
fn section_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        value @ Value::Object(_) => vec![value],
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    #[serde(deserialize_with = "text_or_none")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "section")]
    pub demand_trends: DemandTrends,
    #[serde(deserialize_with = "section_list")]
    pub economic_and_industry_metrics: Vec<Metric>,
    #[serde(deserialize_with = "section_list")]
    pub sentiment_analysis: Vec<SentimentItem>,
    #[serde(deserialize_with = "section_list")]
    pub regional_segmentation: Vec<RegionalTrend>,
    #[serde(deserialize_with = "string_list")]
    pub emerging_trends: Vec<String>,
    #[serde(deserialize_with = "section")]
    pub historical_comparison: HistoricalComparison,
    #[serde(deserialize_with = "text_or_none")]
    pub conclusions: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandTrends {
    #[serde(deserialize_with = "text_or_none")]
    pub leisure: Option<String>,
    #[serde(deserialize_with = "text_or_none")]
    pub group: Option<String>,
    #[serde(deserialize_with = "text_or_none")]
    pub business: Option<String>,
    #[serde(deserialize_with = "text_or_none")]
    pub convention: Option<String>,
    #[serde(deserialize_with = "section")]
    pub by_price_scale: PriceScaleTrends,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceScaleTrends {
    #[serde(deserialize_with = "text_or_none")]
    pub luxury: Option<String>,
    #[serde(deserialize_with = "text_or_none")]
    pub premium: Option<String>,
    #[serde(deserialize_with = "text_or_none")]
    pub economy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metric {
    #[serde(deserialize_with = "text_or_empty")]
    pub metric: String,
    /// Usually a number; models sometimes answer with text like `"+3.1%"`.
    pub value: Value,
    #[serde(deserialize_with = "text_or_none")]
    pub trend_vs_prior: Option<String>,
    #[serde(deserialize_with = "text_or_none")]
    pub source: Option<String>,
    #[serde(deserialize_with = "text_or_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentItem {
    #[serde(deserialize_with = "text_or_empty")]
    pub quote_or_paraphrase: String,
    #[serde(deserialize_with = "section")]
    pub attribution: Attribution,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attribution {
    #[serde(deserialize_with = "text_or_none")]
    pub speaker: Option<String>,
    #[serde(deserialize_with = "text_or_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionalTrend {
    #[serde(deserialize_with = "text_or_empty")]
    pub region: String,
    #[serde(deserialize_with = "text_or_none")]
    pub trend: Option<String>,
    #[serde(deserialize_with = "string_list")]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalComparison {
    #[serde(deserialize_with = "text_or_none")]
    pub period_compared: Option<String>,
    #[serde(deserialize_with = "string_list")]
    pub key_differences: Vec<String>,
}

impl Report {
    /// Parse the model's final answer. Fails only when the trimmed text is
    /// not a JSON object; mistyped fields are coerced or defaulted.
    pub fn from_model_text(text: &str) -> Result<Self, serde_json::Error> {
        match serde_json::from_str::<Value>(text.trim())? {
            value @ Value::Object(_) => serde_json::from_value(value),
            other => Err(serde::de::Error::custom(format!(
                "expected a report object, got {other}"
            ))),
        }
    }

    /// Fallback report carrying the raw answer as its summary.
    pub fn degraded(raw: &str) -> Self {
        Self {
            summary: Some(raw.to_string()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_sections_default_to_empty() {
        let report = Report::from_model_text(
            r#"
            {"summary": "RevPAR growth slowed.",
             "demand_trends": {"leisure": "Normalizing", "by_price_scale": {"luxury": "Resilient"}},
             "economic_and_industry_metrics": [{"metric": "RevPAR", "value": 1.2, "trend_vs_prior": "down"}]}
            "#,
        )
        .unwrap();
        assert_eq!(report.summary.as_deref(), Some("RevPAR growth slowed."));
        assert_eq!(report.demand_trends.leisure.as_deref(), Some("Normalizing"));
        assert_eq!(report.demand_trends.group, None);
        assert_eq!(report.demand_trends.by_price_scale.luxury.as_deref(), Some("Resilient"));
        assert_eq!(report.economic_and_industry_metrics[0].value, json!(1.2));
        assert!(report.sentiment_analysis.is_empty());
        assert_eq!(report.historical_comparison, HistoricalComparison::default());
        assert_eq!(report.conclusions, None);
    }

    #[test]
    fn nulls_are_accepted_for_narrative_fields() {
        let report = Report::from_model_text(
            r#"{"summary": null, "conclusions": null, "emerging_trends": null,
                "demand_trends": null,
                "historical_comparison": {"period_compared": null, "key_differences": null}}"#,
        )
        .unwrap();
        assert_eq!(report, Report::default());
    }

    #[test]
    fn only_non_objects_are_rejected() {
        assert!(Report::from_model_text("[1, 2, 3]").is_err());
        assert!(Report::from_model_text("[]").is_err());
        assert!(Report::from_model_text("\"just a string\"").is_err());
        assert!(Report::from_model_text("not json").is_err());
    }

    #[test]
    fn a_bare_string_counts_as_a_one_element_list() {
        let report = Report::from_model_text(
            r#"{"emerging_trends": "AI concierge",
                "regional_segmentation": [{"region": "Northeast", "sources": "Hilton Q2 2025"}],
                "historical_comparison": {"key_differences": "Softer group demand"},
                "conclusions": "Modest growth."}"#,
        )
        .unwrap();
        assert_eq!(report.emerging_trends, vec!["AI concierge"]);
        assert_eq!(report.regional_segmentation[0].region, "Northeast");
        assert_eq!(report.regional_segmentation[0].sources, vec!["Hilton Q2 2025"]);
        assert_eq!(report.historical_comparison.key_differences, vec!["Softer group demand"]);
        assert_eq!(report.conclusions.as_deref(), Some("Modest growth."));
    }

    #[test]
    fn structured_list_entries_are_kept_as_json_text() {
        let report =
            Report::from_model_text(r#"{"summary": "s", "emerging_trends": [{"trend": "AI"}, null, 3]}"#)
                .unwrap();
        assert_eq!(report.summary.as_deref(), Some("s"));
        assert_eq!(report.emerging_trends, vec![r#"{"trend":"AI"}"#, "3"]);
    }

    #[test]
    fn mistyped_sections_fall_back_to_defaults() {
        let report = Report::from_model_text(
            r#"{"summary": ["Demand is", "steady"],
                "demand_trends": "mixed",
                "economic_and_industry_metrics": {"metric": "ADR", "value": "+2%", "notes": 4},
                "sentiment_analysis": ["upbeat", {"quote_or_paraphrase": "Strong summer", "attribution": "CEO"}],
                "regional_segmentation": 7,
                "conclusions": {"outlook": "flat"}}"#,
        )
        .unwrap();
        assert_eq!(report.summary.as_deref(), Some("Demand is; steady"));
        assert_eq!(report.demand_trends, DemandTrends::default());
        assert_eq!(report.economic_and_industry_metrics.len(), 1);
        assert_eq!(report.economic_and_industry_metrics[0].value, json!("+2%"));
        assert_eq!(report.economic_and_industry_metrics[0].notes.as_deref(), Some("4"));
        assert_eq!(report.sentiment_analysis.len(), 1);
        assert_eq!(report.sentiment_analysis[0].quote_or_paraphrase, "Strong summer");
        assert_eq!(report.sentiment_analysis[0].attribution, Attribution::default());
        assert!(report.regional_segmentation.is_empty());
        assert_eq!(report.conclusions.as_deref(), Some(r#"{"outlook":"flat"}"#));
    }

    #[test]
    fn degraded_report_keeps_only_the_raw_text() {
        let report = Report::degraded("not json");
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["summary"], "not json");
        assert_eq!(v["demand_trends"]["by_price_scale"]["economy"], Value::Null);
        assert_eq!(v["economic_and_industry_metrics"], json!([]));
        assert_eq!(v["historical_comparison"], json!({"period_compared": null, "key_differences": []}));
        assert_eq!(v["conclusions"], Value::Null);
    }
}
