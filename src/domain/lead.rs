use chrono::{DateTime, SecondsFormat, Utc};
use itertools::Itertools;
use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::search_result::JudgedResult;

/// Sentinel for a field the page did not reveal.
pub const NOT_AVAILABLE: &str = "N/A";

/// Export order of every column a lead can carry.
pub const LEAD_COLUMNS: [&str; 21] = [
    "company_name",
    "email",
    "phone",
    "linkedin",
    "website",
    "industry",
    "description",
    "address",
    "contact_person",
    "services",
    "company_size",
    "founded_year",
    "revenue_range",
    "technologies",
    "social_media",
    "is_relevant",
    "relevance_confidence",
    "relevance_reason",
    "search_title",
    "search_snippet",
    "scraped_at",
];

/// Contact and firmographic data for one company.
///
/// Every extracted field is always present and holds [`NOT_AVAILABLE`] when
/// unknown. Deserialization accepts whatever shape an LLM replies with:
/// numbers and booleans are stringified, lists are joined with `", "`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LeadRecord {
    #[serde(deserialize_with = "lenient_field")]
    pub company_name: String,
    #[serde(deserialize_with = "lenient_field")]
    pub email: String,
    #[serde(deserialize_with = "lenient_field")]
    pub phone: String,
    #[serde(deserialize_with = "lenient_field")]
    pub linkedin: String,
    #[serde(deserialize_with = "lenient_field")]
    pub website: String,
    #[serde(deserialize_with = "lenient_field")]
    pub industry: String,
    #[serde(deserialize_with = "lenient_field")]
    pub description: String,
    #[serde(deserialize_with = "lenient_field")]
    pub address: String,
    #[serde(deserialize_with = "lenient_field")]
    pub contact_person: String,
    #[serde(deserialize_with = "lenient_field")]
    pub services: String,
    #[serde(deserialize_with = "lenient_field")]
    pub company_size: String,
    #[serde(deserialize_with = "lenient_field")]
    pub founded_year: String,
    #[serde(deserialize_with = "lenient_field")]
    pub revenue_range: String,
    #[serde(deserialize_with = "lenient_field")]
    pub technologies: String,
    #[serde(deserialize_with = "lenient_field")]
    pub social_media: String,
    #[serde(skip)]
    pub annotation: Option<LeadAnnotation>,
}

/// Where a lead came from and how relevant it was judged.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadAnnotation {
    pub is_relevant: bool,
    pub relevance_confidence: f64,
    pub relevance_reason: String,
    pub search_title: String,
    pub search_snippet: String,
    pub scraped_at: DateTime<Utc>,
}

impl Default for LeadRecord {
    fn default() -> Self {
        let na = || NOT_AVAILABLE.to_string();
        LeadRecord {
            company_name: na(),
            email: na(),
            phone: na(),
            linkedin: na(),
            website: na(),
            industry: na(),
            description: na(),
            address: na(),
            contact_person: na(),
            services: na(),
            company_size: na(),
            founded_year: na(),
            revenue_range: na(),
            technologies: na(),
            social_media: na(),
            annotation: None,
        }
    }
}

impl LeadRecord {
    pub fn annotate(mut self, judged: &JudgedResult, scraped_at: DateTime<Utc>) -> Self {
        let result = judged.result();
        self.annotation = Some(LeadAnnotation {
            is_relevant: judged.judgment.is_relevant,
            relevance_confidence: judged.judgment.confidence,
            relevance_reason: judged.judgment.reason.clone(),
            search_title: result.title.clone(),
            search_snippet: result.snippet.clone(),
            scraped_at,
        });
        self
    }

    pub fn is_relevant(&self) -> bool {
        self.annotation.as_ref().is_some_and(|a| a.is_relevant)
    }

    /// Column name and value pairs in [`LEAD_COLUMNS`] order. Annotation
    /// columns are absent until the lead is annotated.
    pub fn cells(&self) -> Vec<(&'static str, Value)> {
        let text = |s: &str| Value::String(s.to_string());
        let mut cells = vec![
            ("company_name", text(&self.company_name)),
            ("email", text(&self.email)),
            ("phone", text(&self.phone)),
            ("linkedin", text(&self.linkedin)),
            ("website", text(&self.website)),
            ("industry", text(&self.industry)),
            ("description", text(&self.description)),
            ("address", text(&self.address)),
            ("contact_person", text(&self.contact_person)),
            ("services", text(&self.services)),
            ("company_size", text(&self.company_size)),
            ("founded_year", text(&self.founded_year)),
            ("revenue_range", text(&self.revenue_range)),
            ("technologies", text(&self.technologies)),
            ("social_media", text(&self.social_media)),
        ];

        if let Some(annotation) = &self.annotation {
            cells.extend([
                ("is_relevant", Value::Bool(annotation.is_relevant)),
                (
                    "relevance_confidence",
                    serde_json::Number::from_f64(annotation.relevance_confidence)
                        .map(Value::Number)
                        .unwrap_or(Value::Null),
                ),
                ("relevance_reason", text(&annotation.relevance_reason)),
                ("search_title", text(&annotation.search_title)),
                ("search_snippet", text(&annotation.search_snippet)),
                (
                    "scraped_at",
                    text(
                        &annotation
                            .scraped_at
                            .to_rfc3339_opts(SecondsFormat::Secs, true),
                    ),
                ),
            ]);
        }

        cells
    }
}

impl Serialize for LeadRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let cells = self.cells();
        let mut map = serializer.serialize_map(Some(cells.len()))?;
        for (column, value) in cells.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

fn lenient_field<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(render_value(value))
}

fn render_value(value: Value) -> String {
    match value {
        Value::Null => NOT_AVAILABLE.to_string(),
        Value::String(s) => match s.trim() {
            "" => NOT_AVAILABLE.to_string(),
            trimmed => trimmed.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => {
            let joined = items
                .into_iter()
                .map(render_value)
                .filter(|item| item != NOT_AVAILABLE)
                .join(", ");
            match joined.is_empty() {
                true => NOT_AVAILABLE.to_string(),
                false => joined,
            }
        }
        object @ Value::Object(_) => object.to_string(),
    }
}
