use std::collections::HashMap;

use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_json::Value;

use crate::{
    configuration::LlmSettings,
    domain::{
        lead::{LeadRecord, NOT_AVAILABLE},
        search_result::{Candidate, JudgedResult, Judgment},
    },
    error::{LeadError, Result},
};

use super::{LeadExtractor, QueryRefiner, RelevanceScorer};

pub struct OpenaiClient {
    client: Client<OpenAIConfig>,
    model: String,
}

#[derive(Serialize)]
struct ResultSummary<'a> {
    index: usize,
    title: &'a str,
    snippet: &'a str,
    link: &'a str,
}

#[derive(Deserialize)]
struct RelevanceVerdict {
    index: usize,
    #[serde(default)]
    is_relevant: bool,
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    confidence: f64,
    #[serde(default = "no_reason")]
    reason: String,
}

fn no_reason() -> String {
    "No reason provided".to_string()
}

impl OpenaiClient {
    pub fn new(api_key: String, settings: &LlmSettings) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(settings.api_base.clone())
            .with_api_key(api_key);
        OpenaiClient {
            client: Client::with_config(config),
            model: settings.model.clone(),
        }
    }

    async fn complete(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .temperature(temperature)
            .max_tokens(max_tokens)
            .build()?;

        let response = self.client.chat().create(request).await?;
        log::debug!("Response: {:?}", response);

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LeadError::MalformedResponse("No content in completion".to_string()))
    }
}

#[async_trait]
impl RelevanceScorer for OpenaiClient {
    async fn judge(
        &self,
        query: &str,
        candidates: &[Candidate],
    ) -> Result<HashMap<usize, Judgment>> {
        log::info!("Evaluating relevance of {} search results", candidates.len());

        let prompt = relevance_prompt(query, candidates)?;
        let response = self.complete(&prompt, 0.1, 2000).await?;
        let judgments = parse_verdicts(&response)?;

        log::info!(
            "Relevance evaluation returned {} verdicts for {} results",
            judgments.len(),
            candidates.len()
        );
        Ok(judgments)
    }
}

#[async_trait]
impl QueryRefiner for OpenaiClient {
    async fn refine(&self, query: &str, irrelevant: &[JudgedResult]) -> Result<String> {
        log::info!("Refining search query based on {} irrelevant results", irrelevant.len());

        let prompt = refine_prompt(query, irrelevant)?;
        let response = self.complete(&prompt, 0.3, 100).await?;
        let refined = parse_refined_query(&response)?;

        log::info!("Refined query: {}", refined);
        Ok(refined)
    }
}

#[async_trait]
impl LeadExtractor for OpenaiClient {
    async fn extract(&self, content: &str, url: &str) -> Result<LeadRecord> {
        log::info!("Extracting lead information from {}", url);

        let prompt = extraction_prompt(content, url);
        let response = self.complete(&prompt, 0.1, 1500).await?;
        parse_lead(&response, url)
    }
}

fn relevance_prompt(query: &str, candidates: &[Candidate]) -> Result<String> {
    let summaries: Vec<ResultSummary> = candidates
        .iter()
        .map(|c| ResultSummary {
            index: c.index,
            title: &c.result.title,
            snippet: &c.result.snippet,
            link: &c.result.link,
        })
        .collect();

    Ok(format!(
        r#"Analyze the following search results and determine their relevance to the search query: "{}"

For each result, evaluate if it matches what the user is looking for based on:
1. Company type/industry alignment
2. Geographic relevance (if specified)
3. Business model relevance
4. Overall match to search intent

Return a JSON array where each object has:
- index: The result index
- is_relevant: true/false
- confidence: 0.0-1.0 (how confident you are)
- reason: Brief explanation of relevance decision

Search Results:
{}

Return only valid JSON format."#,
        query,
        serde_json::to_string_pretty(&summaries)?
    ))
}

fn refine_prompt(query: &str, irrelevant: &[JudgedResult]) -> Result<String> {
    let titles: Vec<&str> = irrelevant.iter().map(|r| r.result().title.as_str()).collect();

    Ok(format!(
        r#"The original search query "{}" returned mostly irrelevant results.

Irrelevant results included:
{}

Generate a more specific and targeted search query that would return better results.
Consider:
1. Adding more specific keywords
2. Including location modifiers if needed
3. Adding industry-specific terms
4. Excluding common irrelevant terms

Return only the refined search query as plain text, no explanation."#,
        query,
        serde_json::to_string_pretty(&titles)?
    ))
}

fn extraction_prompt(content: &str, url: &str) -> String {
    format!(
        r#"Analyze the following website content and extract comprehensive lead generation information.

Return information in JSON format with these fields:
- company_name: The main company name
- email: Email addresses (comma-separated if multiple, prioritize contact/sales emails)
- phone: Phone numbers (comma-separated if multiple, format: +1-XXX-XXX-XXXX)
- linkedin: LinkedIn company page or key personnel URLs
- website: The website URL
- industry: Specific industry/business type
- description: Compelling company description (50-100 words)
- address: Full physical address
- contact_person: Names and titles of key contacts
- services: Main services/products (comma-separated)
- company_size: Employee count estimate or range
- founded_year: Year company was founded
- revenue_range: Estimated revenue range if available
- technologies: Key technologies used (if tech company)
- social_media: Other social media profiles (Twitter, Facebook, etc.)

Website URL: {}

Content:
{}

Return only valid JSON. Use "{}" for missing information."#,
        url, content, NOT_AVAILABLE
    )
}

/// The outermost `open`..`close` span, for replies that wrap JSON in prose.
fn json_slice(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

fn parse_verdicts(response: &str) -> Result<HashMap<usize, Judgment>> {
    let json = json_slice(response, '[', ']')
        .ok_or_else(|| LeadError::MalformedResponse("No JSON array in relevance reply".to_string()))?;
    let entries: Vec<Value> = serde_json::from_str(json)?;

    let mut judgments = HashMap::new();
    for entry in entries {
        match serde_json::from_value::<RelevanceVerdict>(entry) {
            Ok(verdict) => {
                judgments.entry(verdict.index).or_insert_with(|| {
                    Judgment::new(verdict.is_relevant, verdict.confidence, verdict.reason)
                });
            }
            Err(e) => log::warn!("Skipping malformed relevance verdict: {:?}", e),
        }
    }

    Ok(judgments)
}

fn parse_refined_query(response: &str) -> Result<String> {
    response
        .lines()
        .map(|line| line.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`').trim())
        .find(|line| !line.is_empty())
        .map(|line| line.to_string())
        .ok_or_else(|| LeadError::MalformedResponse("Empty refined query".to_string()))
}

fn parse_lead(response: &str, url: &str) -> Result<LeadRecord> {
    let json = json_slice(response, '{', '}')
        .ok_or_else(|| LeadError::MalformedResponse("No JSON object in extraction reply".to_string()))?;
    let mut lead: LeadRecord = serde_json::from_str(json)?;

    if lead.website == NOT_AVAILABLE {
        lead.website = url.to_string();
    }

    Ok(lead)
}
