use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    configuration::GenerationSettings,
    domain::{
        contact::fallback_lead,
        lead::LeadRecord,
        search_result::{
            attach_judgments, relevance_rate, select_candidates, Candidate, JudgedResult,
            Judgment, SearchAttempt,
        },
    },
    error::{LeadError, Result},
};

use super::{ContentFetcher, LeadExtractor, QueryRefiner, RelevanceScorer, SearchProvider};

const FALLBACK_QUERY_SUFFIX: &str = "company contact information";

/// Finds companies for a business query and turns the relevant ones into leads.
///
/// Every collaborator failure past input validation degrades the run instead
/// of aborting it: a dead search ends with no leads, a failed judge marks
/// everything relevant, a failed refinement appends a generic suffix, a failed
/// fetch skips that company and a failed extraction falls back to a regex
/// scrape of the page.
///
/// One generator is shared by every request, and fetches from all of them
/// go through a single browser session at a time.
pub struct LeadGenerator {
    search_provider: Box<dyn SearchProvider>,
    relevance_scorer: Box<dyn RelevanceScorer>,
    query_refiner: Box<dyn QueryRefiner>,
    content_fetcher: Box<dyn ContentFetcher>,
    lead_extractor: Box<dyn LeadExtractor>,
    fetch_session: Mutex<()>,
    settings: GenerationSettings,
}

/// The batch the search loop settled on.
struct AcceptedBatch {
    attempt: SearchAttempt,
    judged: Vec<JudgedResult>,
}

impl LeadGenerator {
    pub fn new(
        search_provider: Box<dyn SearchProvider>,
        relevance_scorer: Box<dyn RelevanceScorer>,
        query_refiner: Box<dyn QueryRefiner>,
        content_fetcher: Box<dyn ContentFetcher>,
        lead_extractor: Box<dyn LeadExtractor>,
        settings: GenerationSettings,
    ) -> Self {
        LeadGenerator {
            search_provider,
            relevance_scorer,
            query_refiner,
            content_fetcher,
            lead_extractor,
            fetch_session: Mutex::new(()),
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Leads for at most `target_count` companies matching `query`. Fewer
    /// (or none) come back when searches, fetches or judgments fall short.
    pub async fn generate_leads(&self, query: &str, target_count: usize) -> Result<Vec<LeadRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LeadError::InvalidQuery);
        }
        if target_count == 0 {
            return Err(LeadError::InvalidTargetCount(target_count));
        }

        log::info!(
            "Starting lead generation for query: {} | Target results: {}",
            query,
            target_count
        );

        let Some(batch) = self.search_until_relevant(query, target_count).await else {
            log::error!("No search results found for query: {}", query);
            return Ok(vec![]);
        };
        log::info!(
            "Accepted attempt {} with query: {} | Relevance rate: {:.1}%",
            batch.attempt.attempt_number,
            batch.attempt.query,
            batch.attempt.relevance_rate * 100.0
        );

        let selected = select_candidates(batch.judged, target_count);
        let leads = self.harvest_leads(selected).await;

        let relevant = leads.iter().filter(|lead| lead.is_relevant()).count();
        log::info!(
            "Lead generation complete! {} leads generated, {} relevant",
            leads.len(),
            relevant
        );

        Ok(leads)
    }

    /// Searches, judges and refines until a batch clears the relevance
    /// threshold or attempts run out. `None` when a search comes back empty.
    async fn search_until_relevant(&self, query: &str, target_count: usize) -> Option<AcceptedBatch> {
        let max_attempts = self.settings.max_attempts.max(1);
        let result_count = target_count.saturating_mul(self.settings.oversample_factor.max(1));
        let mut current_query = query.to_string();

        for attempt_number in 1..=max_attempts {
            log::info!("Attempt {}/{}", attempt_number, max_attempts);

            let results = match self
                .search_provider
                .search(&current_query, result_count)
                .await
            {
                Ok(results) => results,
                Err(e) => {
                    log::error!("Search request failed: {:?}", e);
                    vec![]
                }
            };
            if results.is_empty() {
                return None;
            }

            // Judged against what the user asked for, never the refined query.
            let judged = self.judge(query, Candidate::from_results(results)).await;
            let attempt = SearchAttempt {
                query: current_query.clone(),
                attempt_number,
                relevance_rate: relevance_rate(&judged),
            };

            if attempt.relevance_rate >= self.settings.relevance_threshold {
                log::info!(
                    "Sufficient relevance rate: {:.1}%",
                    attempt.relevance_rate * 100.0
                );
                return Some(AcceptedBatch { attempt, judged });
            }

            log::warn!("Low relevance rate: {:.1}%", attempt.relevance_rate * 100.0);
            if attempt_number == max_attempts {
                log::warn!("Max attempts reached, proceeding with current results");
                return Some(AcceptedBatch { attempt, judged });
            }

            let irrelevant: Vec<JudgedResult> =
                judged.into_iter().filter(|r| !r.is_relevant()).collect();
            current_query = self.refine(query, &irrelevant).await;
        }

        None
    }

    async fn judge(&self, query: &str, candidates: Vec<Candidate>) -> Vec<JudgedResult> {
        match self.relevance_scorer.judge(query, &candidates).await {
            Ok(judgments) => attach_judgments(candidates, judgments),
            Err(e) => {
                log::error!("Relevance evaluation failed, keeping every result: {:?}", e);
                candidates
                    .into_iter()
                    .map(|candidate| JudgedResult {
                        candidate,
                        judgment: Judgment::fail_open(),
                    })
                    .collect()
            }
        }
    }

    async fn refine(&self, query: &str, irrelevant: &[JudgedResult]) -> String {
        match self.query_refiner.refine(query, irrelevant).await {
            Ok(refined) if !refined.trim().is_empty() => refined.trim().to_string(),
            Ok(_) => {
                log::error!("Query refinement returned a blank query");
                format!("{} {}", query, FALLBACK_QUERY_SUFFIX)
            }
            Err(e) => {
                log::error!("Query refinement failed: {:?}", e);
                format!("{} {}", query, FALLBACK_QUERY_SUFFIX)
            }
        }
    }

    /// Fetches and extracts one candidate at a time, pausing between fetches.
    async fn harvest_leads(&self, selected: Vec<JudgedResult>) -> Vec<LeadRecord> {
        let total = selected.len();
        let mut leads = Vec::with_capacity(total);

        for (i, candidate) in selected.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.settings.fetch_delay()).await;
            }

            let result = candidate.result();
            log::info!("[{}/{}] Processing: {}", i + 1, total, result.title);

            match self.harvest_lead(candidate).await {
                Some(lead) => {
                    log::info!("Lead extracted: {}", lead.company_name);
                    leads.push(lead);
                }
                None => log::warn!("Skipping {} after failed scrape", result.link),
            }
        }

        leads
    }

    async fn harvest_lead(&self, candidate: &JudgedResult) -> Option<LeadRecord> {
        let url = candidate.result().link.as_str();

        let fetched = {
            let _session = self.fetch_session.lock().await;
            self.content_fetcher.fetch(url).await
        };

        let content = match fetched {
            Ok(content) if !content.trim().is_empty() => content,
            Ok(_) => {
                log::error!("No content scraped from {}", url);
                return None;
            }
            Err(e) => {
                log::error!("Failed to scrape {}: {:?}", url, e);
                return None;
            }
        };

        let lead = match self.lead_extractor.extract(&content, url).await {
            Ok(lead) => lead,
            Err(e) => {
                log::error!("Lead extraction failed for {}, using fallback: {:?}", url, e);
                fallback_lead(url, &content)
            }
        };

        Some(lead.annotate(candidate, Utc::now()))
    }
}
