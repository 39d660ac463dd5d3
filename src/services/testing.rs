//! Deterministic collaborators that record how they were called.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    domain::{
        lead::LeadRecord,
        search_result::{Candidate, JudgedResult, Judgment, SearchResult},
    },
    error::{LeadError, Result},
};

use super::{ContentFetcher, LeadExtractor, QueryRefiner, RelevanceScorer, SearchProvider};

/// `n` results titled `Company 0..n` linking to `https://company{i}.com`.
pub fn search_results(n: usize) -> Vec<SearchResult> {
    (0..n)
        .map(|i| SearchResult {
            title: format!("Company {}", i),
            snippet: format!("Company {} builds software", i),
            link: format!("https://company{}.com", i),
        })
        .collect()
}

fn unavailable() -> LeadError {
    LeadError::MalformedResponse("collaborator unavailable".to_string())
}

/// Picks the response for call number `call`, repeating the last one.
fn nth_or_last<T: Clone>(responses: &[T], call: usize) -> Option<T> {
    responses.get(call).or(responses.last()).cloned()
}

#[derive(Clone, Default)]
pub struct FakeSearch {
    responses: Vec<Vec<SearchResult>>,
    fail: bool,
    calls: Arc<Mutex<Vec<(String, usize)>>>,
}

impl FakeSearch {
    pub fn returning(responses: Vec<Vec<SearchResult>>) -> Self {
        FakeSearch {
            responses,
            ..FakeSearch::default()
        }
    }

    pub fn failing() -> Self {
        FakeSearch {
            fail: true,
            ..FakeSearch::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((query.to_string(), count));
            calls.len() - 1
        };
        if self.fail {
            return Err(unavailable());
        }
        Ok(nth_or_last(&self.responses, call).unwrap_or_default())
    }
}

#[derive(Clone)]
enum Verdicts {
    PerCall(Vec<Vec<bool>>),
    Partial(Vec<(usize, bool)>),
    Fail,
}

#[derive(Clone)]
pub struct FakeScorer {
    verdicts: Verdicts,
    queries: Arc<Mutex<Vec<String>>>,
}

impl Default for FakeScorer {
    fn default() -> Self {
        FakeScorer {
            verdicts: Verdicts::PerCall(vec![]),
            queries: Arc::default(),
        }
    }
}

impl FakeScorer {
    /// Relevance flags by candidate position, one list per call.
    pub fn relevance(per_call: Vec<Vec<bool>>) -> Self {
        FakeScorer {
            verdicts: Verdicts::PerCall(per_call),
            ..FakeScorer::default()
        }
    }

    /// Only answers for the given indices, on every call.
    pub fn partial(verdicts: Vec<(usize, bool)>) -> Self {
        FakeScorer {
            verdicts: Verdicts::Partial(verdicts),
            ..FakeScorer::default()
        }
    }

    pub fn failing() -> Self {
        FakeScorer {
            verdicts: Verdicts::Fail,
            ..FakeScorer::default()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

fn verdict(is_relevant: bool) -> Judgment {
    match is_relevant {
        true => Judgment::new(true, 0.9, "matches the query"),
        false => Judgment::new(false, 0.8, "unrelated business"),
    }
}

#[async_trait]
impl RelevanceScorer for FakeScorer {
    async fn judge(
        &self,
        query: &str,
        candidates: &[Candidate],
    ) -> Result<HashMap<usize, Judgment>> {
        let call = {
            let mut queries = self.queries.lock().unwrap();
            queries.push(query.to_string());
            queries.len() - 1
        };

        match &self.verdicts {
            Verdicts::Fail => Err(unavailable()),
            Verdicts::Partial(verdicts) => Ok(verdicts
                .iter()
                .map(|&(index, is_relevant)| (index, verdict(is_relevant)))
                .collect()),
            Verdicts::PerCall(per_call) => {
                let flags = nth_or_last(per_call, call).unwrap_or_default();
                Ok(candidates
                    .iter()
                    .zip(flags)
                    .map(|(candidate, is_relevant)| (candidate.index, verdict(is_relevant)))
                    .collect())
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeRefiner {
    responses: Vec<String>,
    fail: bool,
    calls: Arc<Mutex<Vec<(String, usize)>>>,
}

impl FakeRefiner {
    pub fn returning(responses: Vec<&str>) -> Self {
        FakeRefiner {
            responses: responses.into_iter().map(String::from).collect(),
            ..FakeRefiner::default()
        }
    }

    pub fn failing() -> Self {
        FakeRefiner {
            fail: true,
            ..FakeRefiner::default()
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(q, _)| q.clone()).collect()
    }

    pub fn irrelevant_counts(&self) -> Vec<usize> {
        self.calls.lock().unwrap().iter().map(|(_, n)| *n).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryRefiner for FakeRefiner {
    async fn refine(&self, query: &str, irrelevant: &[JudgedResult]) -> Result<String> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((query.to_string(), irrelevant.len()));
            calls.len() - 1
        };
        if self.fail {
            return Err(unavailable());
        }
        Ok(nth_or_last(&self.responses, call).unwrap_or_else(|| format!("{} refined", query)))
    }
}

#[derive(Clone, Default)]
pub struct FakeFetcher {
    failing: Vec<String>,
    blank: Vec<String>,
    calls: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl FakeFetcher {
    pub fn failing_for(urls: Vec<&str>) -> Self {
        FakeFetcher {
            failing: urls.into_iter().map(String::from).collect(),
            ..FakeFetcher::default()
        }
    }

    pub fn blank_for(urls: Vec<&str>) -> Self {
        FakeFetcher {
            blank: urls.into_iter().map(String::from).collect(),
            ..FakeFetcher::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Most fetches that were ever running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        // Hand control to any other request polled alongside this one.
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.iter().any(|u| u == url) {
            return Err(LeadError::EmptyContent(url.to_string()));
        }
        if self.blank.iter().any(|u| u == url) {
            return Ok("  ".to_string());
        }

        let host = url.trim_start_matches("https://");
        Ok(format!("Welcome to {}. Write to hello@{} for a demo.", host, host))
    }
}

#[derive(Clone, Default)]
pub struct FakeExtractor {
    fail: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeExtractor {
    pub fn failing() -> Self {
        FakeExtractor {
            fail: true,
            ..FakeExtractor::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LeadExtractor for FakeExtractor {
    async fn extract(&self, _content: &str, url: &str) -> Result<LeadRecord> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(unavailable());
        }

        let number = url
            .trim_start_matches("https://company")
            .trim_end_matches(".com");
        Ok(LeadRecord {
            company_name: format!("Company {}", number),
            website: url.to_string(),
            ..LeadRecord::default()
        })
    }
}
