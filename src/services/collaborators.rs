//! Seams between the lead generator and the outside world.
//!
//! Implementations only report failure; the degraded-mode fallbacks for
//! each error live in [`LeadGenerator`](super::LeadGenerator).

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use crate::{
    domain::{
        lead::LeadRecord,
        search_result::{Candidate, JudgedResult, Judgment, SearchResult},
    },
    error::Result,
};

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Up to `count` results in provider order.
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>>;
}

#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Judgments keyed by [`Candidate::index`]. Candidates may be missing.
    async fn judge(
        &self,
        query: &str,
        candidates: &[Candidate],
    ) -> Result<HashMap<usize, Judgment>>;
}

#[async_trait]
pub trait QueryRefiner: Send + Sync {
    async fn refine(&self, query: &str, irrelevant: &[JudgedResult]) -> Result<String>;
}

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Cleaned visible text of the page at `url`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[async_trait]
pub trait LeadExtractor: Send + Sync {
    async fn extract(&self, content: &str, url: &str) -> Result<LeadRecord>;
}

// Shared handles forward to the inner value.

#[async_trait]
impl<T: SearchProvider + ?Sized> SearchProvider for Arc<T> {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>> {
        (**self).search(query, count).await
    }
}

#[async_trait]
impl<T: RelevanceScorer + ?Sized> RelevanceScorer for Arc<T> {
    async fn judge(
        &self,
        query: &str,
        candidates: &[Candidate],
    ) -> Result<HashMap<usize, Judgment>> {
        (**self).judge(query, candidates).await
    }
}

#[async_trait]
impl<T: QueryRefiner + ?Sized> QueryRefiner for Arc<T> {
    async fn refine(&self, query: &str, irrelevant: &[JudgedResult]) -> Result<String> {
        (**self).refine(query, irrelevant).await
    }
}

#[async_trait]
impl<T: ContentFetcher + ?Sized> ContentFetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url).await
    }
}

#[async_trait]
impl<T: LeadExtractor + ?Sized> LeadExtractor for Arc<T> {
    async fn extract(&self, content: &str, url: &str) -> Result<LeadRecord> {
        (**self).extract(content, url).await
    }
}
