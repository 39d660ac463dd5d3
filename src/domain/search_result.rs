use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

/// A search result tagged with its provider position, assigned once at ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub result: SearchResult,
}

impl Candidate {
    pub fn from_results(results: Vec<SearchResult>) -> Vec<Candidate> {
        results
            .into_iter()
            .enumerate()
            .map(|(index, result)| Candidate { index, result })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Judgment {
    pub is_relevant: bool,
    pub confidence: f64,
    pub reason: String,
}

impl Judgment {
    pub fn new(is_relevant: bool, confidence: f64, reason: impl Into<String>) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };

        Judgment {
            is_relevant,
            confidence,
            reason: reason.into(),
        }
    }

    /// Given to a candidate the scorer answered for nobody.
    pub fn unmatched() -> Self {
        Judgment::new(false, 0.0, "Could not evaluate relevance")
    }

    /// Given to every candidate when the scorer itself is unavailable.
    pub fn fail_open() -> Self {
        Judgment::new(true, 0.5, "Could not evaluate")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JudgedResult {
    pub candidate: Candidate,
    pub judgment: Judgment,
}

impl JudgedResult {
    pub fn is_relevant(&self) -> bool {
        self.judgment.is_relevant
    }

    pub fn result(&self) -> &SearchResult {
        &self.candidate.result
    }
}

/// Pairs every candidate with its judgment. Indices missing from `judgments`
/// get [`Judgment::unmatched`], entries for unknown indices are dropped.
pub fn attach_judgments(
    candidates: Vec<Candidate>,
    mut judgments: HashMap<usize, Judgment>,
) -> Vec<JudgedResult> {
    candidates
        .into_iter()
        .map(|candidate| {
            let judgment = judgments
                .remove(&candidate.index)
                .unwrap_or_else(Judgment::unmatched);
            JudgedResult {
                candidate,
                judgment,
            }
        })
        .collect()
}

pub fn relevance_rate(judged: &[JudgedResult]) -> f64 {
    if judged.is_empty() {
        return 0.0;
    }
    let relevant = judged.iter().filter(|r| r.is_relevant()).count();
    relevant as f64 / judged.len() as f64
}

/// Relevant results in provider order, or every result when none is relevant,
/// truncated to `target_count`.
pub fn select_candidates(judged: Vec<JudgedResult>, target_count: usize) -> Vec<JudgedResult> {
    let (mut relevant, mut rest): (Vec<_>, Vec<_>) =
        judged.into_iter().partition(JudgedResult::is_relevant);

    match relevant.is_empty() {
        false => {
            relevant.truncate(target_count);
            relevant
        }
        true => {
            rest.truncate(target_count);
            rest
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchAttempt {
    pub query: String,
    pub attempt_number: u32,
    pub relevance_rate: f64,
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{
        attach_judgments, relevance_rate, select_candidates, Candidate, JudgedResult, Judgment,
        SearchResult,
    };

    fn result(n: usize) -> SearchResult {
        SearchResult {
            title: format!("Company {}", n),
            snippet: format!("Snippet {}", n),
            link: format!("https://company{}.com", n),
        }
    }

    fn judged(flags: &[bool]) -> Vec<JudgedResult> {
        let candidates = Candidate::from_results((0..flags.len()).map(result).collect());
        let judgments = flags
            .iter()
            .enumerate()
            .map(|(i, &rel)| (i, Judgment::new(rel, 0.9, "reason")))
            .collect();
        attach_judgments(candidates, judgments)
    }

    fn titles(results: &[JudgedResult]) -> Vec<&str> {
        results.iter().map(|r| r.result().title.as_str()).collect()
    }

    #[test]
    fn candidates_keep_provider_positions() {
        let candidates = Candidate::from_results(vec![result(7), result(3)]);

        assert_eq!(candidates[0].index, 0);
        assert_eq!(candidates[1].index, 1);
        assert_eq!(candidates[1].result.title, "Company 3");
    }

    #[test]
    fn judgment_confidence_is_clamped() {
        assert_eq!(Judgment::new(true, 1.7, "").confidence, 1.0);
        assert_eq!(Judgment::new(true, -0.2, "").confidence, 0.0);
        assert_eq!(Judgment::new(true, f64::NAN, "").confidence, 0.0);
    }

    #[test]
    fn unmatched_indices_get_default_judgment() {
        let candidates = Candidate::from_results(vec![result(0), result(1), result(2)]);
        let mut judgments = HashMap::new();
        judgments.insert(1, Judgment::new(true, 0.8, "fits"));
        judgments.insert(42, Judgment::new(true, 0.8, "ghost"));

        let judged = attach_judgments(candidates, judgments);

        assert_eq!(judged.len(), 3);
        assert_eq!(judged[0].judgment, Judgment::unmatched());
        assert_eq!(judged[1].judgment.reason, "fits");
        assert_eq!(judged[2].judgment, Judgment::unmatched());
        assert!(!judged[2].is_relevant());
        assert_eq!(judged[2].judgment.confidence, 0.0);
    }

    #[test]
    fn relevance_rate_of_empty_batch_is_zero() {
        assert_eq!(relevance_rate(&[]), 0.0);
    }

    #[test]
    fn relevance_rate_counts_relevant_share() {
        let batch = judged(&[true, false, true, false, false]);
        assert!((relevance_rate(&batch) - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn selection_prefers_relevant_in_provider_order() {
        let batch = judged(&[false, true, false, true, true, true]);
        let selected = select_candidates(batch, 3);

        assert_eq!(titles(&selected), vec!["Company 1", "Company 3", "Company 4"]);
    }

    #[test]
    fn selection_does_not_pad_relevant_with_irrelevant() {
        let batch = judged(&[false, true, false, false]);
        let selected = select_candidates(batch, 3);

        assert_eq!(titles(&selected), vec!["Company 1"]);
    }

    #[test]
    fn selection_falls_back_to_all_when_none_relevant() {
        let batch = judged(&[false, false, false, false]);
        let selected = select_candidates(batch, 2);

        assert_eq!(titles(&selected), vec!["Company 0", "Company 1"]);
    }

    #[test]
    fn selection_ignores_confidence_order() {
        let candidates = Candidate::from_results(vec![result(0), result(1)]);
        let judgments = HashMap::from([
            (0, Judgment::new(true, 0.1, "weak")),
            (1, Judgment::new(true, 0.99, "strong")),
        ]);
        let selected = select_candidates(attach_judgments(candidates, judgments), 1);

        assert_eq!(titles(&selected), vec!["Company 0"]);
    }
}
